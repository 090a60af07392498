//! Value payloads accepted by the tracer.
//!
//! Logged values are arbitrary JSON shapes ([`serde_json::Value`]). A value
//! may also be *deferred*: its real content is computed only when first
//! accessed (a translation proxy, a formatting closure over captured
//! arguments). Evaluating such a value inside the tracer can trigger side
//! effects in the host — so the tracer never does. Deferred values implement
//! [`DeferredValue`], a narrow interface exposing the arguments captured at
//! construction, and the tracer stores their concatenation as a string
//! surrogate instead of the evaluated content.

use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// A lazily-evaluated value that can describe itself without being forced.
///
/// Implementors expose the arguments they captured at construction. The
/// tracer calls only this method; it never evaluates the wrapped value.
pub trait DeferredValue: fmt::Debug + Send + Sync {
    /// Arguments captured when the deferred value was constructed.
    fn construction_args(&self) -> Vec<String>;
}

/// A value payload passed to the tracer.
///
/// `Plain` values are cloned into the store verbatim, so the log never
/// aliases live caller state. `Deferred` values are reduced to a string
/// surrogate of their construction arguments.
#[derive(Debug, Clone)]
pub enum TraceValue {
    /// Ordinary value, stored as a deep copy.
    Plain(Value),
    /// Deferred value, stored as a surrogate without evaluation.
    Deferred(Arc<dyn DeferredValue>),
}

impl TraceValue {
    /// Wrap a deferred value.
    pub fn deferred(value: impl DeferredValue + 'static) -> Self {
        TraceValue::Deferred(Arc::new(value))
    }

    /// Reduce to the value actually stored in the log.
    ///
    /// Plain values are cloned; deferred values become the concatenation of
    /// their construction arguments.
    pub(crate) fn resolve(&self) -> Value {
        match self {
            TraceValue::Plain(value) => value.clone(),
            TraceValue::Deferred(lazy) => Value::String(lazy.construction_args().concat()),
        }
    }
}

impl From<Value> for TraceValue {
    fn from(value: Value) -> Self {
        TraceValue::Plain(value)
    }
}

macro_rules! plain_from {
    ($($ty:ty),*) => {$(
        impl From<$ty> for TraceValue {
            fn from(value: $ty) -> Self {
                TraceValue::Plain(Value::from(value))
            }
        }
    )*};
}

plain_from!(bool, i64, f64, &str, String);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug)]
    struct LazyText(Vec<&'static str>);

    impl DeferredValue for LazyText {
        fn construction_args(&self) -> Vec<String> {
            self.0.iter().map(|s| s.to_string()).collect()
        }
    }

    #[test]
    fn plain_resolves_to_clone() {
        let value = TraceValue::from(json!({"n": 1}));
        assert_eq!(value.resolve(), json!({"n": 1}));
    }

    #[test]
    fn deferred_resolves_to_joined_args() {
        let value = TraceValue::deferred(LazyText(vec!["a", "b", "c"]));
        assert_eq!(value.resolve(), json!("abc"));
    }

    #[test]
    fn deferred_with_no_args_resolves_to_empty_string() {
        let value = TraceValue::deferred(LazyText(vec![]));
        assert_eq!(value.resolve(), json!(""));
    }

    #[test]
    fn from_primitives() {
        assert_eq!(TraceValue::from(5).resolve(), json!(5));
        assert_eq!(TraceValue::from("x").resolve(), json!("x"));
        assert_eq!(TraceValue::from(true).resolve(), json!(true));
    }
}
