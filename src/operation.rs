//! Operation descriptors.
//!
//! An [`Operation`] identifies *what* is being mutated: a small ordered
//! mapping of string keys to string values, supplied by the composition
//! engine. The tracer does not define the schema; it only reserves the
//! `old_value` and `new_value` keys for the trace entry itself.
//!
//! # Example
//!
//! ```
//! use optrace::Operation;
//!
//! let op = Operation::new()
//!     .with("object", "Settings")
//!     .with("field", "timeout");
//! assert_eq!(op.get("field"), Some("timeout"));
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Descriptor keys the tracer claims for itself.
pub const RESERVED_KEYS: [&str; 2] = ["old_value", "new_value"];

/// Caller-supplied descriptor of the mutation being traced.
///
/// Keys iterate in lexicographic order, so rendered entries are
/// deterministic. An empty descriptor is valid; `log` call sites that have
/// nothing to identify pass `Operation::new()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Operation(BTreeMap<String, String>);

impl Operation {
    /// Create an empty descriptor.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key, builder style.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert a key, replacing any previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    /// Look up a key.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Number of keys in the descriptor.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if the descriptor is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over keys and values in lexicographic key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Reject descriptors that collide with the entry's own fields.
    pub(crate) fn validate(&self) -> Result<()> {
        for key in RESERVED_KEYS {
            if self.0.contains_key(key) {
                return Err(Error::ReservedKey(key.to_string()));
            }
        }
        Ok(())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Operation {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl From<BTreeMap<String, String>> for Operation {
    fn from(map: BTreeMap<String, String>) -> Self {
        Self(map)
    }
}
