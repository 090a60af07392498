//! Tracer variants and the interface they share.
//!
//! The composition engine talks to an `Arc<dyn OperationTracer>` and never
//! branches on whether tracing is enabled: the [`NullTracer`] satisfies the
//! whole contract with no-ops, and the [`RecordingTracer`] captures real
//! entries into a shared [`TraceStore`]. The active variant is picked once,
//! at the composition root, via [`TracerBuilder`].
//!
//! # Two-phase protocol
//!
//! The old value of a mutation is often known before the new value is
//! computed. Callers register the mutation first, then complete it:
//!
//! ```
//! use optrace::prelude::*;
//! # fn main() -> optrace::Result<()> {
//! let store = std::sync::Arc::new(TraceStore::new());
//! let tracer = TracerBuilder::new().store(store.clone()).build();
//!
//! let op = Operation::new().with("field", "timeout");
//! let token = tracer.register(op)?;
//! tracer.log_old_value(token, 30.into());
//! // ... mutation happens ...
//! tracer.log_new_value(token, 60.into())?;
//!
//! assert_eq!(store.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use crate::operation::Operation;
use crate::store::{EntryToken, TraceStore};
use crate::value::TraceValue;
use std::sync::Arc;

/// Contract every tracer variant satisfies.
///
/// All operations are synchronous and reactive; the tracer never initiates
/// action. Implementations must be shareable across threads.
pub trait OperationTracer: Send + Sync {
    /// Register a mutation ahead of its values being known.
    ///
    /// Returns the correlation token the caller threads through to
    /// [`log_new_value`](OperationTracer::log_new_value).
    fn register(&self, operation: Operation) -> Result<EntryToken>;

    /// Record a complete mutation in one shot: descriptor plus both values.
    fn log(
        &self,
        operation: Operation,
        new_value: TraceValue,
        old_value: TraceValue,
    ) -> Result<EntryToken>;

    /// Record the old value ahead of the new value being known.
    ///
    /// Exists so callers can signal both phases of the protocol; see each
    /// variant for what it actually persists.
    fn log_old_value(&self, token: EntryToken, old_value: TraceValue);

    /// Record the new value for a previously registered mutation.
    fn log_new_value(&self, token: EntryToken, new_value: TraceValue) -> Result<()>;
}

/// Tracer variant used when tracing is disabled.
///
/// Every operation is a pure no-op: no store is touched, no error returned.
/// `register` and `log` hand back [`EntryToken::NULL`], which no store ever
/// resolves.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullTracer;

impl NullTracer {
    /// Create a null tracer.
    pub fn new() -> Self {
        NullTracer
    }
}

impl OperationTracer for NullTracer {
    fn register(&self, _operation: Operation) -> Result<EntryToken> {
        Ok(EntryToken::NULL)
    }

    fn log(
        &self,
        _operation: Operation,
        _new_value: TraceValue,
        _old_value: TraceValue,
    ) -> Result<EntryToken> {
        Ok(EntryToken::NULL)
    }

    fn log_old_value(&self, _token: EntryToken, _old_value: TraceValue) {}

    fn log_new_value(&self, _token: EntryToken, _new_value: TraceValue) -> Result<()> {
        Ok(())
    }
}

/// Tracer variant that captures mutation records into a shared store.
///
/// Every recording tracer built over the same store appends to the same log,
/// in call order. Values are stored as deep copies; deferred values are
/// stored as the concatenation of their construction arguments, never
/// evaluated.
pub struct RecordingTracer {
    store: Arc<TraceStore>,
}

impl RecordingTracer {
    /// Create a recording tracer over the given store.
    pub fn new(store: Arc<TraceStore>) -> Self {
        RecordingTracer { store }
    }

    /// Create a recording tracer over the process-wide default store.
    pub fn shared() -> Self {
        Self::new(TraceStore::global())
    }

    /// Handle to the backing store, for inspection by external tooling.
    pub fn store(&self) -> &Arc<TraceStore> {
        &self.store
    }
}

impl OperationTracer for RecordingTracer {
    fn register(&self, operation: Operation) -> Result<EntryToken> {
        self.store.register(operation)
    }

    fn log(
        &self,
        operation: Operation,
        new_value: TraceValue,
        old_value: TraceValue,
    ) -> Result<EntryToken> {
        self.store
            .append(operation, new_value.resolve(), old_value.resolve())
    }

    /// Intentionally a no-op: the old value is not separately persisted.
    ///
    /// This asymmetry is inherited behavior. The one-shot [`log`] path does
    /// persist old values; call sites that need the old value on a two-phase
    /// entry record it at registration time (in the descriptor) or switch to
    /// `log`. Kept as-is rather than silently changed.
    fn log_old_value(&self, _token: EntryToken, _old_value: TraceValue) {}

    fn log_new_value(&self, token: EntryToken, new_value: TraceValue) -> Result<()> {
        self.store.set_new_value(token, new_value.resolve())
    }
}

/// Composition-root selection of the active tracer variant.
///
/// Tracing is disabled by default; hosts that want a real log opt in:
///
/// ```
/// use optrace::TracerBuilder;
///
/// // Disabled (null variant):
/// let tracer = TracerBuilder::new().build();
///
/// // Recording into the process-wide store:
/// let tracer = TracerBuilder::new().recording().build();
/// ```
#[derive(Default)]
pub struct TracerBuilder {
    store: Option<Arc<TraceStore>>,
    recording: bool,
}

impl TracerBuilder {
    /// Create a builder with tracing disabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the recording variant over the process-wide store.
    pub fn recording(mut self) -> Self {
        self.recording = true;
        self
    }

    /// Select the recording variant over an injected store.
    ///
    /// Tests use this for an isolated log per test.
    pub fn store(mut self, store: Arc<TraceStore>) -> Self {
        self.recording = true;
        self.store = Some(store);
        self
    }

    /// Build the selected variant.
    pub fn build(self) -> Arc<dyn OperationTracer> {
        if !self.recording {
            return Arc::new(NullTracer::new());
        }
        let store = self.store.unwrap_or_else(TraceStore::global);
        Arc::new(RecordingTracer::new(store))
    }
}
