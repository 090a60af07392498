//! # optrace
//!
//! In-memory operation tracer for runtime composition engines.
//!
//! A composition engine merges or overrides attributes at runtime; optrace
//! records each of those mutations as a structured before/after log entry.
//! The engine identifies a mutation with an [`Operation`] descriptor, and the
//! tracer captures the old and new values around the point of mutation —
//! either in one shot or in two phases, because the old value is often known
//! before the new value is computed.
//!
//! ## Quick Start
//!
//! ```
//! use optrace::prelude::*;
//! use std::sync::Arc;
//!
//! # fn main() -> optrace::Result<()> {
//! let store = Arc::new(TraceStore::new());
//! let tracer = TracerBuilder::new().store(store.clone()).build();
//!
//! // One-shot: both values known at the call site.
//! let op = Operation::new().with("field", "x");
//! tracer.log(op, 5.into(), 3.into())?;
//!
//! // Two-phase: register first, complete once the new value exists.
//! let op = Operation::new().with("field", "y");
//! let token = tracer.register(op)?;
//! tracer.log_new_value(token, "after".into())?;
//!
//! assert_eq!(store.len(), 2);
//! # Ok(())
//! # }
//! ```
//!
//! ## Variants
//!
//! Call sites hold an `Arc<dyn OperationTracer>` and never branch on whether
//! tracing is enabled:
//!
//! - [`NullTracer`] — tracing disabled; every call is a pure no-op.
//! - [`RecordingTracer`] — appends entries to a shared [`TraceStore`].
//!
//! The hosting process picks the variant once through [`TracerBuilder`].
//!
//! ## Deferred values
//!
//! Values whose content is computed only on first access (translation
//! proxies, deferred formatting) must not be evaluated by the tracer —
//! evaluation can trigger side effects in the host. Such values implement
//! [`DeferredValue`]; the tracer stores the concatenation of their
//! construction arguments as a string surrogate and never forces them.
//!
//! ## Scope
//!
//! The tracer is purely reactive and in-memory: no persistence, transport,
//! or display formatting. The [`TraceStore`] exposes the ordered log for
//! external tooling to read or clear.

#![warn(missing_docs)]

mod error;
mod operation;
mod store;
mod tracer;
mod value;

pub mod prelude;

pub use error::{Error, Result};
pub use operation::{Operation, RESERVED_KEYS};
pub use store::{EntryToken, TraceEntry, TraceStore};
pub use tracer::{NullTracer, OperationTracer, RecordingTracer, TracerBuilder};
pub use value::{DeferredValue, TraceValue};
