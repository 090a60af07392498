//! Convenient imports for optrace.
//!
//! ```
//! use optrace::prelude::*;
//!
//! let tracer = TracerBuilder::new().build();
//! ```

pub use crate::error::{Error, Result};
pub use crate::operation::Operation;
pub use crate::store::{EntryToken, TraceEntry, TraceStore};
pub use crate::tracer::{NullTracer, OperationTracer, RecordingTracer, TracerBuilder};
pub use crate::value::{DeferredValue, TraceValue};

// Re-export serde_json for convenience
pub use serde_json::json;
