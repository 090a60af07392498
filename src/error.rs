//! Unified error types for optrace.
//!
//! All fallible tracer and store operations return [`Result`]. Errors are
//! contract violations local to the calling site; nothing retries and nothing
//! is fatal.

use crate::store::EntryToken;
use thiserror::Error;

/// All optrace errors.
#[derive(Debug, Error)]
pub enum Error {
    /// No entry exists for the given correlation token.
    ///
    /// Raised by `log_new_value` when the token was never issued by the
    /// backing store (or was issued before a `clear`). The store is left
    /// untouched: a missing entry is never silently created, since that would
    /// break the one-entry-per-mutation invariant.
    #[error("no trace entry for token {0}")]
    EntryNotFound(EntryToken),

    /// Operation descriptor uses a key reserved for the tracer.
    ///
    /// `old_value` and `new_value` belong to the trace entry itself; caller
    /// descriptors must not contain them.
    #[error("descriptor key {0:?} is reserved")]
    ReservedKey(String),
}

/// Result type for optrace operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this is a missing-entry (unknown token) error.
    pub fn is_entry_not_found(&self) -> bool {
        matches!(self, Error::EntryNotFound(_))
    }

    /// Check if this is a reserved-key constraint violation.
    pub fn is_reserved_key(&self) -> bool {
        matches!(self, Error::ReservedKey(_))
    }
}
