//! The trace store: an ordered, append-only log of mutation records.
//!
//! A [`TraceStore`] is shared (via `Arc`) by every recording tracer built
//! over it, so one store holds one process-wide log in append order. The
//! store hands out [`EntryToken`]s at registration time; the token is the
//! correlation key threaded through the two-phase `register` →
//! `log_new_value` protocol.
//!
//! The store never rotates or truncates itself. External tooling may read
//! entries at any time and may [`clear`](TraceStore::clear) the log; tokens
//! are never reused, so a token issued before a clear simply stops resolving.

use crate::error::{Error, Result};
use crate::operation::Operation;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Correlation token for a registered trace entry.
///
/// Issued by [`TraceStore::register`] (and `log`) from a process-wide
/// monotonic counter, so a token is unique across every store in the
/// process — a token can only ever resolve in the store that issued it.
/// [`EntryToken::NULL`] is never issued; the null tracer returns it from
/// call sites that would otherwise register an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntryToken(u64);

impl EntryToken {
    /// Token that resolves to no entry in any store.
    pub const NULL: EntryToken = EntryToken(0);

    /// Check if this is the null token.
    pub fn is_null(&self) -> bool {
        *self == Self::NULL
    }
}

impl fmt::Display for EntryToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One mutation record: a descriptor augmented with its before/after values.
///
/// `None` means "not yet recorded" and is distinct from a recorded JSON
/// `null`. Entries appended by the one-shot `log` path are complete from the
/// start; entries created by `register` gain their `new_value` when
/// `log_new_value` runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceEntry {
    /// Correlation token this entry was issued under.
    pub token: EntryToken,
    /// Caller-supplied descriptor of the mutation.
    pub operation: Operation,
    /// Value before the mutation, if recorded.
    pub old_value: Option<Value>,
    /// Value after the mutation, if recorded.
    pub new_value: Option<Value>,
}

impl TraceEntry {
    /// Render the entry as a single JSON object for external tooling:
    /// the descriptor keys plus `old_value` and `new_value` (unset values
    /// render as `null`).
    pub fn to_json(&self) -> Value {
        let mut object = serde_json::Map::new();
        for (key, value) in self.operation.iter() {
            object.insert(key.to_string(), Value::String(value.to_string()));
        }
        object.insert(
            "old_value".to_string(),
            self.old_value.clone().unwrap_or(Value::Null),
        );
        object.insert(
            "new_value".to_string(),
            self.new_value.clone().unwrap_or(Value::Null),
        );
        Value::Object(object)
    }
}

/// Process-wide token source. Shared by every store so tokens never alias
/// across stores; starts above [`EntryToken::NULL`].
static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

fn issue_token() -> EntryToken {
    EntryToken(NEXT_TOKEN.fetch_add(1, Ordering::SeqCst))
}

struct StoreInner {
    entries: Vec<TraceEntry>,
}

/// Ordered, append-only store of trace entries.
///
/// All mutating operations take the internal lock, so the store is safe to
/// share across threads; each call is individually atomic. Token lookup is a
/// linear scan over the current log.
pub struct TraceStore {
    inner: Mutex<StoreInner>,
}

static GLOBAL_STORE: Lazy<Arc<TraceStore>> = Lazy::new(|| Arc::new(TraceStore::new()));

impl TraceStore {
    /// Create an empty store.
    pub fn new() -> Self {
        TraceStore {
            inner: Mutex::new(StoreInner {
                entries: Vec::new(),
            }),
        }
    }

    /// The process-wide default store.
    ///
    /// Recording tracers built without an explicit store share this one log.
    /// Tests should construct their own store for isolation.
    pub fn global() -> Arc<TraceStore> {
        Arc::clone(&GLOBAL_STORE)
    }

    /// Register a mutation ahead of its values being known.
    ///
    /// Appends a partial entry (both values unset) and issues the token the
    /// caller threads through to `log_new_value`.
    pub fn register(&self, operation: Operation) -> Result<EntryToken> {
        operation.validate()?;
        let mut inner = self.inner.lock();
        let token = issue_token();
        tracing::trace!(%token, "register trace entry");
        inner.entries.push(TraceEntry {
            token,
            operation,
            old_value: None,
            new_value: None,
        });
        Ok(token)
    }

    /// Append a complete entry with both values recorded.
    ///
    /// Parameter order matches `OperationTracer::log`: new value first.
    pub fn append(
        &self,
        operation: Operation,
        new_value: Value,
        old_value: Value,
    ) -> Result<EntryToken> {
        operation.validate()?;
        let mut inner = self.inner.lock();
        let token = issue_token();
        tracing::trace!(%token, "append complete trace entry");
        inner.entries.push(TraceEntry {
            token,
            operation,
            old_value: Some(old_value),
            new_value: Some(new_value),
        });
        Ok(token)
    }

    /// Set the after-value of a registered entry, in place.
    ///
    /// A repeated call with the same token overwrites the same entry; the
    /// store length never changes here. An unknown token is a contract
    /// violation: the caller skipped registration (or holds a token from a
    /// different store), and appending a partial entry instead would break
    /// the one-entry-per-mutation invariant.
    pub fn set_new_value(&self, token: EntryToken, new_value: Value) -> Result<()> {
        let mut inner = self.inner.lock();
        let entry = inner
            .entries
            .iter_mut()
            .find(|entry| entry.token == token)
            .ok_or(Error::EntryNotFound(token))?;
        tracing::trace!(%token, "set new_value on trace entry");
        entry.new_value = Some(new_value);
        Ok(())
    }

    /// Look up an entry by token.
    pub fn get(&self, token: EntryToken) -> Option<TraceEntry> {
        self.inner
            .lock()
            .entries
            .iter()
            .find(|entry| entry.token == token)
            .cloned()
    }

    /// Number of entries currently in the log.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Check if the log is empty.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Snapshot of all entries in append order.
    pub fn entries(&self) -> Vec<TraceEntry> {
        self.inner.lock().entries.clone()
    }

    /// Drop all entries.
    ///
    /// The process-wide token counter is never reset, so tokens issued
    /// before the clear stop resolving rather than aliasing later entries.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        tracing::debug!(dropped = inner.entries.len(), "clear trace store");
        inner.entries.clear();
    }
}

impl Default for TraceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn register_appends_partial_entry() {
        let store = TraceStore::new();
        let token = store.register(Operation::new().with("field", "x")).unwrap();

        assert_eq!(store.len(), 1);
        let entry = store.get(token).unwrap();
        assert_eq!(entry.old_value, None);
        assert_eq!(entry.new_value, None);
        assert_eq!(entry.operation.get("field"), Some("x"));
    }

    #[test]
    fn append_is_complete_from_the_start() {
        let store = TraceStore::new();
        let token = store
            .append(Operation::new(), json!(5), json!(3))
            .unwrap();

        let entry = store.get(token).unwrap();
        assert_eq!(entry.old_value, Some(json!(3)));
        assert_eq!(entry.new_value, Some(json!(5)));
    }

    #[test]
    fn tokens_are_unique_across_paths() {
        let store = TraceStore::new();
        let a = store.register(Operation::new()).unwrap();
        let b = store.append(Operation::new(), json!(2), json!(1)).unwrap();
        let c = store.register(Operation::new()).unwrap();
        assert!(a != b && b != c && a != c);
    }

    #[test]
    fn token_from_another_store_never_aliases() {
        // Both stores hold entries, so a per-store counter would hand out
        // numerically colliding tokens here.
        let a = TraceStore::new();
        let b = TraceStore::new();
        let token_a = a.register(Operation::new().with("store", "a")).unwrap();
        let token_b = b.register(Operation::new().with("store", "b")).unwrap();
        assert_ne!(token_a, token_b);

        let err = b.set_new_value(token_a, json!("smuggled")).unwrap_err();
        assert!(err.is_entry_not_found());
        assert_eq!(b.get(token_b).unwrap().new_value, None);
    }

    #[test]
    fn set_new_value_updates_in_place() {
        let store = TraceStore::new();
        let token = store.register(Operation::new()).unwrap();

        store.set_new_value(token, json!(1)).unwrap();
        store.set_new_value(token, json!(2)).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.get(token).unwrap().new_value, Some(json!(2)));
    }

    #[test]
    fn set_new_value_on_unknown_token_fails_without_append() {
        let store = TraceStore::new();
        let err = store.set_new_value(EntryToken::NULL, json!(1)).unwrap_err();
        assert!(err.is_entry_not_found());
        assert!(store.is_empty());
    }

    #[test]
    fn reserved_keys_rejected_on_both_paths() {
        let store = TraceStore::new();
        let op = Operation::new().with("new_value", "x");
        assert!(store.register(op.clone()).unwrap_err().is_reserved_key());
        assert!(store
            .append(op, json!(2), json!(1))
            .unwrap_err()
            .is_reserved_key());
        assert!(store.is_empty());
    }

    #[test]
    fn entries_snapshot_preserves_append_order() {
        let store = TraceStore::new();
        for n in 0..3 {
            store
                .append(Operation::new().with("n", n.to_string()), json!(n + 1), json!(n))
                .unwrap();
        }

        let snapshot = store.entries();
        let order: Vec<_> = snapshot
            .iter()
            .map(|e| e.operation.get("n").unwrap().to_string())
            .collect();
        assert_eq!(order, ["0", "1", "2"]);
    }

    #[test]
    fn clear_drops_entries_but_not_token_uniqueness() {
        let store = TraceStore::new();
        let stale = store.register(Operation::new()).unwrap();
        store.clear();
        assert!(store.is_empty());

        let fresh = store.register(Operation::new()).unwrap();
        assert_ne!(stale, fresh);
        assert!(store.get(stale).is_none());
        assert!(store.set_new_value(stale, json!(1)).is_err());
    }

    #[test]
    fn entry_renders_to_augmented_object() {
        let store = TraceStore::new();
        let token = store
            .append(Operation::new().with("field", "x"), json!(5), json!(3))
            .unwrap();

        let rendered = store.get(token).unwrap().to_json();
        assert_eq!(
            rendered,
            json!({"field": "x", "old_value": 3, "new_value": 5})
        );
    }

    #[test]
    fn partial_entry_renders_unset_values_as_null() {
        let store = TraceStore::new();
        let token = store.register(Operation::new().with("field", "x")).unwrap();

        let rendered = store.get(token).unwrap().to_json();
        assert_eq!(
            rendered,
            json!({"field": "x", "old_value": null, "new_value": null})
        );
    }
}
