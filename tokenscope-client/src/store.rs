//! In-memory mirror of the remote token dataset.

use crate::token::TokenRecord;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

#[derive(Debug, Default)]
struct StoreInner {
    tokens: Arc<Vec<TokenRecord>>,
    last_updated: Option<DateTime<Utc>>,
}

/// Shared handle to the current token collection.
///
/// The collection is replaced wholesale on each successful refresh -
/// last-write-wins on the full set, never a merge. Interleaved refreshes
/// therefore converge to the last response received, which may be stale if
/// the network delivered responses out of order; that gap is accepted and
/// deliberately not papered over with sequencing logic.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically swap in a freshly fetched collection.
    pub fn replace(&self, tokens: Vec<TokenRecord>) {
        let mut inner = self.inner.write();
        inner.tokens = Arc::new(tokens);
        inner.last_updated = Some(Utc::now());
    }

    /// Cheap snapshot of the current collection.
    pub fn snapshot(&self) -> Arc<Vec<TokenRecord>> {
        Arc::clone(&self.inner.read().tokens)
    }

    pub fn len(&self) -> usize {
        self.inner.read().tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// When the mirror was last replaced, if ever.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.inner.read().last_updated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(address: &str) -> TokenRecord {
        TokenRecord {
            address: address.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_replace_swaps_wholesale() {
        let store = TokenStore::new();
        assert!(store.is_empty());
        assert!(store.last_updated().is_none());

        store.replace(vec![record("0xaaa"), record("0xbbb")]);
        assert_eq!(store.len(), 2);
        assert!(store.last_updated().is_some());

        // A later refresh fully replaces, never merges.
        store.replace(vec![record("0xccc")]);
        let snapshot = store.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].address, "0xccc");
    }

    #[test]
    fn test_snapshot_is_stable_across_replace() {
        let store = TokenStore::new();
        store.replace(vec![record("0xaaa")]);
        let before = store.snapshot();
        store.replace(vec![record("0xbbb"), record("0xccc")]);

        // Earlier snapshot still sees its own collection.
        assert_eq!(before.len(), 1);
        assert_eq!(before[0].address, "0xaaa");
        assert_eq!(store.snapshot().len(), 2);
    }
}
