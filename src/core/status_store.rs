//! Thread-safe store of lifecycle completion results
//!
//! The `StatusStore` overlays the ledger: once a record exists for an identifier
//! it is what readers see. Records are created lazily, the first time a
//! transaction reaches a terminal status.
//!
//! # Lifecycle rule
//!
//! Only `IN_PROCESSING -> PROCESSED` and `IN_PROCESSING -> FAILED` exist. A
//! record, once written, is terminal and is never overwritten; a second
//! completion attempt is reported back as [`Transition::AlreadyTerminal`].

use std::collections::HashMap;

use chrono::Utc;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::types::{PipelineError, StatusRecord, TransactionId, TransactionStatus};

/// Result of asking the store to complete a transaction
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// The record was written
    Applied(StatusRecord),

    /// A terminal status was already recorded; nothing changed
    AlreadyTerminal(TransactionStatus),
}

/// Concurrent map from transaction identifier to its terminal status record
#[derive(Debug, Default)]
pub struct StatusStore {
    records: DashMap<TransactionId, StatusRecord>,
}

impl StatusStore {
    pub fn new() -> Self {
        Self {
            records: DashMap::new(),
        }
    }

    /// Rebuild a status store from a persisted snapshot
    pub fn from_snapshot(records: HashMap<TransactionId, StatusRecord>) -> Self {
        Self {
            records: records.into_iter().collect(),
        }
    }

    /// Record a terminal status for a transaction (atomic per identifier)
    ///
    /// The check for an existing record and the write happen under the same
    /// shard lock, so two racing completions cannot both apply.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` if `status` is not terminal.
    pub fn complete(
        &self,
        id: TransactionId,
        status: TransactionStatus,
    ) -> Result<Transition, PipelineError> {
        if !status.is_terminal() {
            return Err(PipelineError::invalid_transition(
                id,
                TransactionStatus::InProcessing,
                status,
            ));
        }

        match self.records.entry(id) {
            Entry::Occupied(existing) => Ok(Transition::AlreadyTerminal(existing.get().status)),
            Entry::Vacant(slot) => {
                let record = StatusRecord {
                    transaction_id: id,
                    status,
                    processed_at: Utc::now(),
                };
                slot.insert(record.clone());
                Ok(Transition::Applied(record))
            }
        }
    }

    /// Get a copy of the record for an identifier
    pub fn get(&self, id: &TransactionId) -> Option<StatusRecord> {
        self.records.get(id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: &TransactionId) -> bool {
        self.records.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Copy every record out for persistence
    pub fn snapshot(&self) -> HashMap<TransactionId, StatusRecord> {
        self.records
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::sync::Arc;

    #[rstest]
    #[case::processed(TransactionStatus::Processed)]
    #[case::failed(TransactionStatus::Failed)]
    fn test_complete_applies_terminal_status(#[case] status: TransactionStatus) {
        let store = StatusStore::new();
        let id = TransactionId::new();

        let transition = store.complete(id, status).unwrap();
        match transition {
            Transition::Applied(record) => {
                assert_eq!(record.transaction_id, id);
                assert_eq!(record.status, status);
            }
            other => panic!("Expected Applied, got {:?}", other),
        }
        assert_eq!(store.get(&id).unwrap().status, status);
    }

    #[test]
    fn test_complete_rejects_non_terminal_target() {
        let store = StatusStore::new();
        let id = TransactionId::new();

        let err = store
            .complete(id, TransactionStatus::InProcessing)
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidTransition { .. }));
        assert!(store.is_empty());
    }

    #[rstest]
    #[case::processed_then_failed(TransactionStatus::Processed, TransactionStatus::Failed)]
    #[case::failed_then_processed(TransactionStatus::Failed, TransactionStatus::Processed)]
    #[case::processed_twice(TransactionStatus::Processed, TransactionStatus::Processed)]
    fn test_terminal_status_never_changes(
        #[case] first: TransactionStatus,
        #[case] second: TransactionStatus,
    ) {
        let store = StatusStore::new();
        let id = TransactionId::new();

        store.complete(id, first).unwrap();
        let before = store.get(&id).unwrap();

        assert_eq!(
            store.complete(id, second).unwrap(),
            Transition::AlreadyTerminal(first)
        );
        assert_eq!(store.get(&id).unwrap(), before);
    }

    #[test]
    fn test_racing_completions_apply_once() {
        let store = Arc::new(StatusStore::new());
        let id = TransactionId::new();

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                let status = if i % 2 == 0 {
                    TransactionStatus::Processed
                } else {
                    TransactionStatus::Failed
                };
                std::thread::spawn(move || store.complete(id, status).unwrap())
            })
            .collect();

        let applied = handles
            .into_iter()
            .map(|handle| handle.join().unwrap())
            .filter(|transition| matches!(transition, Transition::Applied(_)))
            .count();

        assert_eq!(applied, 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_snapshot_roundtrip() {
        let store = StatusStore::new();
        let id = TransactionId::new();
        store.complete(id, TransactionStatus::Processed).unwrap();

        let restored = StatusStore::from_snapshot(store.snapshot());
        assert_eq!(restored.get(&id), store.get(&id));
        assert!(restored.contains(&id));
    }
}
