//! Thread-safe ledger of created transactions
//!
//! The `Ledger` is the record of what callers asked for. Entries are written once
//! by the dispatcher and never removed while the process runs.
//!
//! # Thread Safety
//!
//! Backed by `DashMap`, so each shard is guarded by its own read-write lock:
//! lookups on different identifiers proceed in parallel, and a reader never
//! observes a half-written entry.

use std::collections::HashMap;

use dashmap::DashMap;

use crate::types::{Transaction, TransactionId};

/// Concurrent map from transaction identifier to the transaction as created
#[derive(Debug, Default)]
pub struct Ledger {
    transactions: DashMap<TransactionId, Transaction>,
}

impl Ledger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self {
            transactions: DashMap::new(),
        }
    }

    /// Rebuild a ledger from a persisted snapshot
    pub fn from_snapshot(transactions: HashMap<TransactionId, Transaction>) -> Self {
        Self {
            transactions: transactions.into_iter().collect(),
        }
    }

    /// Insert a transaction (thread-safe)
    ///
    /// Ledger entries are immutable once written. If an entry already exists
    /// under the same identifier the existing one is kept and `false` is returned.
    pub fn insert(&self, transaction: Transaction) -> bool {
        let mut inserted = false;
        self.transactions
            .entry(transaction.transaction_id)
            .or_insert_with(|| {
                inserted = true;
                transaction
            });
        inserted
    }

    /// Get a copy of a transaction
    ///
    /// The entry is cloned so no shard lock outlives the call.
    pub fn get(&self, id: &TransactionId) -> Option<Transaction> {
        self.transactions.get(id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: &TransactionId) -> bool {
        self.transactions.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }

    /// Copy every entry out for persistence
    pub fn snapshot(&self) -> HashMap<TransactionId, Transaction> {
        self.transactions
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }
}
