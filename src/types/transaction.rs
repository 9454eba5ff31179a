//! Transaction-related types for the payments pipeline
//!
//! This module defines transaction identifiers, types, lifecycle statuses and the
//! records held by the ledger and the status store.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::PipelineError;

/// Transaction identifier
///
/// A random (v4) UUID generated when the transaction is created. Identifiers
/// are never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Generate a fresh identifier
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TransactionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for TransactionId {
    type Err = PipelineError;

    /// Anything that is not a UUID cannot name a transaction, so it maps to `NotFound`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| PipelineError::not_found(s))
    }
}

/// Transaction types accepted by the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money flowing into the account
    Credit,

    /// Money flowing out of the account
    Debit,
}

impl FromStr for TransactionType {
    type Err = PipelineError;

    /// Parse a transaction type, ignoring ASCII case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("credit") {
            Ok(TransactionType::Credit)
        } else if s.eq_ignore_ascii_case("debit") {
            Ok(TransactionType::Debit)
        } else {
            Err(PipelineError::invalid_argument("type", s))
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionType::Credit => f.write_str("credit"),
            TransactionType::Debit => f.write_str("debit"),
        }
    }
}

/// Lifecycle status of a transaction
///
/// ```text
/// InProcessing ──► Processed
///      │
///      └─────────► Failed
/// ```
///
/// `Processed` and `Failed` are terminal: nothing moves out of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    InProcessing,
    Processed,
    Failed,
}

impl TransactionStatus {
    /// Whether no further transition is permitted out of this status
    pub fn is_terminal(self) -> bool {
        matches!(self, TransactionStatus::Processed | TransactionStatus::Failed)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionStatus::InProcessing => f.write_str("in_processing"),
            TransactionStatus::Processed => f.write_str("processed"),
            TransactionStatus::Failed => f.write_str("failed"),
        }
    }
}

/// Raw create request as received from a caller
///
/// The type is kept as a string so that an unrecognized value can be rejected
/// by the dispatcher with `InvalidArgument` before anything is written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRequest {
    #[serde(rename = "accountID")]
    pub account_id: String,

    pub amount: Decimal,

    #[serde(rename = "type")]
    pub tx_type: String,
}

impl TransactionRequest {
    pub fn new(account_id: impl Into<String>, amount: Decimal, tx_type: impl Into<String>) -> Self {
        Self {
            account_id: account_id.into(),
            amount,
            tx_type: tx_type.into(),
        }
    }
}

/// A transaction as written to the ledger
///
/// `account_id`, `amount` and `tx_type` never change after creation. The
/// `status` stored here is the status at creation time; completion results
/// live in the status store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "transactionID")]
    pub transaction_id: TransactionId,

    #[serde(rename = "accountID")]
    pub account_id: String,

    /// Accepted as-is, any sign and scale
    pub amount: Decimal,

    #[serde(rename = "type")]
    pub tx_type: TransactionType,

    pub status: TransactionStatus,
}

/// Completion record written by the processor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    #[serde(rename = "transactionID")]
    pub transaction_id: TransactionId,

    pub status: TransactionStatus,

    pub processed_at: DateTime<Utc>,
}

/// Result of looking a transaction up
///
/// A status record, when present, takes precedence over the ledger entry.
#[derive(Debug, Clone, PartialEq)]
pub enum TransactionLookup {
    /// The processor (or a failure path) recorded a terminal status
    Completed(StatusRecord),

    /// Only the ledger entry exists so far
    Pending(Transaction),
}

impl TransactionLookup {
    pub fn transaction_id(&self) -> TransactionId {
        match self {
            TransactionLookup::Completed(record) => record.transaction_id,
            TransactionLookup::Pending(tx) => tx.transaction_id,
        }
    }

    pub fn status(&self) -> TransactionStatus {
        match self {
            TransactionLookup::Completed(record) => record.status,
            TransactionLookup::Pending(tx) => tx.status,
        }
    }
}
