//! Types module
//!
//! Contains core data structures used throughout the application.
//! - `transaction`: identifiers, transaction records and lifecycle statuses
//! - `error`: Error types for the pipeline

pub mod error;
pub mod transaction;

pub use error::PipelineError;
pub use transaction::{
    StatusRecord, Transaction, TransactionId, TransactionLookup, TransactionRequest,
    TransactionStatus, TransactionType,
};
