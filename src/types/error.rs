//! Error types for the payments pipeline
//!
//! # Error Categories
//!
//! - **Client errors**: unrecognized transaction type, unknown transaction identifier
//! - **Durability errors**: snapshot save/load failures (logged, never fatal to a request)
//! - **Hand-off errors**: the outbound queue refused a transaction
//! - **Lifecycle errors**: illegal status transitions, use after shutdown
//!
//! A processor run that finds nothing to do is not an error; see
//! [`crate::core::processor::ProcessingOutcome`].

use thiserror::Error;

use super::transaction::TransactionStatus;

/// Main error type for the payments pipeline
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PipelineError {
    /// A request field carried a value outside its enumeration
    ///
    /// Surfaced to the caller as a client error. Nothing is written.
    #[error("Invalid value '{value}' for field '{field}'")]
    InvalidArgument {
        /// Name of the offending field
        field: String,
        /// The value that was rejected
        value: String,
    },

    /// No transaction is known under this identifier
    #[error("Transaction {id} not found")]
    NotFound {
        /// The identifier as the caller supplied it
        id: String,
    },

    /// Snapshot could not be saved or loaded
    ///
    /// Degrades durability only. The in-memory state stays authoritative.
    #[error("Persistence failure: {message}")]
    Persistence {
        /// Description of the underlying I/O or encoding error
        message: String,
    },

    /// The outbound queue rejected the hand-off
    #[error("Failed to enqueue transaction {id}: {message}")]
    Enqueue {
        /// Transaction that could not be handed off
        id: String,
        /// Reason reported by the queue
        message: String,
    },

    /// A status change that the lifecycle does not allow
    #[error("Illegal status transition for transaction {id}: {from} -> {to}")]
    InvalidTransition {
        id: String,
        from: TransactionStatus,
        to: TransactionStatus,
    },

    /// The worker pool no longer accepts work
    #[error("Pipeline is shutting down")]
    ShuttingDown,
}

impl From<std::io::Error> for PipelineError {
    fn from(error: std::io::Error) -> Self {
        PipelineError::Persistence {
            message: error.to_string(),
        }
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(error: serde_json::Error) -> Self {
        PipelineError::Persistence {
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl PipelineError {
    /// Create an InvalidArgument error
    pub fn invalid_argument(field: &str, value: &str) -> Self {
        PipelineError::InvalidArgument {
            field: field.to_string(),
            value: value.to_string(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(id: impl ToString) -> Self {
        PipelineError::NotFound { id: id.to_string() }
    }

    /// Create a Persistence error
    pub fn persistence(message: impl Into<String>) -> Self {
        PipelineError::Persistence {
            message: message.into(),
        }
    }

    /// Create an Enqueue error
    pub fn enqueue(id: impl ToString, message: impl Into<String>) -> Self {
        PipelineError::Enqueue {
            id: id.to_string(),
            message: message.into(),
        }
    }

    /// Create an InvalidTransition error
    pub fn invalid_transition(
        id: impl ToString,
        from: TransactionStatus,
        to: TransactionStatus,
    ) -> Self {
        PipelineError::InvalidTransition {
            id: id.to_string(),
            from,
            to,
        }
    }

    /// Whether the caller sent something wrong (as opposed to the pipeline failing)
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidArgument { .. } | PipelineError::NotFound { .. }
        )
    }
}
