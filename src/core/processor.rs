//! Background completion of transactions
//!
//! A `Processor` run is scheduled once per created transaction. It waits out a
//! simulated processing delay, then records `PROCESSED` in the status store.
//!
//! # Outcomes
//!
//! - `Completed(record)`: the transaction moved to a terminal status
//! - `NoOp(MissingFromLedger)`: nothing was created under that identifier
//! - `NoOp(AlreadyTerminal(status))`: a terminal status was already recorded
//! - `NoOp(NonTerminalTarget(status))`: the requested status is not terminal
//!
//! No-ops are logged and otherwise ignored. There are no retries.

use std::sync::Arc;
use std::time::Duration;

use super::status_store::Transition;
use super::{Checkpointer, Ledger, StatusStore};
use crate::types::{StatusRecord, TransactionId, TransactionStatus};

/// Why a processor run changed nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoOpReason {
    MissingFromLedger,
    AlreadyTerminal(TransactionStatus),
    NonTerminalTarget(TransactionStatus),
}

/// What a processor run did
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessingOutcome {
    Completed(StatusRecord),
    NoOp(NoOpReason),
}

/// Drives transactions from `IN_PROCESSING` to a terminal status
#[derive(Debug, Clone)]
pub struct Processor {
    ledger: Arc<Ledger>,
    statuses: Arc<StatusStore>,
    checkpointer: Option<Arc<Checkpointer>>,
    delay: Duration,
}

impl Processor {
    /// Create a processor
    ///
    /// # Arguments
    ///
    /// * `ledger` - Read to confirm the transaction exists
    /// * `statuses` - Receives the terminal status record
    /// * `checkpointer` - When present, state is saved after each completion
    /// * `delay` - Simulated processing time per run
    pub fn new(
        ledger: Arc<Ledger>,
        statuses: Arc<StatusStore>,
        checkpointer: Option<Arc<Checkpointer>>,
        delay: Duration,
    ) -> Self {
        Self {
            ledger,
            statuses,
            checkpointer,
            delay,
        }
    }

    /// Process one transaction
    pub async fn run(&self, id: TransactionId) -> ProcessingOutcome {
        tracing::info!(transaction_id = %id, "processing transaction");
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.finish(id, TransactionStatus::Processed).await
    }

    /// Drive a transaction to `FAILED`
    ///
    /// Subject to the same rules as [`Processor::run`]: a transaction that is
    /// missing or already terminal is left alone.
    pub async fn fail(&self, id: TransactionId) -> ProcessingOutcome {
        self.finish(id, TransactionStatus::Failed).await
    }

    async fn finish(&self, id: TransactionId, status: TransactionStatus) -> ProcessingOutcome {
        if !self.ledger.contains(&id) {
            tracing::warn!(transaction_id = %id, "transaction missing from ledger, skipping");
            return ProcessingOutcome::NoOp(NoOpReason::MissingFromLedger);
        }

        let transition = match self.statuses.complete(id, status) {
            Ok(transition) => transition,
            Err(e) => {
                tracing::error!(transaction_id = %id, error = %e, "status transition rejected");
                return ProcessingOutcome::NoOp(NoOpReason::NonTerminalTarget(status));
            }
        };

        match transition {
            Transition::Applied(record) => {
                if let Some(checkpointer) = &self.checkpointer {
                    checkpointer.save().await;
                }
                tracing::info!(transaction_id = %id, status = %record.status, "transaction completed");
                ProcessingOutcome::Completed(record)
            }
            Transition::AlreadyTerminal(existing) => {
                tracing::warn!(
                    transaction_id = %id,
                    status = %existing,
                    "transaction already terminal, ignoring completion"
                );
                ProcessingOutcome::NoOp(NoOpReason::AlreadyTerminal(existing))
            }
        }
    }
}
