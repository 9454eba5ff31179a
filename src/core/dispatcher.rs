//! Entry point for creating and looking up transactions
//!
//! # Create
//!
//! ```text
//! parse type ─► ledger write ─► checkpoint ─► enqueue (awaited) ─► schedule processor
//!     │                                           │
//!     └─ InvalidArgument, nothing written         └─ on failure: mark FAILED, no processor run
//! ```
//!
//! The latency sample covers everything up to and including the enqueue step;
//! processing itself is never awaited.
//!
//! # Get
//!
//! Status store first, then the ledger. A lookup may see `IN_PROCESSING` or a
//! terminal status depending on how it races with the processor.

use std::sync::Arc;
use std::time::Instant;

use super::{Checkpointer, Ledger, MetricsAggregator, OutboundQueue, Processor, StatusStore, WorkerPool};
use crate::types::{
    PipelineError, Transaction, TransactionId, TransactionLookup, TransactionRequest,
    TransactionStatus, TransactionType,
};

/// Accepts new transactions and answers status lookups
///
/// Cheap to clone; every clone shares the same ledger, status store, metrics
/// and worker pool.
#[derive(Clone)]
pub struct Dispatcher {
    ledger: Arc<Ledger>,
    statuses: Arc<StatusStore>,
    metrics: Arc<MetricsAggregator>,
    queue: Arc<dyn OutboundQueue>,
    processor: Processor,
    pool: Arc<WorkerPool>,
    checkpointer: Option<Arc<Checkpointer>>,
}

impl Dispatcher {
    /// Wire a dispatcher around its collaborators
    ///
    /// # Arguments
    ///
    /// * `ledger` / `statuses` / `metrics` - Shared state, also read by the HTTP layer
    /// * `queue` - Outbound hand-off, awaited on every create
    /// * `processor` - Scheduled once per created transaction
    /// * `pool` - Runs processor invocations
    /// * `checkpointer` - When present, state is saved after each ledger write
    pub fn new(
        ledger: Arc<Ledger>,
        statuses: Arc<StatusStore>,
        metrics: Arc<MetricsAggregator>,
        queue: Arc<dyn OutboundQueue>,
        processor: Processor,
        pool: Arc<WorkerPool>,
        checkpointer: Option<Arc<Checkpointer>>,
    ) -> Self {
        Self {
            ledger,
            statuses,
            metrics,
            queue,
            processor,
            pool,
            checkpointer,
        }
    }

    /// Create a transaction and schedule its processing
    ///
    /// # Returns
    ///
    /// * `Ok(Transaction)` - Always with status `IN_PROCESSING`
    /// * `Err(PipelineError::InvalidArgument)` - Unrecognized type; nothing written or counted
    /// * `Err(PipelineError::ShuttingDown)` - The worker pool is closed; nothing written
    /// * `Err(PipelineError::Enqueue)` - The queue refused the hand-off; the
    ///   transaction is recorded as `FAILED`
    pub async fn create(&self, request: TransactionRequest) -> Result<Transaction, PipelineError> {
        let started = Instant::now();

        let tx_type: TransactionType = request.tx_type.parse()?;
        if self.pool.is_closed() {
            return Err(PipelineError::ShuttingDown);
        }

        let transaction = Transaction {
            transaction_id: TransactionId::new(),
            account_id: request.account_id,
            amount: request.amount,
            tx_type,
            status: TransactionStatus::InProcessing,
        };
        let id = transaction.transaction_id;

        // Ledger write happens before the hand-off so the processor always finds it.
        self.ledger.insert(transaction.clone());
        self.checkpoint().await;

        if let Err(e) = self.queue.enqueue(id).await {
            tracing::error!(transaction_id = %id, error = %e, "enqueue failed, marking transaction failed");
            self.processor.fail(id).await;
            return Err(e);
        }

        let processor = self.processor.clone();
        if let Err(e) = self.pool.spawn(async move {
            processor.run(id).await;
        }) {
            // Shut down between the check above and now.
            self.processor.fail(id).await;
            return Err(e);
        }

        self.metrics.record_latency(started.elapsed());
        self.metrics.increment_requests();

        Ok(transaction)
    }

    /// Look a transaction up by its identifier
    ///
    /// A latency sample is recorded whether or not the lookup hits.
    pub fn get(&self, id: &str) -> Result<TransactionLookup, PipelineError> {
        let started = Instant::now();
        let result = self.lookup(id);
        self.metrics.record_latency(started.elapsed());

        tracing::debug!(transaction_id = id, found = result.is_ok(), "transaction lookup");
        result
    }

    fn lookup(&self, id: &str) -> Result<TransactionLookup, PipelineError> {
        let parsed: TransactionId = id.parse()?;

        if let Some(record) = self.statuses.get(&parsed) {
            return Ok(TransactionLookup::Completed(record));
        }
        self.ledger
            .get(&parsed)
            .map(TransactionLookup::Pending)
            .ok_or_else(|| PipelineError::not_found(id))
    }

    /// Re-schedule processing for a transaction that has no terminal status
    ///
    /// Used after restoring a snapshot taken while work was still pending.
    pub fn resume(&self, id: TransactionId) -> Result<(), PipelineError> {
        if self.statuses.contains(&id) || !self.ledger.contains(&id) {
            return Ok(());
        }
        let processor = self.processor.clone();
        self.pool.spawn(async move {
            processor.run(id).await;
        })
    }

    pub fn metrics(&self) -> &Arc<MetricsAggregator> {
        &self.metrics
    }

    pub fn pool(&self) -> &Arc<WorkerPool> {
        &self.pool
    }

    async fn checkpoint(&self) {
        if let Some(checkpointer) = &self.checkpointer {
            checkpointer.save().await;
        }
    }
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("transactions", &self.ledger.len())
            .field("completed", &self.statuses.len())
            .field("workers", &self.pool.size())
            .finish_non_exhaustive()
    }
}
