//! Pipeline assembly
//!
//! Builds the shared structures, restores them from a persistence adapter and
//! wires the processor, worker pool and dispatcher around them.
//!
//! # Architecture
//!
//! ```text
//! Pipeline
//!     ├── Arc<Ledger>
//!     ├── Arc<StatusStore>
//!     ├── Arc<MetricsAggregator>
//!     ├── Arc<WorkerPool>
//!     ├── Option<Arc<Checkpointer>>  (only with a persistence adapter)
//!     └── Dispatcher ──► OutboundQueue
//!             └────────► Processor (scheduled on the pool)
//! ```

use std::sync::Arc;

use crate::config::PipelineConfig;
use crate::core::{
    Checkpointer, Dispatcher, InMemoryQueue, Ledger, MetricsAggregator, OutboundQueue, Processor,
    StatusStore, WorkerPool,
};
use crate::persistence::{PersistenceAdapter, PipelineSnapshot};
use crate::types::PipelineError;

/// A fully wired processing pipeline
#[derive(Debug, Clone)]
pub struct Pipeline {
    dispatcher: Dispatcher,
    ledger: Arc<Ledger>,
    statuses: Arc<StatusStore>,
    metrics: Arc<MetricsAggregator>,
    pool: Arc<WorkerPool>,
    checkpointer: Option<Arc<Checkpointer>>,
}

impl Pipeline {
    /// Memory-only pipeline using the simulated queue
    ///
    /// Must be called from within a tokio runtime.
    pub fn in_memory(config: &PipelineConfig) -> Self {
        let queue = Arc::new(InMemoryQueue::new(config.enqueue_delay));
        Self::assemble(config, PipelineSnapshot::default(), queue, None)
    }

    /// Load state from `store` and build a pipeline that checkpoints into it
    ///
    /// Transactions restored without a terminal status are scheduled for
    /// processing again.
    ///
    /// # Errors
    ///
    /// Returns the adapter's error if the snapshot cannot be loaded.
    pub async fn bootstrap(
        config: &PipelineConfig,
        store: Arc<dyn PersistenceAdapter>,
        queue: Arc<dyn OutboundQueue>,
    ) -> Result<Self, PipelineError> {
        let snapshot = store.load().await?;
        let pipeline = Self::assemble(config, snapshot, queue, Some(store));

        let mut resumed = 0usize;
        for id in pipeline.ledger.snapshot().into_keys() {
            if !pipeline.statuses.contains(&id) {
                pipeline.dispatcher.resume(id)?;
                resumed += 1;
            }
        }

        tracing::info!(
            transactions = pipeline.ledger.len(),
            completed = pipeline.statuses.len(),
            resumed,
            workers = pipeline.pool.size(),
            "pipeline ready"
        );
        Ok(pipeline)
    }

    fn assemble(
        config: &PipelineConfig,
        snapshot: PipelineSnapshot,
        queue: Arc<dyn OutboundQueue>,
        store: Option<Arc<dyn PersistenceAdapter>>,
    ) -> Self {
        let ledger = Arc::new(Ledger::from_snapshot(snapshot.transactions));
        let statuses = Arc::new(StatusStore::from_snapshot(snapshot.statuses));
        let metrics = Arc::new(MetricsAggregator::from_state(snapshot.metrics));
        let pool = Arc::new(WorkerPool::new(config.worker_count));

        let checkpointer = store.map(|store| {
            Arc::new(Checkpointer::new(
                Arc::clone(&ledger),
                Arc::clone(&statuses),
                Arc::clone(&metrics),
                store,
            ))
        });

        let processor = Processor::new(
            Arc::clone(&ledger),
            Arc::clone(&statuses),
            checkpointer.clone(),
            config.processing_delay,
        );
        let dispatcher = Dispatcher::new(
            Arc::clone(&ledger),
            Arc::clone(&statuses),
            Arc::clone(&metrics),
            queue,
            processor,
            Arc::clone(&pool),
            checkpointer.clone(),
        );

        Self {
            dispatcher,
            ledger,
            statuses,
            metrics,
            pool,
            checkpointer,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn metrics(&self) -> &Arc<MetricsAggregator> {
        &self.metrics
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    pub fn statuses(&self) -> &Arc<StatusStore> {
        &self.statuses
    }

    /// Wait for every scheduled processor run to finish
    pub async fn drain(&self) {
        self.pool.drain().await;
    }

    /// Refuse new work, wait for scheduled work and save a final snapshot
    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
        if let Some(checkpointer) = &self.checkpointer {
            checkpointer.save().await;
        }
    }
}
