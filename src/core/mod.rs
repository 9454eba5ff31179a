//! Core transaction pipeline
//!
//! This module contains the concurrency-critical components:
//! - `ledger` - Transactions as created
//! - `status_store` - Terminal statuses, authoritative for reads once present
//! - `metrics` - Latency samples, request count, TPS and p99
//! - `queue` - Outbound hand-off abstraction
//! - `worker_pool` - Bounded pool running processor invocations
//! - `processor` - Moves a transaction to its terminal status
//! - `dispatcher` - Create and Get
//! - `checkpoint` - Saves the shared state through a persistence adapter

pub mod checkpoint;
pub mod dispatcher;
pub mod ledger;
pub mod metrics;
pub mod processor;
pub mod queue;
pub mod status_store;
pub mod worker_pool;

pub use checkpoint::Checkpointer;
pub use dispatcher::Dispatcher;
pub use ledger::Ledger;
pub use metrics::{MetricsAggregator, MetricsSnapshot, MetricsState};
pub use processor::{NoOpReason, ProcessingOutcome, Processor};
pub use queue::{InMemoryQueue, OutboundQueue};
pub use status_store::{StatusStore, Transition};
pub use worker_pool::WorkerPool;
