//! Payments Pipeline Library
//! # Overview
//!
//! This library accepts payment transactions, hands each one to an outbound
//! queue, completes it asynchronously on a bounded worker pool and reports
//! throughput and tail latency.
//!
//! # Architecture
//!
//! - [`types`] - Transaction records, statuses and errors
//! - [`core`] - The pipeline itself:
//!   - [`core::dispatcher`] - Create and Get
//!   - [`core::processor`] - Background completion
//!   - [`core::ledger`] / [`core::status_store`] - Shared tables
//!   - [`core::metrics`] - TPS and p99 latency
//! - [`persistence`] - Snapshot storage backends
//! - [`pipeline`] - Wiring and startup restore
//! - [`http`] - JSON API
//! - [`cli`] - Command-line arguments
//!
//! # Transaction Lifecycle
//!
//! - **in_processing**: set at creation, returned by every successful create
//! - **processed**: written by the processor after the simulated delay
//! - **failed**: written when the hand-off to the queue fails
//!
//! Terminal statuses never change.

// Module declarations
pub mod cli;
pub mod config;
pub mod core;
pub mod http;
pub mod loadgen;
pub mod persistence;
pub mod pipeline;
pub mod telemetry;
pub mod types;

pub use self::config::PipelineConfig;
pub use self::core::{Dispatcher, MetricsAggregator, MetricsSnapshot, Processor};
pub use pipeline::Pipeline;
pub use types::{
    PipelineError, StatusRecord, Transaction, TransactionId, TransactionLookup,
    TransactionRequest, TransactionStatus, TransactionType,
};
