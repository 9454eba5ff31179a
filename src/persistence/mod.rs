//! Persistence adapter
//!
//! Durability sits outside the concurrency-critical path. The pipeline asks a
//! [`PersistenceAdapter`] for a snapshot once at startup and hands it a fresh
//! snapshot after every mutating operation. Failures degrade durability only.
//!
//! - [`JsonFileStore`]: single JSON file, atomically replaced on each save
//! - [`InMemoryStore`]: keeps the latest snapshot in memory (tests, ephemeral runs)

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::metrics::MetricsState;
use crate::types::{PipelineError, StatusRecord, Transaction, TransactionId};

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::InMemoryStore;

/// Everything that survives a restart
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineSnapshot {
    pub transactions: HashMap<TransactionId, Transaction>,
    pub statuses: HashMap<TransactionId, StatusRecord>,
    pub metrics: MetricsState,
}

/// Storage backend for pipeline snapshots
#[async_trait]
pub trait PersistenceAdapter: Send + Sync {
    /// Load the last saved snapshot
    ///
    /// A backend with nothing saved yet returns `PipelineSnapshot::default()`.
    async fn load(&self) -> Result<PipelineSnapshot, PipelineError>;

    /// Replace the saved snapshot
    async fn save(&self, snapshot: &PipelineSnapshot) -> Result<(), PipelineError>;
}
