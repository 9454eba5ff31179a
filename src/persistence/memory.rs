//! In-memory snapshot store

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{PersistenceAdapter, PipelineSnapshot};
use crate::types::PipelineError;

/// Keeps the most recent snapshot in memory
#[derive(Debug, Default)]
pub struct InMemoryStore {
    latest: Mutex<Option<PipelineSnapshot>>,
    saves: Mutex<usize>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing snapshot, as if it had been saved earlier
    pub fn with_snapshot(snapshot: PipelineSnapshot) -> Self {
        Self {
            latest: Mutex::new(Some(snapshot)),
            saves: Mutex::new(0),
        }
    }

    pub fn latest(&self) -> Option<PipelineSnapshot> {
        self.latest.lock().clone()
    }

    /// Number of successful saves
    pub fn save_count(&self) -> usize {
        *self.saves.lock()
    }
}

#[async_trait]
impl PersistenceAdapter for InMemoryStore {
    async fn load(&self) -> Result<PipelineSnapshot, PipelineError> {
        Ok(self.latest.lock().clone().unwrap_or_default())
    }

    async fn save(&self, snapshot: &PipelineSnapshot) -> Result<(), PipelineError> {
        *self.latest.lock() = Some(snapshot.clone());
        *self.saves.lock() += 1;
        Ok(())
    }
}
