//! JSON file snapshot store

use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::{PersistenceAdapter, PipelineSnapshot};
use crate::types::PipelineError;

/// Stores the snapshot as one JSON document
///
/// Saves go to a sibling `.tmp` file which is then renamed over the target, so
/// a crash mid-save leaves the previous snapshot intact.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name: OsString = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }
}

#[async_trait]
impl PersistenceAdapter for JsonFileStore {
    async fn load(&self) -> Result<PipelineSnapshot, PipelineError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no snapshot found, starting empty");
                return Ok(PipelineSnapshot::default());
            }
            Err(e) => return Err(e.into()),
        };

        if bytes.is_empty() {
            return Ok(PipelineSnapshot::default());
        }

        let snapshot: PipelineSnapshot = serde_json::from_slice(&bytes)?;
        tracing::info!(
            path = %self.path.display(),
            transactions = snapshot.transactions.len(),
            statuses = snapshot.statuses.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    async fn save(&self, snapshot: &PipelineSnapshot) -> Result<(), PipelineError> {
        let bytes = serde_json::to_vec(snapshot)?;
        let temp = self.temp_path();
        tokio::fs::write(&temp, bytes).await?;
        tokio::fs::rename(&temp, &self.path).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::metrics::MetricsState;
    use crate::types::{
        StatusRecord, Transaction, TransactionId, TransactionStatus, TransactionType,
    };
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::time::Duration;
    use tempfile::tempdir;

    fn sample_snapshot() -> PipelineSnapshot {
        let pending = TransactionId::new();
        let done = TransactionId::new();
        let mut snapshot = PipelineSnapshot::default();

        for (id, amount) in [(pending, Decimal::new(-250, 2)), (done, Decimal::new(10050, 2))] {
            snapshot.transactions.insert(
                id,
                Transaction {
                    transaction_id: id,
                    account_id: "A1".to_string(),
                    amount,
                    tx_type: TransactionType::Debit,
                    status: TransactionStatus::InProcessing,
                },
            );
        }
        snapshot.statuses.insert(
            done,
            StatusRecord {
                transaction_id: done,
                status: TransactionStatus::Processed,
                processed_at: Utc::now(),
            },
        );
        snapshot.metrics = MetricsState {
            total_requests: 2,
            start_time: Utc::now(),
            latencies: vec![Duration::from_micros(1500), Duration::from_millis(6)],
        };
        snapshot
    }

    #[tokio::test]
    async fn test_missing_file_is_cold_start() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));

        let snapshot = store.load().await.unwrap();
        assert!(snapshot.transactions.is_empty());
        assert!(snapshot.statuses.is_empty());
        assert_eq!(snapshot.metrics.total_requests, 0);
    }

    #[tokio::test]
    async fn test_save_then_load_reproduces_state() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        let snapshot = sample_snapshot();

        store.save(&snapshot).await.unwrap();
        let loaded = store.load().await.unwrap();

        assert_eq!(loaded, snapshot);
        assert!(!store.temp_path().exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_a_persistence_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let err = JsonFileStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, PipelineError::Persistence { .. }));
    }

    #[tokio::test]
    async fn test_save_into_missing_directory_fails() {
        let dir = tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("missing").join("state.json"));

        let err = store.save(&PipelineSnapshot::default()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Persistence { .. }));
    }
}
