//! In-process load generator
//!
//! Pushes a fixed number of create requests through a pipeline with bounded
//! concurrency, waits for all processing to finish and reports what happened.

use std::time::{Duration, Instant};

use futures::stream::{self, StreamExt};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::core::MetricsSnapshot;
use crate::pipeline::Pipeline;
use crate::types::{TransactionId, TransactionRequest, TransactionStatus, TransactionType};

/// Shape of a load run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadProfile {
    /// Total create requests to send
    pub requests: usize,
    /// Maximum requests in flight at once
    pub concurrency: usize,
}

impl Default for LoadProfile {
    fn default() -> Self {
        Self {
            requests: 100,
            concurrency: 10,
        }
    }
}

/// Outcome of a load run
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    pub requested: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// Transactions that reached `PROCESSED` after draining
    pub processed: usize,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
    /// Successful creates per second of wall-clock time
    pub achieved_tps: f64,
    pub metrics: MetricsSnapshot,
}

/// Run `profile` against `pipeline`
///
/// Requests alternate between credit and debit on a rotating set of accounts.
pub async fn run(pipeline: &Pipeline, profile: LoadProfile) -> LoadReport {
    let concurrency = profile.concurrency.max(1);
    let started = Instant::now();

    let results: Vec<Option<TransactionId>> = stream::iter(0..profile.requests)
        .map(|i| {
            let dispatcher = pipeline.dispatcher().clone();
            async move {
                let tx_type = if i % 2 == 0 {
                    TransactionType::Credit
                } else {
                    TransactionType::Debit
                };
                let request = TransactionRequest::new(
                    format!("account-{}", i % 16),
                    Decimal::new(10050, 2),
                    tx_type.to_string(),
                );
                match dispatcher.create(request).await {
                    Ok(tx) => Some(tx.transaction_id),
                    Err(e) => {
                        tracing::warn!(error = %e, "load request failed");
                        None
                    }
                }
            }
        })
        .buffer_unordered(concurrency)
        .collect()
        .await;

    let elapsed = started.elapsed();
    pipeline.drain().await;

    let created: Vec<TransactionId> = results.into_iter().flatten().collect();
    let processed = created
        .iter()
        .filter(|id| {
            pipeline
                .statuses()
                .get(id)
                .is_some_and(|record| record.status == TransactionStatus::Processed)
        })
        .count();

    let secs = elapsed.as_secs_f64();
    let achieved_tps = if secs > 0.0 {
        created.len() as f64 / secs
    } else {
        0.0
    };

    LoadReport {
        requested: profile.requests,
        succeeded: created.len(),
        failed: profile.requests - created.len(),
        processed,
        elapsed,
        achieved_tps: (achieved_tps * 100.0).round() / 100.0,
        metrics: pipeline.metrics().snapshot(),
    }
}

mod duration_ms {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.as_secs_f64() * 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_load_run_processes_every_request() {
        let config = PipelineConfig::new(4, Duration::ZERO, Duration::from_millis(1));
        let pipeline = Pipeline::in_memory(&config);

        let report = run(
            &pipeline,
            LoadProfile {
                requests: 50,
                concurrency: 8,
            },
        )
        .await;

        assert_eq!(report.requested, 50);
        assert_eq!(report.succeeded, 50);
        assert_eq!(report.failed, 0);
        assert_eq!(report.processed, 50);
        assert_eq!(report.metrics.total_requests, 50);
    }

    #[tokio::test]
    async fn test_empty_profile() {
        let pipeline = Pipeline::in_memory(&PipelineConfig::default().without_delays());

        let report = run(
            &pipeline,
            LoadProfile {
                requests: 0,
                concurrency: 0,
            },
        )
        .await;

        assert_eq!(report.succeeded, 0);
        assert_eq!(report.metrics.total_requests, 0);
        assert_eq!(report.metrics.p99_latency_ms, 0.0);
    }
}
