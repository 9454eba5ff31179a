//! Process-wide request metrics
//!
//! The `MetricsAggregator` records one latency sample per timed operation and
//! counts create requests. [`MetricsAggregator::snapshot`] turns those into
//! throughput and p99 latency.
//!
//! # p99 rule
//!
//! Samples are sorted ascending and indexed at `floor(count * 0.99)`. When that
//! index is zero the last (largest) sample is reported instead, so with only a
//! handful of samples the maximum is what shows up.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Serializable metrics state, as persisted in a snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsState {
    pub total_requests: u64,
    pub start_time: DateTime<Utc>,
    /// Samples in arrival order
    pub latencies: Vec<Duration>,
}

impl Default for MetricsState {
    fn default() -> Self {
        Self {
            total_requests: 0,
            start_time: Utc::now(),
            latencies: Vec::new(),
        }
    }
}

/// Point-in-time view of the metrics
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Requests per second since start, two decimals
    pub tps: f64,

    /// 99th percentile latency in milliseconds, two decimals
    #[serde(rename = "p99_latency")]
    pub p99_latency_ms: f64,

    pub total_requests: u64,
}

impl MetricsSnapshot {
    fn zero() -> Self {
        Self {
            tps: 0.0,
            p99_latency_ms: 0.0,
            total_requests: 0,
        }
    }
}

/// Concurrent latency and request-count aggregator
///
/// The request counter is a lone atomic. Latency samples sit behind a
/// read-write lock: appends take the write side briefly, snapshots copy the
/// samples out under the read side and do the sorting after releasing it.
#[derive(Debug)]
pub struct MetricsAggregator {
    start_time: DateTime<Utc>,
    total_requests: AtomicU64,
    latencies: RwLock<Vec<Duration>>,
}

impl Default for MetricsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsAggregator {
    /// Start a fresh aggregator with the clock starting now
    pub fn new() -> Self {
        Self::from_state(MetricsState::default())
    }

    /// Resume from persisted state
    pub fn from_state(state: MetricsState) -> Self {
        Self {
            start_time: state.start_time,
            total_requests: AtomicU64::new(state.total_requests),
            latencies: RwLock::new(state.latencies),
        }
    }

    /// Append one latency sample
    pub fn record_latency(&self, latency: Duration) {
        self.latencies.write().push(latency);
    }

    /// Bump the request counter
    pub fn increment_requests(&self) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total_requests(&self) -> u64 {
        self.total_requests.load(Ordering::Relaxed)
    }

    pub fn sample_count(&self) -> usize {
        self.latencies.read().len()
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Copy the state out for persistence
    pub fn state(&self) -> MetricsState {
        MetricsState {
            total_requests: self.total_requests(),
            start_time: self.start_time,
            latencies: self.latencies.read().clone(),
        }
    }

    /// Compute throughput and p99 as of now
    pub fn snapshot(&self) -> MetricsSnapshot {
        self.snapshot_at(Utc::now())
    }

    /// Compute throughput and p99 as of `now`
    ///
    /// With no latency samples all three fields are zero, whatever the counter says.
    pub fn snapshot_at(&self, now: DateTime<Utc>) -> MetricsSnapshot {
        let mut sorted = self.latencies.read().clone();
        if sorted.is_empty() {
            return MetricsSnapshot::zero();
        }
        sorted.sort_unstable();

        let total_requests = self.total_requests();
        let elapsed_secs = (now - self.start_time)
            .to_std()
            .map(|elapsed| elapsed.as_secs_f64())
            .unwrap_or(0.0);
        let tps = if elapsed_secs > 0.0 {
            total_requests as f64 / elapsed_secs
        } else {
            0.0
        };

        MetricsSnapshot {
            tps: round2(tps),
            p99_latency_ms: round2(p99(&sorted).as_secs_f64() * 1000.0),
            total_requests,
        }
    }
}

/// p99 over an ascending, non-empty slice
fn p99(sorted: &[Duration]) -> Duration {
    let index = (sorted.len() as f64 * 0.99) as usize;
    if index > 0 {
        sorted[index]
    } else {
        sorted[sorted.len() - 1]
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
