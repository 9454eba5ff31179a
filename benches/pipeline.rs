//! Benchmark suite for the hot paths of the pipeline
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```
//!
//! - `metrics_snapshot` - p99/TPS computation over growing sample counts
//! - `create_transactions` - create throughput with delays disabled

use payments_pipeline::core::metrics::MetricsState;
use payments_pipeline::{MetricsAggregator, Pipeline, PipelineConfig, TransactionRequest};
use rust_decimal::Decimal;
use std::time::Duration;

fn main() {
    divan::main();
}

/// Snapshot cost with `n` recorded samples
#[divan::bench(args = [100, 10_000, 1_000_000])]
fn metrics_snapshot(bencher: divan::Bencher, n: u64) {
    let metrics = MetricsAggregator::from_state(MetricsState {
        total_requests: n,
        start_time: chrono::Utc::now() - chrono::Duration::seconds(60),
        latencies: (0..n).map(|i| Duration::from_micros(i % 5_000)).collect(),
    });

    bencher.bench_local(|| metrics.snapshot());
}

/// Create `n` transactions through an in-memory pipeline and drain it
#[divan::bench(args = [100, 1_000])]
fn create_transactions(bencher: divan::Bencher, n: usize) {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .expect("Failed to build runtime");

    bencher.bench_local(|| {
        runtime.block_on(async {
            let pipeline = Pipeline::in_memory(&PipelineConfig::default().without_delays());
            for i in 0..n {
                let request = TransactionRequest::new(
                    format!("account-{}", i % 16),
                    Decimal::new(10050, 2),
                    "credit",
                );
                pipeline
                    .dispatcher()
                    .create(request)
                    .await
                    .expect("Create failed");
            }
            pipeline.drain().await;
        })
    });
}
