//! Pipeline configuration

use std::time::Duration;

/// Default simulated hand-off time for the in-memory queue
pub const DEFAULT_ENQUEUE_DELAY: Duration = Duration::from_millis(5);

/// Default simulated processing time per transaction
pub const DEFAULT_PROCESSING_DELAY: Duration = Duration::from_millis(10);

/// Configuration for the processing pipeline
///
/// Controls the size of the worker pool and the two simulated delays.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineConfig {
    /// Maximum number of processor runs executing concurrently
    pub worker_count: usize,
    /// Time the in-memory queue takes to accept a hand-off
    pub enqueue_delay: Duration,
    /// Time a processor run waits before completing a transaction
    pub processing_delay: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            worker_count: num_cpus::get(),
            enqueue_delay: DEFAULT_ENQUEUE_DELAY,
            processing_delay: DEFAULT_PROCESSING_DELAY,
        }
    }
}

impl PipelineConfig {
    /// Create a PipelineConfig with custom values
    ///
    /// A worker count of zero falls back to the default with a warning.
    /// Zero delays are allowed.
    pub fn new(worker_count: usize, enqueue_delay: Duration, processing_delay: Duration) -> Self {
        let default = Self::default();

        let worker_count = if worker_count == 0 {
            tracing::warn!(
                "Invalid worker_count ({}), using default ({})",
                worker_count,
                default.worker_count
            );
            default.worker_count
        } else {
            worker_count
        };

        Self {
            worker_count,
            enqueue_delay,
            processing_delay,
        }
    }

    /// Same pool size, no simulated delays
    pub fn without_delays(mut self) -> Self {
        self.enqueue_delay = Duration::ZERO;
        self.processing_delay = Duration::ZERO;
        self
    }
}
