//! Outbound queue hand-off
//!
//! The dispatcher hands every new transaction to an [`OutboundQueue`] before it
//! schedules processing. [`InMemoryQueue`] stands in for an external message
//! queue: it remembers the identifiers it was given and waits a fixed delay to
//! model the publish round-trip.

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::types::{PipelineError, TransactionId};

/// Destination for newly created transactions
///
/// A real queue client can implement this without the dispatcher changing.
#[async_trait]
pub trait OutboundQueue: Send + Sync {
    /// Publish a transaction identifier
    ///
    /// Returns once the hand-off is complete.
    async fn enqueue(&self, id: TransactionId) -> Result<(), PipelineError>;
}

/// Simulated queue kept in process memory
#[derive(Debug)]
pub struct InMemoryQueue {
    delay: Duration,
    queued: Mutex<VecDeque<TransactionId>>,
}

impl InMemoryQueue {
    /// Create a queue whose hand-off takes `delay`
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            queued: Mutex::new(VecDeque::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.queued.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.queued.lock().is_empty()
    }

    /// Identifiers handed off so far, oldest first
    pub fn queued(&self) -> Vec<TransactionId> {
        self.queued.lock().iter().copied().collect()
    }
}

#[async_trait]
impl OutboundQueue for InMemoryQueue {
    async fn enqueue(&self, id: TransactionId) -> Result<(), PipelineError> {
        tracing::info!(transaction_id = %id, "sending transaction to queue");
        self.queued.lock().push_back(id);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        tracing::info!(transaction_id = %id, "transaction queued");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_enqueue_records_identifiers_in_order() {
        let queue = InMemoryQueue::new(Duration::ZERO);
        let first = TransactionId::new();
        let second = TransactionId::new();

        queue.enqueue(first).await.unwrap();
        queue.enqueue(second).await.unwrap();

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.queued(), vec![first, second]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_enqueue_waits_for_the_configured_delay() {
        let queue = InMemoryQueue::new(Duration::from_millis(5));
        let started = tokio::time::Instant::now();

        queue.enqueue(TransactionId::new()).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(5));
        assert!(!queue.is_empty());
    }
}
