//! Fixed-size pool for background units of work
//!
//! Work is spawned onto the tokio runtime immediately, but at most `size`
//! units run their body at the same time; the rest wait on a semaphore permit.
//! No ordering is guaranteed between units.
//!
//! # Draining
//!
//! Every unit is registered with a `TaskTracker`, so [`WorkerPool::drain`] can
//! wait until everything scheduled so far has finished. [`WorkerPool::shutdown`]
//! does the same and then refuses new work.
//!
//! ```text
//! spawn ──► TaskTracker ──► acquire permit ──► run ──► release
//!                 ▲
//!        drain / shutdown wait here
//! ```

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::Semaphore;
use tokio_util::task::TaskTracker;

use crate::types::PipelineError;

#[derive(Debug)]
pub struct WorkerPool {
    size: usize,
    permits: Arc<Semaphore>,
    tracker: TaskTracker,
    /// Guards the tracker's open/closed transitions as well as the flag
    closed: Mutex<bool>,
}

impl WorkerPool {
    /// Create a pool running at most `size` units concurrently
    ///
    /// A size of zero is bumped to one.
    pub fn new(size: usize) -> Self {
        let size = size.max(1);
        Self {
            size,
            permits: Arc::new(Semaphore::new(size)),
            tracker: TaskTracker::new(),
            closed: Mutex::new(false),
        }
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Units spawned and not yet finished
    pub fn in_flight(&self) -> usize {
        self.tracker.len()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock()
    }

    /// Schedule a unit of work (fire-and-forget)
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    ///
    /// `ShuttingDown` once [`WorkerPool::shutdown`] has been called.
    pub fn spawn<F>(&self, work: F) -> Result<(), PipelineError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        if self.is_closed() {
            return Err(PipelineError::ShuttingDown);
        }

        let permits = Arc::clone(&self.permits);
        self.tracker.spawn(async move {
            // The semaphore is never closed, so acquire only fails if that changes.
            let Ok(_permit) = permits.acquire_owned().await else {
                tracing::error!("worker pool semaphore closed, dropping unit of work");
                return;
            };
            work.await;
        });
        Ok(())
    }

    /// Wait for every unit scheduled so far, then keep accepting work
    ///
    /// Units spawned while draining are waited for as well. A shutdown that
    /// lands while draining is never undone.
    pub async fn drain(&self) {
        self.tracker.close();
        self.tracker.wait().await;
        let closed = self.closed.lock();
        if !*closed {
            self.tracker.reopen();
        }
    }

    /// Stop accepting work and wait for everything already scheduled
    pub async fn shutdown(&self) {
        {
            let mut closed = self.closed.lock();
            *closed = true;
            self.tracker.close();
        }
        self.tracker.wait().await;
        tracing::info!("worker pool drained and closed");
    }
}
