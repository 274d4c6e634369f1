//! Bounded job queue.
//!
//! Backpressure policy: `enqueue` succeeds at once while capacity remains.
//! When the queue is full the producer waits up to `enqueue_timeout` for a
//! slot and is then rejected with [`EnqueueError::QueueFull`]. It never blocks
//! indefinitely.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc::{self, error::SendTimeoutError, error::TrySendError};
use tokio::sync::Mutex;

use super::types::Job;

/// Enqueue failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EnqueueError {
    #[error("job queue is full (capacity {capacity})")]
    QueueFull { capacity: usize },
    #[error("job queue is closed")]
    Closed,
}

/// Producer side of the job queue. Cheap to clone; one per handler is fine.
#[derive(Debug, Clone)]
pub struct JobQueue {
    tx: mpsc::Sender<Job>,
    enqueue_timeout: Duration,
}

/// Consumer side, shared by every worker.
///
/// Workers take turns holding the lock while waiting, so jobs leave in arrival
/// order no matter how many workers are idle.
#[derive(Debug, Clone)]
pub struct JobReceiver {
    rx: Arc<Mutex<mpsc::Receiver<Job>>>,
}

/// Create a bounded queue.
///
/// `capacity` must be at least 1.
pub fn job_queue(capacity: usize, enqueue_timeout: Duration) -> (JobQueue, JobReceiver) {
    let (tx, rx) = mpsc::channel(capacity);
    (
        JobQueue { tx, enqueue_timeout },
        JobReceiver {
            rx: Arc::new(Mutex::new(rx)),
        },
    )
}

impl JobQueue {
    pub async fn enqueue(&self, job: Job) -> Result<(), EnqueueError> {
        let job = match self.tx.try_send(job) {
            Ok(()) => return Ok(()),
            Err(TrySendError::Closed(_)) => return Err(EnqueueError::Closed),
            Err(TrySendError::Full(job)) => job,
        };

        match self.tx.send_timeout(job, self.enqueue_timeout).await {
            Ok(()) => Ok(()),
            Err(SendTimeoutError::Timeout(_)) => Err(EnqueueError::QueueFull {
                capacity: self.capacity(),
            }),
            Err(SendTimeoutError::Closed(_)) => Err(EnqueueError::Closed),
        }
    }

    /// Jobs currently waiting (approximate under concurrent use).
    pub fn depth(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    pub fn enqueue_timeout(&self) -> Duration {
        self.enqueue_timeout
    }

    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl JobReceiver {
    /// Wait for the next job. `None` once the queue is closed and drained.
    pub async fn recv(&self) -> Option<Job> {
        self.rx.lock().await.recv().await
    }

    /// Close the queue and discard whatever is still buffered.
    ///
    /// Returns how many jobs were dropped without being executed.
    pub async fn close_and_drain(&self) -> usize {
        let mut rx = self.rx.lock().await;
        rx.close();
        let mut dropped = 0;
        while rx.try_recv().is_ok() {
            dropped += 1;
        }
        dropped
    }
}
