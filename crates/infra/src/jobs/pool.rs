//! Worker pool wiring and lifecycle.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::records::RecordStore;

use super::collector::{JobStats, JobStatsSnapshot, ResultCollector};
use super::queue::{job_queue, JobQueue, JobReceiver};
use super::worker::spawn_workers;

/// Worker pool configuration.
#[derive(Debug, Clone)]
pub struct WorkerPoolConfig {
    /// Number of concurrent workers
    pub workers: usize,
    /// Job queue capacity
    pub queue_capacity: usize,
    /// Result channel capacity
    pub result_capacity: usize,
    /// How long a producer may wait on a full queue before being rejected
    pub enqueue_timeout: Duration,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            workers: 3,
            queue_capacity: 100,
            result_capacity: 100,
            enqueue_timeout: Duration::from_millis(500),
        }
    }
}

impl WorkerPoolConfig {
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_result_capacity(mut self, capacity: usize) -> Self {
        self.result_capacity = capacity;
        self
    }

    pub fn with_enqueue_timeout(mut self, timeout: Duration) -> Self {
        self.enqueue_timeout = timeout;
        self
    }
}

/// What happened during shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShutdownReport {
    /// Jobs still queued when the workers stopped; they produced no result.
    pub abandoned_jobs: usize,
}

/// Fixed-size pool of workers plus the result collector.
#[derive(Debug)]
pub struct WorkerPool;

impl WorkerPool {
    /// Start the workers and the collector.
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(config: WorkerPoolConfig, store: Arc<dyn RecordStore>) -> WorkerPoolHandle {
        let workers = config.workers.max(1);
        let (queue, jobs) = job_queue(config.queue_capacity.max(1), config.enqueue_timeout);
        let (results_tx, results_rx) = mpsc::channel(config.result_capacity.max(1));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let stats = Arc::new(JobStats::new());
        let collector = ResultCollector::new(stats.clone()).spawn(results_rx);

        // The workers own the only result senders; the collector ends with them.
        let worker_handles = spawn_workers(workers, jobs.clone(), results_tx, store, shutdown_rx);

        info!(
            workers,
            queue_capacity = queue.capacity(),
            enqueue_timeout_ms = config.enqueue_timeout.as_millis() as u64,
            "worker pool started"
        );

        WorkerPoolHandle {
            queue,
            jobs,
            shutdown: shutdown_tx,
            workers: worker_handles,
            collector,
            stats,
        }
    }
}

/// Handle to a running pool.
#[derive(Debug)]
pub struct WorkerPoolHandle {
    queue: JobQueue,
    jobs: JobReceiver,
    shutdown: watch::Sender<bool>,
    workers: Vec<JoinHandle<()>>,
    collector: JoinHandle<()>,
    stats: Arc<JobStats>,
}

impl WorkerPoolHandle {
    /// Producer handle for request handlers.
    pub fn queue(&self) -> JobQueue {
        self.queue.clone()
    }

    pub fn stats(&self) -> JobStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn stats_handle(&self) -> Arc<JobStats> {
        self.stats.clone()
    }

    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stop the pool.
    ///
    /// Workers finish the job they are executing and do not dequeue another.
    /// Anything still queued is discarded, then the collector drains the
    /// remaining results and exits.
    pub async fn shutdown(self) -> ShutdownReport {
        let _ = self.shutdown.send(true);

        for handle in self.workers {
            if let Err(e) = handle.await {
                warn!(error = %e, "worker task ended abnormally");
            }
        }

        let abandoned_jobs = self.jobs.close_and_drain().await;
        if abandoned_jobs > 0 {
            warn!(abandoned_jobs, "queued jobs dropped at shutdown");
        }

        if let Err(e) = self.collector.await {
            warn!(error = %e, "result collector ended abnormally");
        }

        info!("worker pool stopped");
        ShutdownReport { abandoned_jobs }
    }
}
