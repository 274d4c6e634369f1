//! Deferred-write job system: bounded queue, fixed worker pool, result collector.
//!
//! ## Design
//!
//! - Jobs are a closed enum over the deferred mutations (course creation,
//!   student enrollment)
//! - A bounded FIFO queue feeds a fixed number of workers; producers wait up to
//!   a timeout when it is full and are then rejected
//! - Each executed job yields exactly one `JobResult` on the result channel
//! - A single collector drains results into logs and counters
//!
//! ## Limitations
//!
//! - No retry and no dead-letter queue: a failed job is reported once and
//!   dropped
//! - Nothing is persisted; jobs still queued at shutdown are abandoned
//! - No per-job timeout: a store call that never returns stalls its worker
//!
//! ## Components
//!
//! - `Job`, `JobResult`: what flows through the two channels
//! - `JobQueue`: producer side of the job channel with the backpressure policy
//! - `spawn_workers` / `execute_job`: the worker loop and per-kind execution
//! - `ResultCollector`: the single consumer of results
//! - `WorkerPool`: wires all of the above and owns shutdown

pub mod collector;
pub mod pool;
pub mod queue;
pub mod types;
pub mod worker;

pub use collector::{JobStats, JobStatsSnapshot, KindStats, ResultCollector};
pub use pool::{ShutdownReport, WorkerPool, WorkerPoolConfig, WorkerPoolHandle};
pub use queue::{job_queue, EnqueueError, JobQueue, JobReceiver};
pub use types::{Job, JobError, JobKind, JobResult, JobStatus};
pub use worker::{execute_job, spawn_workers};
