//! Infrastructure layer: record store adapters and the deferred-write job system.

pub mod jobs;
pub mod records;
