//! Tracing and logging setup shared by the binaries.

pub mod tracing;

pub use tracing::LogFormat;

/// Install the global subscriber, format taken from `LOG_FORMAT`.
///
/// Later calls are no-ops.
pub fn init() {
    tracing::init(LogFormat::from_env());
}
