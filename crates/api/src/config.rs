//! Command line and environment configuration.
//!
//! ```bash
//! coursework serve --port 8080 --workers 3 --queue-capacity 100
//! PORT=9000 WORKER_COUNT=6 coursework serve
//! ```

use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use thiserror::Error;

use coursework_infra::jobs::WorkerPoolConfig;

#[derive(Debug, Parser)]
#[command(name = "coursework")]
#[command(about = "Course and student records service with deferred writes")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the HTTP server and the worker pool
    Serve(ServeConfig),
}

/// Settings for `coursework serve`.
#[derive(Debug, Clone, Args)]
pub struct ServeConfig {
    /// Host/IP to bind
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    pub host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "PORT")]
    pub port: u16,

    /// Number of workers executing deferred writes
    #[arg(long, default_value = "3", env = "WORKER_COUNT")]
    pub workers: usize,

    /// Job queue capacity
    #[arg(long = "queue-capacity", default_value = "100", env = "JOB_QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    /// Result channel capacity
    #[arg(long = "result-capacity", default_value = "100", env = "RESULT_CHANNEL_CAPACITY")]
    pub result_capacity: usize,

    /// How long a request may wait for room in a full job queue (milliseconds)
    #[arg(long = "enqueue-timeout-ms", default_value = "500", env = "ENQUEUE_TIMEOUT_MS")]
    pub enqueue_timeout_ms: u64,

    /// Postgres connection string; in-memory storage when absent
    #[arg(long = "database-url", env = "DATABASE_URL")]
    pub database_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("workers must be >= 1")]
    NoWorkers,
    #[error("{0} capacity must be >= 1")]
    ZeroCapacity(&'static str),
    #[error("enqueue timeout must be > 0")]
    ZeroTimeout,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            workers: 3,
            queue_capacity: 100,
            result_capacity: 100,
            enqueue_timeout_ms: 500,
            database_url: None,
        }
    }
}

impl ServeConfig {
    /// `host:port` for binding.
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("job queue"));
        }
        if self.result_capacity == 0 {
            return Err(ConfigError::ZeroCapacity("result channel"));
        }
        if self.enqueue_timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }

    pub fn pool_config(&self) -> WorkerPoolConfig {
        WorkerPoolConfig::default()
            .with_workers(self.workers)
            .with_queue_capacity(self.queue_capacity)
            .with_result_capacity(self.result_capacity)
            .with_enqueue_timeout(Duration::from_millis(self.enqueue_timeout_ms))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ServeConfig::default();
        assert_eq!(config.address(), "0.0.0.0:8080");
        assert_eq!(config.workers, 3);
        assert_eq!(config.queue_capacity, 100);
        assert!(config.database_url.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_workers() {
        let mut config = ServeConfig::default();
        config.workers = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoWorkers));
    }

    #[test]
    fn validate_rejects_zero_capacities() {
        let mut config = ServeConfig::default();
        config.queue_capacity = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroCapacity("job queue")));

        let mut config = ServeConfig::default();
        config.result_capacity = 0;
        assert_eq!(
            config.validate(),
            Err(ConfigError::ZeroCapacity("result channel"))
        );
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let mut config = ServeConfig::default();
        config.enqueue_timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn cli_parses_serve_flags() {
        let cli = Cli::try_parse_from([
            "coursework",
            "serve",
            "--port",
            "9000",
            "--workers",
            "5",
            "--enqueue-timeout-ms",
            "50",
        ])
        .unwrap();

        let Command::Serve(config) = cli.command;
        assert_eq!(config.port, 9000);
        assert_eq!(config.workers, 5);

        let pool = config.pool_config();
        assert_eq!(pool.workers, 5);
        assert_eq!(pool.enqueue_timeout, Duration::from_millis(50));
    }

    #[test]
    fn cli_requires_a_subcommand() {
        assert!(Cli::try_parse_from(["coursework"]).is_err());
    }
}
