use std::time::Duration;

const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;
const DEFAULT_STALL_TIMEOUT_SECS: u64 = 300;

/// Lease refreshes per stall timeout. A running job's heartbeat lands this
/// many times inside the window before it can be considered stalled.
const HEARTBEATS_PER_STALL_TIMEOUT: u32 = 4;

/// Finished jobs of each terminal status kept on the durable queue.
pub const DEFAULT_RETAIN_FINISHED: i64 = 100;

/// Queue backend configuration.
#[derive(Debug, Clone)]
pub struct QueueConfig {
    /// Durable queue database. `None` selects the in-memory fallback.
    pub database_url: Option<String>,
    /// How often the durable consumer looks for waiting jobs. Non-zero.
    pub poll_interval: Duration,
    /// Completed (and, separately, failed) jobs retained after pruning.
    pub retain_finished: i64,
    /// How long an `active` job may go without a heartbeat before any
    /// consumer returns it to `waiting`. Non-zero.
    pub stall_timeout: Duration,
}

impl QueueConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default          |
    /// |----------------------------|------------------|
    /// | `QUEUE_DATABASE_URL`       | unset (memory)   |
    /// | `QUEUE_POLL_INTERVAL_MS`   | `1000`           |
    /// | `QUEUE_RETAIN_FINISHED`    | `100`            |
    /// | `QUEUE_STALL_TIMEOUT_SECS` | `300`            |
    ///
    /// Panics on unparseable or out-of-range values.
    pub fn from_env() -> Self {
        let database_url = std::env::var("QUEUE_DATABASE_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        let poll_interval_ms: u64 = std::env::var("QUEUE_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL_MS.to_string())
            .parse()
            .expect("QUEUE_POLL_INTERVAL_MS must be a valid u64");

        let retain_finished: i64 = std::env::var("QUEUE_RETAIN_FINISHED")
            .unwrap_or_else(|_| DEFAULT_RETAIN_FINISHED.to_string())
            .parse()
            .expect("QUEUE_RETAIN_FINISHED must be a valid i64");

        let stall_timeout_secs: u64 = std::env::var("QUEUE_STALL_TIMEOUT_SECS")
            .unwrap_or_else(|_| DEFAULT_STALL_TIMEOUT_SECS.to_string())
            .parse()
            .expect("QUEUE_STALL_TIMEOUT_SECS must be a valid u64");

        let config = Self {
            database_url,
            poll_interval: Duration::from_millis(poll_interval_ms),
            retain_finished,
            stall_timeout: Duration::from_secs(stall_timeout_secs),
        };
        config.assert_valid();
        config
    }

    /// Panic if a value would break the durable consumer at runtime.
    pub fn assert_valid(&self) {
        assert!(
            !self.poll_interval.is_zero(),
            "QUEUE_POLL_INTERVAL_MS must be greater than 0"
        );
        assert!(
            self.retain_finished >= 0,
            "QUEUE_RETAIN_FINISHED must not be negative"
        );
        assert!(
            !self.stall_timeout.is_zero(),
            "QUEUE_STALL_TIMEOUT_SECS must be greater than 0"
        );
    }

    /// How often a consumer refreshes the lease on the job it is running.
    pub fn heartbeat_interval(&self) -> Duration {
        self.stall_timeout / HEARTBEATS_PER_STALL_TIMEOUT
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
            retain_finished: DEFAULT_RETAIN_FINISHED,
            stall_timeout: Duration::from_secs(DEFAULT_STALL_TIMEOUT_SECS),
        }
    }
}
