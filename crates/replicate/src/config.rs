use std::time::Duration;

/// Default base URL of the Replicate HTTP API.
pub const DEFAULT_API_BASE: &str = "https://api.replicate.com/v1";

/// Default delay between prediction status polls.
const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// Replicate client configuration.
#[derive(Debug, Clone)]
pub struct ReplicateConfig {
    /// Base URL, without trailing slash.
    pub api_base: String,
    /// Credential used when a request arrives without its own token.
    pub api_token: Option<String>,
    /// Delay between polls of a running prediction.
    pub poll_interval: Duration,
}

impl ReplicateConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                         |
    /// |------------------------------|---------------------------------|
    /// | `REPLICATE_API_BASE`         | `https://api.replicate.com/v1`  |
    /// | `REPLICATE_API_TOKEN`        | unset                           |
    /// | `REPLICATE_POLL_INTERVAL_MS` | `1000`                          |
    pub fn from_env() -> Self {
        let api_base = std::env::var("REPLICATE_API_BASE")
            .unwrap_or_else(|_| DEFAULT_API_BASE.into())
            .trim_end_matches('/')
            .to_string();

        let api_token = std::env::var("REPLICATE_API_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let poll_interval_ms: u64 = std::env::var("REPLICATE_POLL_INTERVAL_MS")
            .unwrap_or_else(|_| DEFAULT_POLL_INTERVAL_MS.to_string())
            .parse()
            .expect("REPLICATE_POLL_INTERVAL_MS must be a valid u64");

        Self {
            api_base,
            api_token,
            poll_interval: Duration::from_millis(poll_interval_ms),
        }
    }
}

impl Default for ReplicateConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            api_token: None,
            poll_interval: Duration::from_millis(DEFAULT_POLL_INTERVAL_MS),
        }
    }
}
