use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide settings, built once at startup and handed to the
/// upstream clients and the router.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    pub static_dir: PathBuf,
    pub edsm_base_url: Url,
    pub inara_base_url: Url,
    pub user_agent: String,
    /// Total tries per upstream call, including the first.
    pub fetch_max_attempts: u32,
    pub fetch_timeout_ms: u64,
    /// Wait before attempt `n` is `fetch_backoff_step_ms * (n - 1)`.
    pub fetch_backoff_step_ms: u64,
}

impl AppConfig {
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    #[must_use]
    pub fn fetch_backoff_step(&self) -> Duration {
        Duration::from_millis(self.fetch_backoff_step_ms)
    }
}
