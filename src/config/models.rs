use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Client configuration
///
/// `worker_count` controls the maximum number of parallel transfers. The two
/// timeouts are applied uniformly to every transfer; there is no per-request
/// override.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_worker_count")]
    pub worker_count: usize,

    /// Bounds connection establishment, in milliseconds.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Bounds total transfer duration, in milliseconds.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Optional proxy URL applied to every transfer.
    #[serde(default)]
    pub proxy: Option<String>,
}

impl Config {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_count: default_worker_count(),
            connect_timeout_ms: default_connect_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            user_agent: default_user_agent(),
            proxy: None,
        }
    }
}

fn default_worker_count() -> usize {
    4
}

fn default_connect_timeout_ms() -> u64 {
    10_000
}

fn default_request_timeout_ms() -> u64 {
    60_000
}

fn default_user_agent() -> String {
    "fetchpool/0.1.0".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.worker_count, 4);
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.user_agent, "fetchpool/0.1.0");
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_partial_toml_falls_back_to_defaults() {
        let config: Config = toml::from_str(
            r#"
worker_count = 2
request_timeout_ms = 5000
        "#,
        )
        .unwrap();

        assert_eq!(config.worker_count, 2);
        assert_eq!(config.request_timeout_ms, 5000);
        assert_eq!(config.connect_timeout_ms, 10_000);
        assert_eq!(config.user_agent, "fetchpool/0.1.0");
    }
}
