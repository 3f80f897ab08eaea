//! Server configuration, loadable from TOML with environment overrides.

use std::time::Duration;

use serde::Deserialize;

use pv_trace_tools::TailConfig;

/// Top-level configuration for the broadcast server.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Listen address (e.g., "0.0.0.0").
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Trace file written by the tracer.
    #[serde(default = "default_log_path")]
    pub log_path: String,
    /// Replay lines already in the trace file at startup.
    #[serde(default)]
    pub from_beginning: bool,
    /// How often the trace file is checked for new lines.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Process batch flush interval.
    #[serde(default = "default_batch_flush_secs")]
    pub batch_flush_secs: u64,
    /// Stats broadcast interval.
    #[serde(default = "default_stats_interval_secs")]
    pub stats_interval_secs: u64,
    /// Outbound messages buffered per subscriber before new ones are dropped.
    #[serde(default = "default_subscriber_queue")]
    pub subscriber_queue: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_path() -> String {
    "opfile.txt".to_string()
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_batch_flush_secs() -> u64 {
    5
}

fn default_stats_interval_secs() -> u64 {
    2
}

fn default_subscriber_queue() -> usize {
    256
}

impl ServerConfig {
    /// Load config from a TOML file path.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Apply `PV_HOST`, `PV_PORT` and `PV_LOG_PATH` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(host) = lookup("PV_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PV_PORT") {
            match port.parse() {
                Ok(port) => self.port = port,
                Err(_) => tracing::warn!(value = %port, "ignoring invalid PV_PORT"),
            }
        }
        if let Some(path) = lookup("PV_LOG_PATH") {
            self.log_path = path;
        }
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Zero intervals are clamped to one unit.
    pub fn tail_config(&self) -> TailConfig {
        TailConfig {
            path: self.log_path.clone().into(),
            from_beginning: self.from_beginning,
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
        }
    }

    pub fn batch_flush_interval(&self) -> Duration {
        Duration::from_secs(self.batch_flush_secs.max(1))
    }

    pub fn stats_interval(&self) -> Duration {
        Duration::from_secs(self.stats_interval_secs.max(1))
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_path: default_log_path(),
            from_beginning: false,
            poll_interval_ms: default_poll_interval_ms(),
            batch_flush_secs: default_batch_flush_secs(),
            stats_interval_secs: default_stats_interval_secs(),
            subscriber_queue: default_subscriber_queue(),
        }
    }
}
