//! Configuration for GRAIL sessions.
//!
//! Defaults carry the platform's wire-layer constants; deployments can
//! override them from a YAML file and `GRAIL_*` environment variables.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid YAML for this configuration
    #[error("failed to parse config file: {0}")]
    Parse(#[from] serde_yaml::Error),
}

/// Session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// How long `message_available` polls the stream before reporting that
    /// no message is ready, in milliseconds
    pub poll_interval_ms: u64,
    /// Sleep between retries when a read would block, in milliseconds
    pub retry_sleep_ms: u64,
    /// Receive buffer growth step in bytes
    pub recv_buffer_bytes: usize,
    /// Largest frame the receiver will accept, in bytes
    pub max_frame_bytes: usize,
    /// How long a send may block before failing as temporarily
    /// unavailable, in milliseconds
    pub send_timeout_ms: u64,
    /// Interval between keep-alive messages on an otherwise idle
    /// connection, in milliseconds
    pub keepalive_interval_ms: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 10,
            retry_sleep_ms: 1,
            recv_buffer_bytes: 10_000,
            max_frame_bytes: 16 * 1024 * 1024,
            send_timeout_ms: 5_000,
            keepalive_interval_ms: 10_000,
        }
    }
}

impl SessionConfig {
    /// Load configuration from a YAML file, then apply environment
    /// overrides.
    pub fn load_from_file<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(&config_path)?;
        let mut config: SessionConfig = serde_yaml::from_str(&content)?;
        info!("Loaded session configuration from {:?}", config_path.as_ref());
        config.apply_environment_overrides();
        Ok(config)
    }

    /// Default configuration with environment overrides applied.
    #[must_use]
    pub fn from_environment() -> Self {
        let mut config = Self::default();
        config.apply_environment_overrides();
        config
    }

    /// Apply `GRAIL_*` environment variable overrides.
    fn apply_environment_overrides(&mut self) {
        override_u64("GRAIL_POLL_INTERVAL_MS", &mut self.poll_interval_ms);
        override_u64("GRAIL_RETRY_SLEEP_MS", &mut self.retry_sleep_ms);
        override_usize("GRAIL_RECV_BUFFER_BYTES", &mut self.recv_buffer_bytes);
        override_usize("GRAIL_MAX_FRAME_BYTES", &mut self.max_frame_bytes);
        override_u64("GRAIL_SEND_TIMEOUT_MS", &mut self.send_timeout_ms);
        override_u64("GRAIL_KEEPALIVE_INTERVAL_MS", &mut self.keepalive_interval_ms);
    }

    /// The `message_available` poll window.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// The would-block retry sleep.
    #[must_use]
    pub fn retry_sleep(&self) -> Duration {
        Duration::from_millis(self.retry_sleep_ms)
    }

    /// The send timeout.
    #[must_use]
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    /// The keep-alive interval.
    #[must_use]
    pub fn keepalive_interval(&self) -> Duration {
        Duration::from_millis(self.keepalive_interval_ms)
    }
}

fn override_u64(name: &str, slot: &mut u64) {
    if let Ok(raw) = std::env::var(name) {
        match raw.parse() {
            Ok(value) => {
                *slot = value;
                info!("{} overridden by environment: {}", name, value);
            }
            Err(_) => warn!("Ignoring unparseable {}: {:?}", name, raw),
        }
    }
}

fn override_usize(name: &str, slot: &mut usize) {
    if let Ok(raw) = std::env::var(name) {
        match raw.parse() {
            Ok(value) => {
                *slot = value;
                info!("{} overridden by environment: {}", name, value);
            }
            Err(_) => warn!("Ignoring unparseable {}: {:?}", name, raw),
        }
    }
}
