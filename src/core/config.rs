//! Configuration parsing and validation.
//!
//! smartqueue configuration is loaded from TOML files with CLI overrides.
//! Every section has serde defaults, so an empty file (or no file at all)
//! yields a usable configuration.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

/// Top-level smartqueue configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Queue behavior (capacity, expiry worker cadence).
    #[serde(default)]
    pub queue: QueueConfig,

    /// Inspection HTTP server.
    #[serde(default)]
    pub inspection: InspectionConfig,

    /// Logging configuration.
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Queue behavior configuration, applied uniformly to every tenant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Per-tenant entry capacity. Enqueueing a new key into a full tenant
    /// evicts the oldest entry.
    #[serde(default = "default_capacity")]
    pub capacity: usize,

    /// Idle poll interval for per-tenant expiry workers, in milliseconds.
    /// Bounds the wakeup latency for entries enqueued into an empty tenant.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl QueueConfig {
    /// The worker idle poll interval as a [`Duration`].
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    /// Validate queue settings.
    pub fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            anyhow::bail!("queue.capacity must be > 0");
        }
        if self.poll_interval_ms == 0 {
            anyhow::bail!("queue.poll_interval_ms must be > 0");
        }
        Ok(())
    }
}

/// Inspection HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InspectionConfig {
    /// Whether to serve the inspection endpoints.
    #[serde(default)]
    pub enabled: bool,

    /// Bind address (e.g., "127.0.0.1:8098").
    #[serde(default = "default_inspection_bind")]
    pub bind: String,
}

impl Default for InspectionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            bind: default_inspection_bind(),
        }
    }
}

impl InspectionConfig {
    /// Parse the configured bind address.
    pub fn bind_addr(&self) -> Result<SocketAddr> {
        self.bind
            .parse()
            .with_context(|| format!("invalid inspection bind address: {}", self.bind))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Log level: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

// Default value functions

fn default_capacity() -> usize {
    1000
}

fn default_poll_interval_ms() -> u64 {
    500
}

fn default_inspection_bind() -> String {
    "127.0.0.1:8098".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("failed to parse config")?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file if it exists, falling back to defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply CLI overrides to the configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(capacity) = overrides.capacity {
            self.queue.capacity = capacity;
        }
        if let Some(ref bind) = overrides.bind {
            self.inspection.bind = bind.clone();
            self.inspection.enabled = true;
        }
        if let Some(ref log_level) = overrides.log_level {
            self.telemetry.log_level = log_level.clone();
        }
    }

    /// Validate configuration consistency.
    pub fn validate(&self) -> Result<()> {
        self.queue.validate()?;
        self.inspection.bind_addr()?;
        self.validate_telemetry()?;
        Ok(())
    }

    fn validate_telemetry(&self) -> Result<()> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.telemetry.log_level.as_str()) {
            anyhow::bail!(
                "telemetry.log_level must be one of {:?}, got: {}",
                valid_levels,
                self.telemetry.log_level
            );
        }
        Ok(())
    }
}

/// CLI override options that can be applied to configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override per-tenant capacity.
    pub capacity: Option<usize>,
    /// Override the inspection bind address (implies enabling inspection).
    pub bind: Option<String>,
    /// Override log level.
    pub log_level: Option<String>,
}
