//! Settings file schema.
//!
//! Every section is optional; missing keys fall back to the defaults below.
//!
//! ```toml
//! [bridge]
//! read_buffer_size = 1024
//! queue_depth = 256
//! banner = true
//!
//! [serial]
//! data_bits = "eight"
//! parity = "none"
//! stop_bits = "one"
//! flow_control = "none"
//! timeout_ms = 1000
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```

use super::error::{ConfigError, ConfigResult};
use crate::endpoint::{EndpointOptions, DEFAULT_QUEUE_DEPTH, DEFAULT_READ_BUFFER_SIZE};
use crate::port::PortConfiguration;
use serde::{Deserialize, Serialize};

/// Root of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Relay tuning
    pub bridge: BridgeSettings,
    /// Line settings applied to both serial ports
    pub serial: PortConfiguration,
    /// Diagnostic logging
    pub logging: LoggingConfig,
}

impl Settings {
    /// Reject values the bridge cannot run with.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.bridge.read_buffer_size == 0 {
            return Err(ConfigError::validation(
                "bridge.read_buffer_size",
                "must be greater than zero",
            ));
        }
        if self.bridge.queue_depth == 0 {
            return Err(ConfigError::validation(
                "bridge.queue_depth",
                "must be greater than zero",
            ));
        }
        Ok(())
    }
}

/// `[bridge]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeSettings {
    /// Bytes requested per read from a port
    pub read_buffer_size: usize,
    /// Chunks buffered per endpoint before reads pause
    pub queue_depth: usize,
    /// Print the startup summary to stdout
    pub banner: bool,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            queue_depth: DEFAULT_QUEUE_DEPTH,
            banner: true,
        }
    }
}

impl BridgeSettings {
    pub fn endpoint_options(&self) -> EndpointOptions {
        EndpointOptions {
            read_buffer_size: self.read_buffer_size,
            queue_depth: self.queue_depth,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset: "trace", "debug", "info", "warn", "error"
    pub level: String,
    /// Log format: "json", "pretty", "compact"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Diagnostic log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Pretty format with colors
    #[default]
    Pretty,
    /// Compact format
    Compact,
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            "compact" => Ok(Self::Compact),
            other => Err(ConfigError::validation(
                "logging.format",
                format!("unknown format '{other}'"),
            )),
        }
    }
}
