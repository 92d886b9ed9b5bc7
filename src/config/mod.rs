//! Configuration module for serial_tap.
//!
//! Two layers of configuration exist:
//!
//! - [`StartupConfig`]: the ports to bridge and the display mode of each
//!   direction. Supplied on the command line; required.
//! - [`Settings`]: optional TOML settings (read sizes, line settings, logging),
//!   with environment variable overrides.
//!
//! # Settings Resolution
//!
//! 1. `--config <FILE>` on the command line
//! 2. `SERIAL_TAP_CONFIG` environment variable
//! 3. `./serial-tap.toml` (current directory)
//! 4. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! - `SERIAL_TAP_LOG_LEVEL=debug`
//! - `SERIAL_TAP_LOG_FORMAT=json`
//! - `SERIAL_TAP_READ_BUFFER_SIZE=4096`
//! - `SERIAL_TAP_QUEUE_DEPTH=64`

mod error;
mod loader;
mod schema;
mod startup;

pub use error::{ConfigError, ConfigResult};
pub use loader::{apply_overrides, resolve_config_path, SettingsLoader};
pub use schema::{BridgeSettings, LogFormat, LoggingConfig, Settings};
pub use startup::{EndpointConfig, StartupConfig};
