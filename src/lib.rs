//! serial_tap library
//!
//! A transparent bridge between two serial connections ("target" and
//! "passthru"). Every chunk read on one side is written verbatim to the other,
//! and a timestamped, directional copy is printed to stdout.
//!
//! # Modules
//!
//! - `format`: pure chunk formatter (text lines or hex dump)
//! - `endpoint`: one live connection split into writer and arrival queue
//! - `relay`: the two direction loops wiring endpoints together
//! - `sink`: atomic block output for the traffic log
//! - `port`: opening serial ports
//! - `config`: startup configuration and settings file
//! - `logging`: diagnostic tracing setup
//! - `error`: fatal error taxonomy

pub mod config;
pub mod endpoint;
pub mod error;
pub mod format;
pub mod logging;
pub mod port;
pub mod relay;
pub mod sink;

// Re-export commonly used types for convenience
pub use config::{ConfigError, ConfigResult, Settings, SettingsLoader, StartupConfig};
pub use endpoint::{Arrivals, Endpoint, EndpointError, EndpointOptions, EndpointWriter};
pub use error::BridgeError;
pub use format::{format_chunk, render_block, Direction, DisplayMode};
pub use port::{open_serial, PortConfiguration, PortError};
pub use relay::{Bridge, BridgeHandle, BridgeReport, StatsSnapshot};
pub use sink::{LogSink, WriterSink};
