//! Port-specific error types.
//!
//! Errors raised while opening a serial connection. Once a port is open,
//! failures are reported through [`crate::endpoint::EndpointError`] instead.

use thiserror::Error;

/// Errors that can occur while opening a serial port.
#[derive(Debug, Error)]
pub enum PortError {
    /// The specified serial port was not found on the system.
    #[error("Serial port not found: {0}")]
    NotFound(String),

    /// The port exists but could not be opened (busy, permissions, ...).
    #[error("Failed to open serial port {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Port configuration was rejected by the driver.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    /// Create a NotFound error from a port name.
    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    /// Create a Config error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an Open error for a path.
    pub fn open(path: impl Into<String>, source: std::io::Error) -> Self {
        Self::Open {
            path: path.into(),
            source,
        }
    }
}
