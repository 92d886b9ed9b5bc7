//! Fatal errors that stop the bridge before or while it starts.
//!
//! Per-chunk write failures are not part of this type: they are logged by the
//! relay and never end the process.

use crate::config::ConfigError;
use crate::port::PortError;
use thiserror::Error;

/// Exit status for configuration and command-line errors.
pub const EXIT_CONFIG: u8 = 2;

/// Exit status for connection and runtime failures.
pub const EXIT_FAILURE: u8 = 1;

/// Unified fatal error type.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Invalid startup configuration or settings file.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// One of the serial connections could not be opened.
    #[error("cannot open {endpoint} port: {source}")]
    Open {
        endpoint: &'static str,
        #[source]
        source: PortError,
    },
}

impl BridgeError {
    pub fn open(endpoint: &'static str, source: PortError) -> Self {
        Self::Open { endpoint, source }
    }

    /// Process exit status for this error.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) => EXIT_CONFIG,
            Self::Open { .. } => EXIT_FAILURE,
        }
    }
}
