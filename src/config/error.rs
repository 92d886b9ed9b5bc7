//! Errors raised while building the bridge configuration.
//!
//! Every variant is fatal and is reported before either serial port is
//! opened.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A settings file was requested explicitly but does not exist.
    #[error("settings file not found: {0}")]
    NotFound(PathBuf),

    #[error("cannot read settings file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings file: {0}")]
    ParseError(#[from] toml::de::Error),

    /// A startup value or setting is out of range (display mode, baud rate, path, ...).
    #[error("invalid {key}: {message}")]
    ValidationError { key: String, message: String },

    /// A `SERIAL_TAP_*` override could not be parsed.
    #[error("invalid value in ${var}: {message}")]
    EnvParseError { var: String, message: String },
}

impl ConfigError {
    pub fn validation(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn env_parse(var: impl Into<String>, message: impl Into<String>) -> Self {
        Self::EnvParseError {
            var: var.into(),
            message: message.into(),
        }
    }
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_message_names_the_key() {
        let err = ConfigError::validation("target baud rate", "must be greater than zero");
        assert_eq!(
            err.to_string(),
            "invalid target baud rate: must be greater than zero"
        );
    }

    #[test]
    fn test_env_message_names_the_variable() {
        let err = ConfigError::env_parse("SERIAL_TAP_QUEUE_DEPTH", "not a number");
        assert!(err.to_string().contains("$SERIAL_TAP_QUEUE_DEPTH"));
    }
}
