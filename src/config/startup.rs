//! Startup configuration: which ports to bridge and how to render each direction.

use super::error::{ConfigError, ConfigResult};
use crate::format::DisplayMode;
use serde::Serialize;
use std::fmt::Write as _;

/// Path and speed of one serial connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EndpointConfig {
    pub path: String,
    pub baud_rate: u32,
}

/// Everything fixed at process start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartupConfig {
    pub target: EndpointConfig,
    pub passthru: EndpointConfig,
    /// Rendering of passthru -> target traffic.
    pub input_type: DisplayMode,
    /// Rendering of target -> passthru traffic.
    pub output_type: DisplayMode,
}

impl StartupConfig {
    /// Build and validate the startup configuration.
    ///
    /// `passthru_baud_rate` falls back to `target_baud_rate` when absent.
    pub fn new(
        target_path: impl Into<String>,
        target_baud_rate: u32,
        passthru_path: impl Into<String>,
        passthru_baud_rate: Option<u32>,
        input_type: DisplayMode,
        output_type: DisplayMode,
    ) -> ConfigResult<Self> {
        let target = EndpointConfig {
            path: target_path.into(),
            baud_rate: target_baud_rate,
        };
        let passthru = EndpointConfig {
            path: passthru_path.into(),
            baud_rate: passthru_baud_rate.unwrap_or(target_baud_rate),
        };

        for (key, endpoint) in [("target", &target), ("passthru", &passthru)] {
            if endpoint.path.trim().is_empty() {
                return Err(ConfigError::validation(
                    format!("{key} path"),
                    "must not be empty",
                ));
            }
            if endpoint.baud_rate == 0 {
                return Err(ConfigError::validation(
                    format!("{key} baud rate"),
                    "must be a positive integer",
                ));
            }
        }

        Ok(Self {
            target,
            passthru,
            input_type,
            output_type,
        })
    }

    /// Summary printed to stdout before relaying starts.
    pub fn banner(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "target path: {}", self.target.path);
        let _ = writeln!(out, "target baud rate: {}", self.target.baud_rate);
        let _ = writeln!(out, "passthru path: {}", self.passthru.path);
        let _ = writeln!(out, "passthru baud rate: {}", self.passthru.baud_rate);
        let _ = writeln!(out, "input type: {}", self.input_type);
        let _ = writeln!(out, "output type: {}", self.output_type);
        out.push_str(&"-".repeat(20));
        out.push('\n');
        out
    }
}
