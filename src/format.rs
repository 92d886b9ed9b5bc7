//! Chunk formatting for the traffic log.
//!
//! Turns a raw chunk of bytes into zero or more printable log lines of the form
//! `[<timestamp>] <marker> <payload>`. Formatting is a pure function of its
//! inputs: the timestamp is passed in by the caller, so identical arguments
//! always produce identical output.
//!
//! Two display modes are supported:
//!
//! - [`DisplayMode::Text`]: the chunk is decoded as UTF-8 (lossily), one trailing
//!   line terminator is dropped and the rest is split into lines. A chunk whose
//!   lines are all blank produces no output at all.
//! - [`DisplayMode::Binary`]: the chunk is rendered as space-separated lowercase
//!   hex, always on exactly one line (even for an empty chunk).

use crate::config::ConfigError;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of travel through the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Passthru -> target.
    In,
    /// Target -> passthru.
    Out,
}

impl Direction {
    /// Marker printed between the timestamp and the payload.
    pub fn marker(self) -> &'static str {
        match self {
            Self::In => "<--",
            Self::Out => "-->",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::In => write!(f, "in"),
            Self::Out => write!(f, "out"),
        }
    }
}

/// How a direction's traffic is rendered in the log. Never affects relaying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    Text,
    Binary,
}

impl DisplayMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Binary => "binary",
        }
    }
}

impl fmt::Display for DisplayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DisplayMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "binary" => Ok(Self::Binary),
            other => Err(ConfigError::validation(
                "display mode",
                format!("invalid type: {other} (expected 'text' or 'binary')"),
            )),
        }
    }
}

/// Render a timestamp as ISO-8601 UTC with millisecond precision,
/// e.g. `2024-05-01T12:00:00.123Z`.
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Format one chunk into log lines (without trailing newlines).
///
/// Returns an empty vector when a text chunk contains nothing but blank lines.
/// Binary mode always yields exactly one line.
pub fn format_chunk(
    chunk: &[u8],
    direction: Direction,
    mode: DisplayMode,
    timestamp: DateTime<Utc>,
) -> Vec<String> {
    let prefix = format!("[{}] {}", format_timestamp(timestamp), direction.marker());

    match mode {
        DisplayMode::Text => {
            let decoded = String::from_utf8_lossy(chunk);
            let lines = split_lines(&decoded);
            // All-or-nothing: embedded blank lines survive unless every line is blank.
            if lines.iter().all(|line| line.trim().is_empty()) {
                return Vec::new();
            }
            lines
                .into_iter()
                .map(|line| format!("{prefix} {line}"))
                .collect()
        }
        DisplayMode::Binary => vec![format!("{prefix} {}", hex_dump(chunk))],
    }
}

/// Join formatted lines into a single newline-terminated block.
///
/// An empty slice renders as an empty string.
pub fn render_block(lines: &[String]) -> String {
    if lines.is_empty() {
        return String::new();
    }
    let mut block = lines.join("\n");
    block.push('\n');
    block
}

/// Strip one trailing `\n` or `\r\n`, then split on `\n` / `\r\n`.
///
/// A `\r` is only part of a terminator when a `\n` follows it, so a bare
/// `\r` ending the chunk stays on the last line.
fn split_lines(text: &str) -> Vec<&str> {
    let body = text
        .strip_suffix("\r\n")
        .or_else(|| text.strip_suffix('\n'))
        .unwrap_or(text);

    let mut lines: Vec<&str> = body.split('\n').collect();
    let last = lines.len() - 1;
    for line in &mut lines[..last] {
        let piece = *line;
        *line = piece.strip_suffix('\r').unwrap_or(piece);
    }
    lines
}

fn hex_dump(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len().saturating_mul(3));
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{byte:02x}"));
    }
    out
}
