//! Diagnostic logging setup.
//!
//! Diagnostics always go to stderr; stdout is reserved for the traffic log.

use crate::config::{LogFormat, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter directive: `RUST_LOG` when set, otherwise the configured level.
pub fn filter_directive(config: &LoggingConfig) -> String {
    std::env::var("RUST_LOG").unwrap_or_else(|_| config.level.clone())
}

/// Install the global tracing subscriber. Later calls are ignored.
pub fn init_tracing(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_new(filter_directive(config))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(env_filter);

    let layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    let _ = match config.format {
        LogFormat::Json => registry.with(layer.json()).try_init(),
        LogFormat::Pretty => registry.with(layer.pretty()).try_init(),
        LogFormat::Compact => registry.with(layer.compact()).try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[serial_test::serial]
    fn test_filter_prefers_rust_log() {
        let config = LoggingConfig {
            level: "warn".to_string(),
            ..Default::default()
        };

        std::env::remove_var("RUST_LOG");
        assert_eq!(filter_directive(&config), "warn");

        std::env::set_var("RUST_LOG", "serial_tap=trace");
        assert_eq!(filter_directive(&config), "serial_tap=trace");
        std::env::remove_var("RUST_LOG");
    }

    #[test]
    fn test_init_twice_is_harmless() {
        let config = LoggingConfig::default();
        init_tracing(&config);
        init_tracing(&config);
    }
}
