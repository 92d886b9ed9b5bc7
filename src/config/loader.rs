//! Settings loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::Settings;
use std::path::{Path, PathBuf};

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "SERIAL_TAP";

/// Settings file looked up in the working directory
const CONFIG_FILE_NAME: &str = "serial-tap.toml";

/// Environment variable for an explicit settings path
const CONFIG_PATH_ENV: &str = "SERIAL_TAP_CONFIG";

/// Settings loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct SettingsLoader {
    /// Resolved settings file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded settings
    pub settings: Settings,
}

impl SettingsLoader {
    /// Load settings using the standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `explicit` path (from `--config`), which must exist
    /// 2. `SERIAL_TAP_CONFIG` environment variable, which must exist
    /// 3. `./serial-tap.toml`
    /// 4. Built-in defaults
    ///
    /// Environment variables override file values, and the result is validated.
    pub fn load(explicit: Option<&Path>) -> ConfigResult<Self> {
        let env_path = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let config_path = resolve_config_path(explicit, env_path.as_deref())?;

        let mut settings = match config_path {
            Some(ref path) => load_from_file(path)?,
            None => Settings::default(),
        };
        apply_overrides(&mut settings, |var| std::env::var(var).ok())?;
        settings.validate()?;

        Ok(Self {
            config_path,
            settings,
        })
    }

    /// Load settings from a specific file path, without environment overrides.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let settings = load_from_file(&path)?;
        settings.validate()?;

        Ok(Self {
            config_path: Some(path),
            settings,
        })
    }

    /// Loader holding the built-in defaults.
    pub fn with_defaults() -> Self {
        Self {
            config_path: None,
            settings: Settings::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn into_settings(self) -> Settings {
        self.settings
    }
}

/// Pick the settings file to read, if any.
///
/// Explicitly requested paths that do not exist are an error; the implicit
/// working-directory file is simply skipped when absent.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    from_env: Option<&Path>,
) -> ConfigResult<Option<PathBuf>> {
    if let Some(path) = explicit.or(from_env) {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let cwd_config = PathBuf::from(CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Ok(Some(cwd_config));
    }

    Ok(None)
}

/// Load settings from a file.
fn load_from_file(path: &Path) -> ConfigResult<Settings> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;

    toml::from_str(&content).map_err(ConfigError::ParseError)
}

/// Apply overrides looked up through `lookup` (normally the process environment).
///
/// Recognised variables:
/// - `SERIAL_TAP_LOG_LEVEL`
/// - `SERIAL_TAP_LOG_FORMAT`
/// - `SERIAL_TAP_READ_BUFFER_SIZE`
/// - `SERIAL_TAP_QUEUE_DEPTH`
pub fn apply_overrides<F>(settings: &mut Settings, lookup: F) -> ConfigResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| format!("{}_{}", ENV_PREFIX, key);

    if let Some(val) = lookup(&var("LOG_LEVEL")) {
        settings.logging.level = val;
    }
    if let Some(val) = lookup(&var("LOG_FORMAT")) {
        settings.logging.format = val
            .parse()
            .map_err(|_| ConfigError::env_parse(var("LOG_FORMAT"), "Invalid log format"))?;
    }
    if let Some(val) = lookup(&var("READ_BUFFER_SIZE")) {
        settings.bridge.read_buffer_size = val.parse().map_err(|_| {
            ConfigError::env_parse(var("READ_BUFFER_SIZE"), "Invalid buffer size")
        })?;
    }
    if let Some(val) = lookup(&var("QUEUE_DEPTH")) {
        settings.bridge.queue_depth = val
            .parse()
            .map_err(|_| ConfigError::env_parse(var("QUEUE_DEPTH"), "Invalid queue depth"))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogFormat;
    use std::collections::HashMap;
    use std::io::Write;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_loader() {
        let loader = SettingsLoader::with_defaults();
        assert_eq!(loader.settings().bridge.read_buffer_size, 1024);
        assert!(loader.config_path.is_none());
    }

    #[test]
    fn test_overrides_applied() {
        let mut settings = Settings::default();
        let lookup = lookup_from(&[
            ("SERIAL_TAP_LOG_LEVEL", "debug"),
            ("SERIAL_TAP_LOG_FORMAT", "compact"),
            ("SERIAL_TAP_QUEUE_DEPTH", "8"),
        ]);

        apply_overrides(&mut settings, lookup).unwrap();
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.logging.format, LogFormat::Compact);
        assert_eq!(settings.bridge.queue_depth, 8);
        assert_eq!(settings.bridge.read_buffer_size, 1024);
    }

    #[test]
    fn test_bad_override_rejected() {
        let mut settings = Settings::default();
        let lookup = lookup_from(&[("SERIAL_TAP_READ_BUFFER_SIZE", "lots")]);

        let err = apply_overrides(&mut settings, lookup).unwrap_err();
        assert!(matches!(err, ConfigError::EnvParseError { .. }));
    }

    #[test]
    fn test_missing_explicit_path_is_error() {
        let missing = Path::new("/definitely/not/here/serial-tap.toml");
        let err = resolve_config_path(Some(missing), None).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[bridge]\nbanner = false\nqueue_depth = 4").unwrap();

        let loader = SettingsLoader::load_from(file.path()).unwrap();
        assert!(!loader.settings().bridge.banner);
        assert_eq!(loader.settings().bridge.queue_depth, 4);
        assert_eq!(loader.config_path.as_deref(), Some(file.path()));
    }

    #[test]
    fn test_load_from_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[bridge]\nread_buffer_size = 0").unwrap();

        let err = SettingsLoader::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }
}
