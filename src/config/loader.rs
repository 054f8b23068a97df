//! Configuration loading from disk and environment.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Something the loader noticed before tracing is initialized.
///
/// The loader runs before the subscriber exists, so it hands these back
/// instead of logging them; call [`ConfigNotice::log`] once tracing is up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigNotice {
    /// The config file was absent and defaults were used.
    DefaultsUsed { path: PathBuf },
    /// An environment override could not be parsed and was skipped.
    IgnoredOverride { key: String, value: String },
}

impl ConfigNotice {
    pub fn log(&self) {
        match self {
            Self::DefaultsUsed { path } => {
                tracing::info!(path = %path.display(), "Config file not found, using defaults");
            }
            Self::IgnoredOverride { key, value } => {
                tracing::warn!(key = %key, value = %value, "Ignoring unparseable environment override");
            }
        }
    }
}

/// A validated configuration plus the loader's notices.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: AppConfig,
    pub notices: Vec<ConfigNotice>,
}

/// Load, override and validate configuration.
///
/// A missing file yields the defaults. Environment overrides are applied on
/// top of the file, and the log directory is created before returning.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let mut notices = Vec::new();
    let mut config = if path.exists() {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)?
    } else {
        notices.push(ConfigNotice::DefaultsUsed { path: path.to_path_buf() });
        AppConfig::default()
    };

    notices.extend(apply_env_overrides(&mut config, |key| std::env::var(key).ok()));
    validate_config(&config).map_err(ConfigError::Validation)?;

    if let Some(dir) = Path::new(&config.logging.log_file)
        .parent()
        .filter(|d| !d.as_os_str().is_empty())
    {
        fs::create_dir_all(dir)?;
    }

    Ok(LoadedConfig { config, notices })
}

/// Apply `LOG_*` and `PORT` overrides. Unparseable values are skipped and
/// reported in the returned notices.
pub fn apply_env_overrides<F>(config: &mut AppConfig, var: F) -> Vec<ConfigNotice>
where
    F: Fn(&str) -> Option<String>,
{
    let mut notices = Vec::new();
    let logging = &mut config.logging;

    if let Some(dir) = var("LOG_DIR").filter(|v| !v.is_empty()) {
        logging.log_file = PathBuf::from(dir).join("app.log").to_string_lossy().into_owned();
    }
    if let Some(file) = var("LOG_FILE").filter(|v| !v.is_empty()) {
        logging.log_file = file;
    }
    if let Some(v) = parsed(&var, "LOG_MAX_SIZE", &mut notices) {
        logging.rotation.max_size_mb = v;
    }
    if let Some(v) = parsed(&var, "LOG_MAX_AGE", &mut notices) {
        logging.rotation.max_age_days = v;
    }
    if let Some(v) = parsed(&var, "LOG_MAX_BACKUPS", &mut notices) {
        logging.rotation.max_backups = v;
    }
    if let Some(v) = parsed(&var, "LOG_COMPRESS", &mut notices) {
        logging.rotation.compress = v;
    }
    if let Some(v) = parsed(&var, "LOG_DEBUG", &mut notices) {
        logging.debug = v;
    }
    if let Some(port) = parsed::<u16, _>(&var, "PORT", &mut notices) {
        let host = config
            .server
            .bind_address
            .rsplit_once(':')
            .map(|(host, _)| host.to_string())
            .unwrap_or_else(|| "0.0.0.0".to_string());
        config.server.bind_address = format!("{}:{}", host, port);
    }
    notices
}

fn parsed<T, F>(var: &F, key: &str, notices: &mut Vec<ConfigNotice>) -> Option<T>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let raw = var(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            notices.push(ConfigNotice::IgnoredOverride { key: key.to_string(), value: raw });
            None
        }
    }
}
