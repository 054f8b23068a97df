//! Process-wide logger slot.
//!
//! Installing is optional; code that holds a `Logger` should pass it
//! explicitly. The slot exists for call sites that cannot be threaded a
//! handle (panic hooks, deeply nested helpers).

use std::sync::OnceLock;

use crate::logger::{LogError, Logger};

static GLOBAL: OnceLock<Logger> = OnceLock::new();

/// Install `logger` as the process-wide logger. The first install wins;
/// later calls return the already installed logger.
pub fn install(logger: Logger) -> &'static Logger {
    GLOBAL.get_or_init(|| logger)
}

/// Build and install the process-wide logger unless one is already
/// installed. `build` runs at most once per successful install.
pub fn init_with<F>(build: F) -> Result<&'static Logger, LogError>
where
    F: FnOnce() -> Result<Logger, LogError>,
{
    if let Some(logger) = GLOBAL.get() {
        return Ok(logger);
    }
    let logger = build()?;
    Ok(install(logger))
}

/// The installed logger, or `NotInitialized`.
pub fn get() -> Result<&'static Logger, LogError> {
    GLOBAL.get().ok_or(LogError::NotInitialized)
}

pub fn is_installed() -> bool {
    GLOBAL.get().is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DeliveryConfig, LoggingConfig};

    // The slot is process-wide, so the whole lifecycle lives in one test.
    #[tokio::test]
    async fn test_install_once() {
        assert!(matches!(get(), Err(LogError::NotInitialized)));
        assert!(!is_installed());

        let dir = tempfile::tempdir().unwrap();
        let config = |name: &str| LoggingConfig {
            log_file: dir.path().join(name).to_string_lossy().into_owned(),
            log_to_stdout: false,
            ..Default::default()
        };

        let first = init_with(|| Logger::new(&config("first.log"), &DeliveryConfig::default())).unwrap();
        assert!(first.log_file().ends_with("first.log"));

        let second = install(Logger::new(&config("second.log"), &DeliveryConfig::default()).unwrap());
        assert!(second.log_file().ends_with("first.log"));

        let mut built = false;
        init_with(|| {
            built = true;
            Logger::new(&config("third.log"), &DeliveryConfig::default())
        })
        .unwrap();
        assert!(!built);

        get().unwrap().info(format_args!("through the slot")).unwrap();
        let contents = std::fs::read_to_string(dir.path().join("first.log")).unwrap();
        assert!(contents.contains("[INFO] through the slot"));
    }
}
