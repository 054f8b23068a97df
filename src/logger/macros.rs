//! Formatting macros over a `Logger` handle.
//!
//! ```ignore
//! logrelay::info!(logger, "listening on {}", addr)?;
//! logrelay::debug!(logger, "cache miss for {key}")?;
//! ```
//!
//! Arguments are captured with `format_args!`, so a disabled DEBUG call
//! never formats its message.

#[macro_export]
macro_rules! debug {
    ($logger:expr, $($arg:tt)+) => {
        $logger.debug(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! info {
    ($logger:expr, $($arg:tt)+) => {
        $logger.info(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! warn {
    ($logger:expr, $($arg:tt)+) => {
        $logger.warn(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! error {
    ($logger:expr, $($arg:tt)+) => {
        $logger.error(::std::format_args!($($arg)+))
    };
}

/// Log at FATAL and exit the process with status 1.
#[macro_export]
macro_rules! fatal {
    ($logger:expr, $($arg:tt)+) => {
        $logger.fatal(::std::format_args!($($arg)+))
    };
}

#[cfg(test)]
mod tests {
    use crate::config::{DeliveryConfig, LoggingConfig};
    use crate::logger::Logger;

    #[tokio::test]
    async fn test_macros_format_and_gate() {
        let dir = tempfile::tempdir().unwrap();
        let config = LoggingConfig {
            log_file: dir.path().join("app.log").to_string_lossy().into_owned(),
            log_to_stdout: false,
            ..Default::default()
        };
        let logger = Logger::new(&config, &DeliveryConfig::default()).unwrap();

        let port = 8080;
        crate::info!(logger, "listening on {}", port).unwrap();
        crate::warn!(logger, "disk at {pct}%", pct = 91).unwrap();
        crate::debug!(logger, "hidden").unwrap();
        logger.set_debug(true);
        crate::debug!(logger, "visible").unwrap();
        crate::error!(logger, "plain").unwrap();

        let contents = std::fs::read_to_string(logger.log_file()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with("[INFO] listening on 8080"));
        assert!(lines[1].ends_with("[WARN] disk at 91%"));
        assert!(lines[2].contains("[DEBUG] src/logger/macros.rs:"));
        assert!(lines[2].ends_with(": visible"));
        assert!(lines[3].ends_with("[ERROR] plain"));
    }
}
