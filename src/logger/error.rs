//! Log core errors.

use thiserror::Error;

use crate::delivery::RegistryError;

#[derive(Debug, Error)]
pub enum LogError {
    /// The durable write to the log file failed; the entry was not persisted.
    #[error("failed to write log entry: {0}")]
    Io(#[from] std::io::Error),

    /// The process-wide logger was used before it was installed.
    #[error("logger not initialized - install a logger first")]
    NotInitialized,

    /// Delivery workers need a Tokio runtime to run on.
    #[error("no Tokio runtime available for delivery workers")]
    NoRuntime,

    #[error(transparent)]
    Registry(#[from] RegistryError),
}
