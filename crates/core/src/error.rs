use std::io;

/// Errors that can occur during ledgerdev operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Invalid device: {0}")]
    InvalidDevice(String),

    #[error("Unknown app: {0}")]
    UnknownApp(String),

    #[error("Unknown task: {0}")]
    UnknownTask(String),

    #[error("Task '{0}' is disabled for the selected target")]
    TaskDisabled(String),

    #[error("Task '{0}' is not available for the selected app")]
    TaskUnavailable(String),

    #[error("Unknown build use case: {0}")]
    UnknownUseCase(String),

    #[error("Unknown variant: {0}")]
    UnknownVariant(String),

    #[error("Fuzzing not available: {0}")]
    MissingFuzzing(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Manifest error: {0}")]
    ManifestError(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for ledgerdev operations
pub type Result<T> = std::result::Result<T, Error>;
