//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("API base URL must start with http:// or https://")]
    InvalidBaseUrl,

    #[error("Model name cannot be empty")]
    EmptyModel,

    #[error("Chunk size must be at least 1")]
    InvalidChunkSize,

    #[error("Timeout '{0}' must be greater than zero")]
    InvalidTimeout(&'static str),

    #[error("Truncation limit '{0}' must be greater than zero")]
    InvalidTruncation(&'static str),
}
