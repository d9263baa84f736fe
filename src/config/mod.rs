//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `REVIEW_LENS` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use review_lens::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Scoring with {}", config.ai.model);
//! ```

mod ai;
mod error;
mod scoring;

pub use ai::AiConfig;
pub use error::{ConfigError, ValidationError};
pub use scoring::ScoringConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Upstream chat-completion provider
    #[serde(default)]
    pub ai: AiConfig,

    /// Chunking, timeouts and retries
    #[serde(default)]
    pub scoring: ScoringConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `REVIEW_LENS` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `REVIEW_LENS__AI__API_KEY=sk-...` -> `ai.api_key = ...`
    /// - `REVIEW_LENS__SCORING__CHUNK_SIZE=20` -> `scoring.chunk_size = 20`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("REVIEW_LENS")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.scoring.validate()?;
        Ok(())
    }
}
