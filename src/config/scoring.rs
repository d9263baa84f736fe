//! Scoring pipeline configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Chunking, timeout and retry knobs for the scoring pipeline
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ScoringConfig {
    /// Reviews per chunk on the concurrent path
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Batches larger than this are chunked and sent concurrently
    #[serde(default = "default_parallel_threshold")]
    pub parallel_threshold: usize,

    /// Per-chunk request timeout in seconds
    #[serde(default = "default_chunk_timeout")]
    pub chunk_timeout_secs: u64,

    /// Single-batch request timeout in seconds
    #[serde(default = "default_batch_timeout")]
    pub batch_timeout_secs: u64,

    /// Retries after the first attempt (single-batch path only)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Fixed delay between single-batch attempts in milliseconds
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,

    /// Launch offset between consecutive chunks in milliseconds
    #[serde(default)]
    pub chunk_stagger_ms: u64,

    /// Review title cap in characters
    #[serde(default = "default_title_max_chars")]
    pub title_max_chars: usize,

    /// Review body cap in characters
    #[serde(default = "default_body_max_chars")]
    pub body_max_chars: usize,
}

impl ScoringConfig {
    pub fn chunk_timeout(&self) -> Duration {
        Duration::from_secs(self.chunk_timeout_secs)
    }

    pub fn batch_timeout(&self) -> Duration {
        Duration::from_secs(self.batch_timeout_secs)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn chunk_stagger(&self) -> Duration {
        Duration::from_millis(self.chunk_stagger_ms)
    }

    /// Validate scoring configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.chunk_size == 0 {
            return Err(ValidationError::InvalidChunkSize);
        }
        if self.chunk_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("chunk_timeout_secs"));
        }
        if self.batch_timeout_secs == 0 {
            return Err(ValidationError::InvalidTimeout("batch_timeout_secs"));
        }
        if self.title_max_chars == 0 {
            return Err(ValidationError::InvalidTruncation("title_max_chars"));
        }
        if self.body_max_chars == 0 {
            return Err(ValidationError::InvalidTruncation("body_max_chars"));
        }
        Ok(())
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            parallel_threshold: default_parallel_threshold(),
            chunk_timeout_secs: default_chunk_timeout(),
            batch_timeout_secs: default_batch_timeout(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
            chunk_stagger_ms: 0,
            title_max_chars: default_title_max_chars(),
            body_max_chars: default_body_max_chars(),
        }
    }
}

fn default_chunk_size() -> usize {
    25
}

fn default_parallel_threshold() -> usize {
    50
}

fn default_chunk_timeout() -> u64 {
    30
}

fn default_batch_timeout() -> u64 {
    120
}

fn default_max_retries() -> u32 {
    2
}

fn default_retry_backoff() -> u64 {
    2000
}

fn default_title_max_chars() -> usize {
    100
}

fn default_body_max_chars() -> usize {
    400
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scoring_defaults() {
        let config = ScoringConfig::default();
        assert_eq!(config.chunk_size, 25);
        assert_eq!(config.parallel_threshold, 50);
        assert_eq!(config.chunk_timeout(), Duration::from_secs(30));
        assert_eq!(config.batch_timeout(), Duration::from_secs(120));
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.retry_backoff(), Duration::from_secs(2));
        assert_eq!(config.chunk_stagger(), Duration::ZERO);
        assert_eq!(config.title_max_chars, 100);
        assert_eq!(config.body_max_chars, 400);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let config = ScoringConfig {
            chunk_size: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidChunkSize));
    }

    #[test]
    fn test_zero_timeouts_rejected() {
        let config = ScoringConfig {
            batch_timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::InvalidTimeout("batch_timeout_secs"))
        );
    }

    #[test]
    fn test_zero_truncation_rejected() {
        let config = ScoringConfig {
            body_max_chars: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
