//! Review file loader - reads a JSON array of reviews from disk or stdin.
//!
//! Scraped exports are not always UTF-8, so the raw bytes go through the
//! same decoding path the sanitizer uses before JSON parsing.

use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::domain::review::Review;
use crate::domain::scoring::decode_lossless_or_detect;

/// Errors loading a review file.
#[derive(Debug, Error)]
pub enum ReviewFileError {
    #[error("Failed to read {source_name}: {source}")]
    Io {
        source_name: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid review JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Loads reviews from `path`, or from stdin when `path` is `None` or `-`.
pub fn load_reviews(path: Option<&Path>) -> Result<Vec<Review>, ReviewFileError> {
    match path {
        Some(path) if path != Path::new("-") => {
            let bytes = std::fs::read(path).map_err(|source| ReviewFileError::Io {
                source_name: path.display().to_string(),
                source,
            })?;
            parse_reviews(&bytes)
        }
        _ => {
            let mut bytes = Vec::new();
            std::io::stdin()
                .read_to_end(&mut bytes)
                .map_err(|source| ReviewFileError::Io {
                    source_name: "stdin".to_string(),
                    source,
                })?;
            parse_reviews(&bytes)
        }
    }
}

/// Parses a JSON array of reviews from raw bytes in any detectable encoding.
pub fn parse_reviews(bytes: &[u8]) -> Result<Vec<Review>, ReviewFileError> {
    let text = decode_lossless_or_detect(bytes);
    Ok(serde_json::from_str(text.trim_start_matches('\u{feff}'))?)
}

/// Resolves the CLI's optional positional path argument.
pub fn input_path_from_args(mut args: impl Iterator<Item = String>) -> Option<PathBuf> {
    args.nth(1).map(PathBuf::from)
}
