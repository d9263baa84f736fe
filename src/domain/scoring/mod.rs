//! Scoring Module - Pure domain services for the review scoring pipeline.
//!
//! # Components
//!
//! - `sanitizer` - Total cleaning and decoding of user-submitted text
//! - `PromptBuilder` - Compact per-batch user prompt
//! - `estimate_output_tokens` - Output token ceiling per batch
//! - `response_parser` - Staged recovery of scores from model output
//! - `aggregator` - Merge of per-chunk score maps
//!
//! All functions are pure. Network I/O lives behind the `AIProvider` port
//! and is driven by the application layer.

pub mod aggregator;
mod errors;
mod prompt_builder;
pub mod response_parser;
mod rubric;
pub mod sanitizer;
mod token_budget;

pub use aggregator::{merge, merge_reporting, MergeReport};
pub use errors::{AnalysisError, UpstreamFailure};
pub use prompt_builder::{PromptBuilder, DEFAULT_BODY_MAX_CHARS, DEFAULT_TITLE_MAX_CHARS};
pub use response_parser::{parse, parse_detailed, ParseOutcome, ParseStage};
pub use rubric::{FIELD_LEGEND, SCORING_BANDS, SCORING_TEMPERATURE, SCORING_TOP_P, SYSTEM_RUBRIC};
pub use sanitizer::{decode_lossless_or_detect, sanitize, sanitize_bytes};
pub use token_budget::{
    estimate_output_tokens, BUFFER_TOKENS_PER_REVIEW, MAX_BUFFER_TOKENS, TOKENS_PER_SCORE,
};
