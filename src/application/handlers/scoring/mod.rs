//! Scoring handlers.
//!
//! - `ChunkDispatcher` - Single or chunked dispatch to the AI provider
//! - `AnalyzeReviewsHandler` - Inbound entry point returning an `AnalysisResult`

mod analyze_reviews;
mod chunk_dispatcher;

pub use analyze_reviews::{AnalyzeReviewsCommand, AnalyzeReviewsHandler};
pub use chunk_dispatcher::{ChunkDispatcher, DispatchOutcome, DispatchPolicy};
