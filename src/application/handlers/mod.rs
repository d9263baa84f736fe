//! Application handlers.
//!
//! Command handlers that orchestrate domain operations.

pub mod scoring;

pub use scoring::{
    AnalyzeReviewsCommand, AnalyzeReviewsHandler, ChunkDispatcher, DispatchOutcome,
    DispatchPolicy,
};
