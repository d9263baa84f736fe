//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, errors)
//! - `review` - Reviews, score maps and the analysis result
//! - `scoring` - Pure services of the scoring pipeline (sanitize, prompt, parse, merge)

pub mod foundation;
pub mod review;
pub mod scoring;
