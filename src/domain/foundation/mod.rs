//! Foundation module - Shared domain primitives.
//!
//! Contains the value objects and error types that form the vocabulary
//! of the review scoring domain.

mod errors;
mod rating;

pub use errors::ValidationError;
pub use rating::ReviewRating;
