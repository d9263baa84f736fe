//! Review - a single product review submitted for scoring.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::ReviewRating;

/// A product review as supplied by the caller.
///
/// Text fields are user-submitted and may contain control characters or
/// stray whitespace; they are cleaned by the sanitizer before use, never here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Caller-assigned identifier, echoed back in the score map.
    pub id: String,
    pub rating: ReviewRating,
    #[serde(default)]
    pub review_title: String,
    #[serde(default)]
    pub review_text: String,
    #[serde(default)]
    pub meta_data: ReviewMeta,
}

/// Reviewer signals carried alongside the text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewMeta {
    #[serde(default)]
    pub verified_purchase: bool,
    /// Member of the vendor's invited-reviewer (Vine) program.
    #[serde(default)]
    pub is_vine_voice: bool,
}

impl Review {
    /// Creates a review with no reviewer signals set.
    pub fn new(
        id: impl Into<String>,
        rating: ReviewRating,
        title: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            rating,
            review_title: title.into(),
            review_text: text.into(),
            meta_data: ReviewMeta::default(),
        }
    }

    /// Marks the review as a verified purchase.
    pub fn verified(mut self) -> Self {
        self.meta_data.verified_purchase = true;
        self
    }

    /// Marks the reviewer as a Vine program member.
    pub fn vine_voice(mut self) -> Self {
        self.meta_data.is_vine_voice = true;
        self
    }
}
