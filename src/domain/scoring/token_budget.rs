//! Output token budget for a scoring request.

/// Approximate output tokens for one `{"id":...,"score":...}` record.
pub const TOKENS_PER_SCORE: u32 = 12;

/// Extra tokens per review to absorb id length variance and formatting.
pub const BUFFER_TOKENS_PER_REVIEW: u32 = 5;

/// Ceiling on the formatting buffer, regardless of batch size.
pub const MAX_BUFFER_TOKENS: u32 = 1000;

/// Returns the `max_tokens` request parameter for a batch of `review_count` reviews.
pub fn estimate_output_tokens(review_count: usize) -> u32 {
    let count = u32::try_from(review_count).unwrap_or(u32::MAX);
    let base = count.saturating_mul(TOKENS_PER_SCORE);
    let buffer = count
        .saturating_mul(BUFFER_TOKENS_PER_REVIEW)
        .min(MAX_BUFFER_TOKENS);
    base.saturating_add(buffer)
}
