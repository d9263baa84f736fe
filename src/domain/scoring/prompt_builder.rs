//! Prompt builder - serializes a review batch into a compact user prompt.
//!
//! One line per review keeps the payload small while preserving the signals
//! the model scores on:
//!
//! ```text
//! id:R17|r:5|f:V,VV|t:Great value|b:Bought two of these for ...
//! ```
//!
//! Text is sanitized first, then truncated by character count, then
//! whitespace-collapsed so a review never spans more than one line.

use super::rubric::{FIELD_LEGEND, SCORING_BANDS};
use super::sanitizer::{sanitize, truncate_chars};
use crate::domain::review::Review;

pub const DEFAULT_TITLE_MAX_CHARS: usize = 100;
pub const DEFAULT_BODY_MAX_CHARS: usize = 400;

/// Builds user prompts with configurable text caps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromptBuilder {
    title_max_chars: usize,
    body_max_chars: usize,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self {
            title_max_chars: DEFAULT_TITLE_MAX_CHARS,
            body_max_chars: DEFAULT_BODY_MAX_CHARS,
        }
    }
}

impl PromptBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum title length in characters.
    pub fn with_title_max_chars(mut self, max: usize) -> Self {
        self.title_max_chars = max;
        self
    }

    /// Sets the maximum body length in characters.
    pub fn with_body_max_chars(mut self, max: usize) -> Self {
        self.body_max_chars = max;
        self
    }

    /// Renders the rubric header followed by one line per review.
    pub fn build(&self, reviews: &[Review]) -> String {
        let mut prompt = String::with_capacity(256 + reviews.len() * 160);
        prompt.push_str(SCORING_BANDS);
        prompt.push('\n');
        prompt.push_str(FIELD_LEGEND);
        prompt.push('\n');
        prompt.push_str(&format!("Reviews ({}):\n", reviews.len()));

        for review in reviews {
            prompt.push_str(&self.render_review(review));
            prompt.push('\n');
        }

        prompt
    }

    /// The id exactly as it appears in the prompt, and so as the model echoes it.
    pub fn rendered_id(id: &str) -> String {
        single_line(&sanitize(id))
    }

    fn render_review(&self, review: &Review) -> String {
        format!(
            "id:{}|r:{}|f:{}|t:{}|b:{}",
            Self::rendered_id(&review.id),
            review.rating,
            flags(review),
            clip(&review.review_title, self.title_max_chars),
            clip(&review.review_text, self.body_max_chars),
        )
    }
}

fn flags(review: &Review) -> &'static str {
    match (
        review.meta_data.verified_purchase,
        review.meta_data.is_vine_voice,
    ) {
        (true, true) => "V,VV",
        (true, false) => "V",
        (false, true) => "VV",
        (false, false) => "-",
    }
}

fn clip(text: &str, max_chars: usize) -> String {
    single_line(&truncate_chars(&sanitize(text), max_chars))
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::ReviewRating;

    fn review(id: &str, title: &str, body: &str) -> Review {
        Review::new(id, ReviewRating::try_new(5).unwrap(), title, body)
    }

    #[test]
    fn header_contains_bands_and_legend() {
        let prompt = PromptBuilder::new().build(&[]);

        assert!(prompt.starts_with(SCORING_BANDS));
        assert!(prompt.contains(FIELD_LEGEND));
        assert!(prompt.contains("Reviews (0):"));
    }

    #[test]
    fn renders_one_line_per_review_with_flags() {
        let reviews = vec![
            review("a", "Nice", "Good").verified(),
            review("b", "Meh", "Ok").vine_voice(),
            review("c", "Wow", "Best ever").verified().vine_voice(),
            review("d", "Bad", "Broke"),
        ];

        let prompt = PromptBuilder::new().build(&reviews);

        assert!(prompt.contains("id:a|r:5|f:V|t:Nice|b:Good\n"));
        assert!(prompt.contains("id:b|r:5|f:VV|t:Meh|b:Ok\n"));
        assert!(prompt.contains("id:c|r:5|f:V,VV|t:Wow|b:Best ever\n"));
        assert!(prompt.contains("id:d|r:5|f:-|t:Bad|b:Broke\n"));
    }

    #[test]
    fn truncates_title_and_body_by_characters() {
        let title = "é".repeat(150);
        let body = "x".repeat(1000);

        let prompt = PromptBuilder::new().build(&[review("a", &title, &body)]);
        let line = prompt.lines().last().unwrap();

        let expected_title = "é".repeat(100);
        let expected_body = "x".repeat(400);
        assert_eq!(line, format!("id:a|r:5|f:-|t:{expected_title}|b:{expected_body}"));
    }

    #[test]
    fn sanitizes_before_truncating() {
        // Control characters must not consume the character budget.
        let title = format!("{}abc", "\0".repeat(10));

        let prompt = PromptBuilder::new()
            .with_title_max_chars(3)
            .build(&[review("a", &title, "")]);

        assert!(prompt.contains("|t:abc|"));
    }

    #[test]
    fn multiline_text_is_collapsed_to_one_line() {
        let prompt = PromptBuilder::new().build(&[review("a", "T", "line1\n\nline2\tend")]);

        assert!(prompt.contains("|b:line1 line2 end\n"));
    }

    #[test]
    fn ids_are_rendered_on_one_clean_line() {
        assert_eq!(PromptBuilder::rendered_id("R1 "), "R1");
        assert_eq!(PromptBuilder::rendered_id("R\t2"), "R 2");
        assert_eq!(PromptBuilder::rendered_id("R\u{7}3"), "R3");

        let prompt = PromptBuilder::new().build(&[review("R\t2", "T", "B")]);
        assert!(prompt.contains("\nid:R 2|r:5|"));
    }

    #[test]
    fn custom_caps_apply() {
        let prompt = PromptBuilder::new()
            .with_title_max_chars(2)
            .with_body_max_chars(3)
            .build(&[review("a", "Title", "Body text")]);

        assert!(prompt.contains("|t:Ti|b:Bod\n"));
    }
}
