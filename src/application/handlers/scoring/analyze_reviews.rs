//! AnalyzeReviewsHandler - Score a batch of reviews for authenticity

use crate::domain::review::{AnalysisResult, Review};
use crate::domain::scoring::AnalysisError;

use super::ChunkDispatcher;

/// Command to analyze a batch of reviews
#[derive(Debug, Clone)]
pub struct AnalyzeReviewsCommand {
    pub reviews: Vec<Review>,
}

impl AnalyzeReviewsCommand {
    pub fn new(reviews: Vec<Review>) -> Self {
        Self { reviews }
    }
}

/// Handler for review analysis requests
pub struct AnalyzeReviewsHandler {
    dispatcher: ChunkDispatcher,
}

impl AnalyzeReviewsHandler {
    pub fn new(dispatcher: ChunkDispatcher) -> Self {
        Self { dispatcher }
    }

    pub async fn handle(&self, cmd: AnalyzeReviewsCommand) -> Result<AnalysisResult, AnalysisError> {
        self.analyze(&cmd.reviews).await
    }

    /// Scores `reviews` without building a command.
    pub async fn analyze(&self, reviews: &[Review]) -> Result<AnalysisResult, AnalysisError> {
        let outcome = self.dispatcher.dispatch(reviews).await?;
        Ok(AnalysisResult::new(outcome.scores, outcome.summary))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{MockAIProvider, MockError};
    use crate::application::handlers::scoring::DispatchPolicy;
    use crate::domain::foundation::ReviewRating;
    use crate::domain::review::DispatchMode;
    use crate::domain::scoring::UpstreamFailure;
    use std::sync::Arc;
    use std::time::Duration;

    fn handler(provider: MockAIProvider) -> AnalyzeReviewsHandler {
        let policy = DispatchPolicy {
            retry_backoff: Duration::ZERO,
            ..Default::default()
        };
        AnalyzeReviewsHandler::new(ChunkDispatcher::new(Arc::new(provider), policy))
    }

    fn review(id: &str, stars: i64) -> Review {
        Review::new(id, ReviewRating::try_new(stars).unwrap(), "Title", "Body text")
    }

    #[tokio::test]
    async fn test_analyze_returns_detailed_scores() {
        let provider = MockAIProvider::new()
            .with_response("```json\n[{\"id\":\"a\",\"score\":15},{\"id\":\"b\",\"score\":88}]\n```");
        let cmd = AnalyzeReviewsCommand::new(vec![review("a", 5), review("b", 1)]);

        let result = handler(provider).handle(cmd).await.unwrap();

        assert_eq!(result.detailed_scores.get("a"), Some(15));
        assert_eq!(result.detailed_scores.get("b"), Some(88));
        assert!(result.is_complete());
        assert_eq!(result.summary.mode, DispatchMode::Single);
    }

    #[tokio::test]
    async fn test_analyze_empty_batch() {
        let provider = MockAIProvider::new();
        let result = handler(provider.clone()).analyze(&[]).await.unwrap();

        assert!(result.detailed_scores.is_empty());
        assert_eq!(provider.call_count(), 0);
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"detailed_scores":{}}"#
        );
    }

    #[tokio::test]
    async fn test_analyze_surfaces_quota_error() {
        let provider = MockAIProvider::new().with_error(MockError::QuotaExceeded);

        let result = handler(provider).analyze(&[review("a", 3)]).await;

        let err = result.unwrap_err();
        assert_eq!(
            err,
            AnalysisError::upstream(UpstreamFailure::QuotaExceeded, Some(429))
        );
        assert_eq!(err.to_string(), UpstreamFailure::QuotaExceeded.user_message());
    }

    #[tokio::test]
    async fn test_unparseable_reply_leaves_reviews_unscored() {
        let provider = MockAIProvider::new().with_response("I cannot help with that.");

        let result = handler(provider).analyze(&[review("a", 3)]).await.unwrap();

        assert!(result.detailed_scores.is_empty());
        assert_eq!(result.summary.unscored_ids, vec!["a"]);
    }
}
