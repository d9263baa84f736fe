//! ChunkDispatcher - sends a review batch upstream and collects scores.
//!
//! Small batches go out as one request with retry. Batches above the
//! parallel threshold are split into fixed-size chunks that are all in
//! flight at once; a failed chunk contributes nothing and never fails
//! its siblings.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::time::sleep;
use uuid::Uuid;

use crate::config::ScoringConfig;
use crate::domain::review::{DispatchMode, DispatchSummary, Review, ScoreMap};
use crate::domain::scoring::{
    estimate_output_tokens, merge_reporting, parse_detailed, AnalysisError, ParseOutcome,
    ParseStage, PromptBuilder, SCORING_TEMPERATURE, SCORING_TOP_P, SYSTEM_RUBRIC,
};
use crate::ports::{
    AIError, AIProvider, AnalysisEvent, AnalysisObserver, CompletionRequest, CompletionResponse,
    FinishReason, MessageRole, NoOpObserver, RequestMetadata,
};

/// Chunking, timeout and retry settings for one dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchPolicy {
    /// Reviews per chunk on the concurrent path.
    pub chunk_size: usize,
    /// Batches with more reviews than this are chunked.
    pub parallel_threshold: usize,
    /// Request timeout for each chunk.
    pub chunk_timeout: Duration,
    /// Request timeout for the single-batch path.
    pub batch_timeout: Duration,
    /// Retries after the first attempt, single-batch path only.
    pub max_retries: u32,
    /// Fixed delay before each retry.
    pub retry_backoff: Duration,
    /// Chunk `i` waits `i * chunk_stagger` before sending.
    pub chunk_stagger: Duration,
}

impl Default for DispatchPolicy {
    fn default() -> Self {
        Self::from(&ScoringConfig::default())
    }
}

impl From<&ScoringConfig> for DispatchPolicy {
    fn from(config: &ScoringConfig) -> Self {
        Self {
            chunk_size: config.chunk_size,
            parallel_threshold: config.parallel_threshold,
            chunk_timeout: config.chunk_timeout(),
            batch_timeout: config.batch_timeout(),
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff(),
            chunk_stagger: config.chunk_stagger(),
        }
    }
}

/// Merged scores plus what happened along the way.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOutcome {
    pub scores: ScoreMap,
    pub summary: DispatchSummary,
}

/// Fans a batch out to the AI provider and merges what comes back.
pub struct ChunkDispatcher {
    provider: Arc<dyn AIProvider>,
    observer: Arc<dyn AnalysisObserver>,
    prompt_builder: PromptBuilder,
    policy: DispatchPolicy,
}

impl ChunkDispatcher {
    pub fn new(provider: Arc<dyn AIProvider>, policy: DispatchPolicy) -> Self {
        Self {
            provider,
            observer: Arc::new(NoOpObserver),
            prompt_builder: PromptBuilder::default(),
            policy,
        }
    }

    /// Builds a dispatcher whose policy and prompt caps come from config.
    pub fn from_config(provider: Arc<dyn AIProvider>, config: &ScoringConfig) -> Self {
        Self::new(provider, DispatchPolicy::from(config)).with_prompt_builder(
            PromptBuilder::new()
                .with_title_max_chars(config.title_max_chars)
                .with_body_max_chars(config.body_max_chars),
        )
    }

    pub fn with_observer(mut self, observer: Arc<dyn AnalysisObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn with_prompt_builder(mut self, prompt_builder: PromptBuilder) -> Self {
        self.prompt_builder = prompt_builder;
        self
    }

    pub fn policy(&self) -> &DispatchPolicy {
        &self.policy
    }

    /// Scores `reviews`, choosing the chunked or single path by size.
    ///
    /// # Errors
    ///
    /// Only the single-batch path fails, once retries are spent or the
    /// upstream error is not retryable.
    pub async fn dispatch(&self, reviews: &[Review]) -> Result<DispatchOutcome, AnalysisError> {
        if reviews.is_empty() {
            return Ok(DispatchOutcome::default());
        }

        let run_id = Uuid::new_v4();
        let started = Instant::now();

        let (scores, mut summary) = if reviews.len() > self.policy.parallel_threshold {
            self.dispatch_chunked(run_id, reviews).await
        } else {
            self.dispatch_single(run_id, reviews).await?
        };

        summary.unscored_ids = reviews
            .iter()
            .filter(|review| !scores.contains(&review.id))
            .map(|review| review.id.clone())
            .collect();

        self.observer.on_event(AnalysisEvent::DispatchCompleted {
            run_id,
            scored: scores.len(),
            unscored: summary.unscored_ids.len(),
            chunks_failed: summary.chunks_failed,
            elapsed: started.elapsed(),
        });

        Ok(DispatchOutcome { scores, summary })
    }

    async fn dispatch_chunked(&self, run_id: Uuid, reviews: &[Review]) -> (ScoreMap, DispatchSummary) {
        let chunks: Vec<&[Review]> = reviews.chunks(self.policy.chunk_size.max(1)).collect();

        self.observer.on_event(AnalysisEvent::DispatchStarted {
            run_id,
            mode: DispatchMode::Chunked,
            review_count: reviews.len(),
            chunk_count: chunks.len(),
        });

        let outcomes: Vec<Option<ParseOutcome>> = join_all(
            chunks
                .iter()
                .enumerate()
                .map(|(index, chunk)| self.score_chunk(run_id, index, chunk)),
        )
        .await;

        let chunks_failed = outcomes.iter().filter(|o| o.is_none()).count();
        let parse_stages = outcomes.iter().flatten().map(|o| o.stage).collect();

        let report = merge_reporting(outcomes.into_iter().flatten().map(|o| o.scores));
        if report.collisions > 0 {
            self.observer.on_event(AnalysisEvent::ScoreCollisions {
                run_id,
                collisions: report.collisions,
            });
        }

        let summary = DispatchSummary {
            mode: DispatchMode::Chunked,
            chunks_total: chunks.len(),
            chunks_failed,
            parse_stages,
            unscored_ids: Vec::new(),
        };
        (report.scores, summary)
    }

    /// One attempt for one chunk. `None` means the request failed.
    async fn score_chunk(&self, run_id: Uuid, index: usize, chunk: &[Review]) -> Option<ParseOutcome> {
        let offset = self
            .policy
            .chunk_stagger
            .saturating_mul(u32::try_from(index).unwrap_or(u32::MAX));
        if !offset.is_zero() {
            sleep(offset).await;
        }

        let request = self.build_request(run_id, Some(index), chunk, self.policy.chunk_timeout);
        self.observer.on_event(AnalysisEvent::ChunkStarted {
            run_id,
            chunk_index: index,
            review_count: chunk.len(),
            max_tokens: request.max_tokens.unwrap_or_default(),
        });

        match self.provider.complete(request).await {
            Ok(response) => Some(self.score_response(run_id, index, chunk, &response)),
            Err(err) => {
                self.report_failure(run_id, index, &err);
                None
            }
        }
    }

    async fn dispatch_single(
        &self,
        run_id: Uuid,
        reviews: &[Review],
    ) -> Result<(ScoreMap, DispatchSummary), AnalysisError> {
        self.observer.on_event(AnalysisEvent::DispatchStarted {
            run_id,
            mode: DispatchMode::Single,
            review_count: reviews.len(),
            chunk_count: 1,
        });

        let request = self.build_request(run_id, None, reviews, self.policy.batch_timeout);
        self.observer.on_event(AnalysisEvent::ChunkStarted {
            run_id,
            chunk_index: 0,
            review_count: reviews.len(),
            max_tokens: request.max_tokens.unwrap_or_default(),
        });

        let mut summary = DispatchSummary {
            mode: DispatchMode::Single,
            chunks_total: 1,
            ..Default::default()
        };

        let scores = match self.complete_with_retry(run_id, request).await {
            Ok(response) => {
                let outcome = self.score_response(run_id, 0, reviews, &response);
                summary.parse_stages.push(outcome.stage);
                outcome.scores
            }
            // An unreadable envelope is treated like unparseable content.
            Err(err @ AIError::Parse(_)) => {
                self.report_failure(run_id, 0, &err);
                summary.chunks_failed = 1;
                summary.parse_stages.push(ParseStage::Empty);
                ScoreMap::new()
            }
            Err(err) => {
                self.report_failure(run_id, 0, &err);
                return Err(err.into());
            }
        };

        Ok((scores, summary))
    }

    async fn complete_with_retry(
        &self,
        run_id: Uuid,
        request: CompletionRequest,
    ) -> Result<CompletionResponse, AIError> {
        let mut attempt = 0;
        loop {
            match self.provider.complete(request.clone()).await {
                Ok(response) => return Ok(response),
                Err(err) if err.is_retryable() && attempt < self.policy.max_retries => {
                    attempt += 1;
                    self.observer.on_event(AnalysisEvent::RetryScheduled {
                        run_id,
                        attempt,
                        delay: self.policy.retry_backoff,
                        kind: err.kind(),
                    });
                    if !self.policy.retry_backoff.is_zero() {
                        sleep(self.policy.retry_backoff).await;
                    }
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Parses a reply and keys it by the ids that were actually sent.
    fn score_response(
        &self,
        run_id: Uuid,
        index: usize,
        sent: &[Review],
        response: &CompletionResponse,
    ) -> ParseOutcome {
        let mut outcome = parse_detailed(&response.content);

        let (scores, discarded) = resolve_sent_ids(outcome.scores, sent);
        outcome.scores = scores;
        if discarded > 0 {
            self.observer.on_event(AnalysisEvent::UnknownIdsDiscarded {
                run_id,
                chunk_index: index,
                discarded,
            });
        }

        self.observer.on_event(AnalysisEvent::ChunkCompleted {
            run_id,
            chunk_index: index,
            scored: outcome.scores.len(),
            stage: outcome.stage,
            truncated: response.finish_reason == FinishReason::Length,
        });

        outcome
    }

    fn report_failure(&self, run_id: Uuid, index: usize, err: &AIError) {
        self.observer.on_event(AnalysisEvent::ChunkFailed {
            run_id,
            chunk_index: index,
            kind: err.kind(),
            error: err.to_string(),
        });
    }

    fn build_request(
        &self,
        run_id: Uuid,
        chunk_index: Option<usize>,
        reviews: &[Review],
        timeout: Duration,
    ) -> CompletionRequest {
        CompletionRequest::new(RequestMetadata::new(run_id, chunk_index))
            .with_system_prompt(SYSTEM_RUBRIC)
            .with_message(MessageRole::User, self.prompt_builder.build(reviews))
            .with_max_tokens(estimate_output_tokens(reviews.len()))
            .with_temperature(SCORING_TEMPERATURE)
            .with_top_p(SCORING_TOP_P)
            .with_timeout(timeout)
    }
}

/// Maps ids as rendered in the prompt back to the caller's ids.
///
/// Returns the resolved scores and the number of returned ids that match
/// nothing that was sent. Ids that render identically all receive the score.
fn resolve_sent_ids(parsed: ScoreMap, sent: &[Review]) -> (ScoreMap, usize) {
    let mut originals: HashMap<String, Vec<&str>> = HashMap::with_capacity(sent.len());
    for review in sent {
        originals
            .entry(PromptBuilder::rendered_id(&review.id))
            .or_default()
            .push(review.id.as_str());
    }

    let mut resolved = ScoreMap::new();
    let mut discarded = 0;
    for (id, score) in parsed {
        match originals.get(&id) {
            Some(ids) => {
                for original in ids {
                    resolved.insert(*original, score);
                }
            }
            None => discarded += 1,
        }
    }
    (resolved, discarded)
}
