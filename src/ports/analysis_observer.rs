//! Analysis Observer Port - structured operational events from a scoring run.
//!
//! The dispatcher never logs directly. It reports what happened to an
//! injected observer, which decides whether the event becomes a log line,
//! a metric, or a test assertion.

use std::time::Duration;
use uuid::Uuid;

use crate::domain::review::DispatchMode;
use crate::domain::scoring::ParseStage;

/// Operational event emitted during dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnalysisEvent {
    DispatchStarted {
        run_id: Uuid,
        mode: DispatchMode,
        review_count: usize,
        chunk_count: usize,
    },
    ChunkStarted {
        run_id: Uuid,
        chunk_index: usize,
        review_count: usize,
        max_tokens: u32,
    },
    ChunkCompleted {
        run_id: Uuid,
        chunk_index: usize,
        scored: usize,
        stage: ParseStage,
        /// Provider stopped at `max_tokens`.
        truncated: bool,
    },
    ChunkFailed {
        run_id: Uuid,
        chunk_index: usize,
        /// Error class, e.g. `network` or `rate_limited`.
        kind: &'static str,
        error: String,
    },
    RetryScheduled {
        run_id: Uuid,
        attempt: u32,
        delay: Duration,
        kind: &'static str,
    },
    /// The model returned ids that were not in the chunk it was sent.
    UnknownIdsDiscarded {
        run_id: Uuid,
        chunk_index: usize,
        discarded: usize,
    },
    ScoreCollisions {
        run_id: Uuid,
        collisions: usize,
    },
    DispatchCompleted {
        run_id: Uuid,
        scored: usize,
        unscored: usize,
        chunks_failed: usize,
        elapsed: Duration,
    },
}

impl AnalysisEvent {
    /// Stable event name for log routing.
    pub fn name(&self) -> &'static str {
        match self {
            AnalysisEvent::DispatchStarted { .. } => "scoring.dispatch_started",
            AnalysisEvent::ChunkStarted { .. } => "scoring.chunk_started",
            AnalysisEvent::ChunkCompleted { .. } => "scoring.chunk_completed",
            AnalysisEvent::ChunkFailed { .. } => "scoring.chunk_failed",
            AnalysisEvent::RetryScheduled { .. } => "scoring.retry_scheduled",
            AnalysisEvent::UnknownIdsDiscarded { .. } => "scoring.unknown_ids_discarded",
            AnalysisEvent::ScoreCollisions { .. } => "scoring.score_collisions",
            AnalysisEvent::DispatchCompleted { .. } => "scoring.dispatch_completed",
        }
    }
}

/// Sink for analysis events.
pub trait AnalysisObserver: Send + Sync {
    /// Called synchronously from the dispatching task; must not block.
    fn on_event(&self, event: AnalysisEvent);
}

/// No-op observer for when event tracking isn't needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl AnalysisObserver for NoOpObserver {
    fn on_event(&self, _event: AnalysisEvent) {}
}
