//! TracingObserver - forwards analysis events to `tracing`.

use tracing::{debug, info, warn};

use crate::ports::{AnalysisEvent, AnalysisObserver};

/// Observer that emits each analysis event as a structured `tracing` event.
///
/// Chunk lifecycle goes to `debug`, run boundaries to `info`, anything that
/// lost or altered scores to `warn`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl TracingObserver {
    pub fn new() -> Self {
        Self
    }
}

impl AnalysisObserver for TracingObserver {
    fn on_event(&self, event: AnalysisEvent) {
        let name = event.name();
        match event {
            AnalysisEvent::DispatchStarted {
                run_id,
                mode,
                review_count,
                chunk_count,
            } => info!(
                event = name,
                %run_id,
                mode = ?mode,
                review_count,
                chunk_count,
                "Dispatching reviews for scoring"
            ),
            AnalysisEvent::ChunkStarted {
                run_id,
                chunk_index,
                review_count,
                max_tokens,
            } => debug!(
                event = name,
                %run_id,
                chunk_index,
                review_count,
                max_tokens,
                "Chunk request sent"
            ),
            AnalysisEvent::ChunkCompleted {
                run_id,
                chunk_index,
                scored,
                stage,
                truncated,
            } => debug!(
                event = name,
                %run_id,
                chunk_index,
                scored,
                stage = stage.as_str(),
                truncated,
                "Chunk scored"
            ),
            AnalysisEvent::ChunkFailed {
                run_id,
                chunk_index,
                kind,
                error,
            } => warn!(
                event = name,
                %run_id,
                chunk_index,
                kind,
                error = %error,
                "Chunk request failed; its reviews stay unscored"
            ),
            AnalysisEvent::RetryScheduled {
                run_id,
                attempt,
                delay,
                kind,
            } => warn!(
                event = name,
                %run_id,
                attempt,
                delay_ms = delay.as_millis() as u64,
                kind,
                "Retrying scoring request"
            ),
            AnalysisEvent::UnknownIdsDiscarded {
                run_id,
                chunk_index,
                discarded,
            } => warn!(
                event = name,
                %run_id,
                chunk_index,
                discarded,
                "Model returned ids that were not in the chunk"
            ),
            AnalysisEvent::ScoreCollisions { run_id, collisions } => warn!(
                event = name,
                %run_id,
                collisions,
                "Duplicate review ids across chunks; later chunk kept"
            ),
            AnalysisEvent::DispatchCompleted {
                run_id,
                scored,
                unscored,
                chunks_failed,
                elapsed,
            } => info!(
                event = name,
                %run_id,
                scored,
                unscored,
                chunks_failed,
                elapsed_ms = elapsed.as_millis() as u64,
                "Scoring finished"
            ),
        }
    }
}
