//! AnalysisResult - the externally visible output of a scoring run.

use serde::{Deserialize, Serialize};

use super::ScoreMap;
use crate::domain::scoring::ParseStage;

/// How a batch was sent upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    /// Empty input; nothing was sent.
    #[default]
    Skipped,
    /// One inline request with retry.
    Single,
    /// Concurrent fixed-size chunks.
    Chunked,
}

/// Operational detail about a run. Not part of the serialized result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    pub mode: DispatchMode,
    pub chunks_total: usize,
    pub chunks_failed: usize,
    /// Extraction stage of each answered request, in chunk order.
    pub parse_stages: Vec<ParseStage>,
    /// Input ids for which no score was obtained, in input order.
    pub unscored_ids: Vec<String>,
}

/// Scores for a batch of reviews. Ids absent from `detailed_scores` are undetermined.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub detailed_scores: ScoreMap,
    #[serde(skip)]
    pub summary: DispatchSummary,
}

impl AnalysisResult {
    pub fn new(detailed_scores: ScoreMap, summary: DispatchSummary) -> Self {
        Self {
            detailed_scores,
            summary,
        }
    }

    /// Returns true if every submitted review received a score.
    pub fn is_complete(&self) -> bool {
        self.summary.unscored_ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_only_detailed_scores() {
        let mut scores = ScoreMap::new();
        scores.insert("r1", 42);
        let result = AnalysisResult::new(
            scores,
            DispatchSummary {
                mode: DispatchMode::Single,
                chunks_total: 1,
                chunks_failed: 0,
                parse_stages: vec![ParseStage::Strict],
                unscored_ids: vec!["r2".to_string()],
            },
        );

        let json = serde_json::to_string(&result).unwrap();

        assert_eq!(json, r#"{"detailed_scores":{"r1":42}}"#);
        assert!(!result.is_complete());
    }

    #[test]
    fn dispatch_mode_serializes_snake_case() {
        let json = serde_json::to_string(&DispatchMode::Chunked).unwrap();
        assert_eq!(json, "\"chunked\"");
    }
}
