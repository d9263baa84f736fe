//! Result aggregator - merges per-chunk score maps.

use crate::domain::review::ScoreMap;

/// Merged scores plus the number of ids that appeared in more than one chunk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeReport {
    pub scores: ScoreMap,
    pub collisions: usize,
}

/// Unions chunk maps in iteration order; on collision the later chunk wins.
pub fn merge(chunk_maps: impl IntoIterator<Item = ScoreMap>) -> ScoreMap {
    merge_reporting(chunk_maps).scores
}

/// Like [`merge`], also counting collisions.
///
/// Chunks partition the input so collisions should not happen, but nothing
/// upstream enforces that.
pub fn merge_reporting(chunk_maps: impl IntoIterator<Item = ScoreMap>) -> MergeReport {
    chunk_maps
        .into_iter()
        .fold(MergeReport::default(), |mut report, chunk| {
            report.collisions += report.scores.merge(chunk);
            report
        })
}
