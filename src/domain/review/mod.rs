//! Review module - scoring inputs and outputs.

mod analysis_result;
mod review;
mod score_map;

pub use analysis_result::{AnalysisResult, DispatchMode, DispatchSummary};
pub use review::{Review, ReviewMeta};
pub use score_map::ScoreMap;
