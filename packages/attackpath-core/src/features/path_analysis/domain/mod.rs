//! Path analysis domain models

use crate::shared::models::AttackPath;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Running analyzer counters
///
/// `total_paths_found`, `paths_pruned` and `evaluation_time` are cumulative
/// over the analyzer's lifetime; cache hits do not move them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisMetrics {
    pub total_paths_found: u64,
    pub paths_pruned: u64,
    pub evaluation_time: Duration,
    pub cache_size: usize,
    pub cache_hits: u64,
}

impl AnalysisMetrics {
    pub fn evaluation_time_ms(&self) -> f64 {
        self.evaluation_time.as_secs_f64() * 1000.0
    }
}

/// Path with its heuristic risk score (0..=100)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPath {
    pub path: AttackPath,
    pub score: f64,
}

/// Scoring constants for `PathAnalyzer::score_path`
pub mod scoring {
    pub const BASE: f64 = 10.0;
    pub const MAX_LENGTH_BONUS: f64 = 25.0;
    /// Length bonus lost per node beyond the first two
    pub const LENGTH_PENALTY_PER_NODE: f64 = 5.0;
    pub const IAM_STEP: f64 = 5.0;
    pub const CONDITIONED_IAM_STEP: f64 = 3.0;
    pub const MAX_SCORE: f64 = 100.0;
}
