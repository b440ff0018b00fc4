//! Attack Path Analysis
//!
//! Bounded-depth path discovery over a `PolicyGraph`, filtered by
//! `ConditionEvaluator` against one execution context.
//!
//! ```text
//! PolicyGraph ──► PathAnalyzer::find_attack_paths ──► Vec<AttackPath>
//!                      │  (simple paths, ≤ max_depth edges,
//!                      │   IAM steps must satisfy their condition)
//!                      ├─► explain_path  (one line per step)
//!                      ├─► score_path    (0..=100 heuristic)
//!                      └─► get_metrics / clear_cache
//! ```

pub mod domain;
pub mod infrastructure;

pub use domain::{AnalysisMetrics, ScoredPath};
pub use infrastructure::PathAnalyzer;
