/*
 * Attackpath Core - Attack Path Discovery & Verification Engine
 *
 * Feature-First Hexagonal Architecture:
 * - shared/      : Common models (Asset, PolicyEdge, ExecutionContext, AttackPath)
 * - features/    : Vertical slices (policy_graph → path_analysis → smt → threat_scoring)
 * - config/      : Presets + YAML/JSON configuration
 *
 * Performance:
 * - Rayon work-stealing for independent queries and batch verification
 * - Per-(source, target) path cache behind a parking_lot lock
 */

// Crate-level lint configuration
#![allow(clippy::too_many_arguments)] // Scoring inputs mirror the public API
#![allow(clippy::should_implement_trait)] // from_str naming intentional
#![allow(clippy::module_inception)] // Module naming intentional

// ═══════════════════════════════════════════════════════════════════════════
// Module Exports - Feature-First Architecture
// ═══════════════════════════════════════════════════════════════════════════

/// Shared models
pub mod shared;

/// Feature modules
pub mod features;

/// Configuration system
pub mod config;

/// Error types
pub mod errors;

// ═══════════════════════════════════════════════════════════════════════════
// Re-exports for Public API
// ═══════════════════════════════════════════════════════════════════════════

pub use config::{AnalysisConfig, Preset};
pub use errors::{AttackPathError, Result};
pub use shared::models::{
    Asset, AttackPath, ContextValue, Criticality, EdgeKind, ExecutionContext, PolicyEdge,
};

pub use features::condition_eval::ConditionEvaluator;
pub use features::path_analysis::{AnalysisMetrics, PathAnalyzer, ScoredPath};
pub use features::policy_graph::{
    CachedGraphProvider, GraphBuildError, GraphDocument, GraphProvider, PolicyGraph,
    PolicyGraphBuilder, StaticGraphProvider,
};
pub use features::smt::{
    PathVerifier, PolicyCondition, PolicyStatement, ProofResult, VerificationResult,
    VerificationSummary,
};
pub use features::threat_scoring::{
    CvssCalculator, PathScoreInput, PathThreatScore, ThreatAssessment, ThreatLevel, ThreatScorer,
};
