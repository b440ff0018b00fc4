//! Feature modules - Each feature follows Hexagonal Architecture
//!
//! Each feature contains:
//! - domain/         - Pure models and errors
//! - infrastructure/ - Implementations (graph, evaluator, solver, scorer)
//!
//! Pipeline order:
//! policy_graph → path_analysis (uses condition_eval) → smt → threat_scoring

pub mod condition_eval;
pub mod path_analysis;
pub mod policy_graph;
pub mod smt;
pub mod threat_scoring;
