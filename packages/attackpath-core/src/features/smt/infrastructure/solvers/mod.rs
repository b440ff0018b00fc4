//! SMT Solver Implementations
//!
//! 1. **SymbolicSolver**: built-in bounded search over the policy fragment
//!    (string equality/prefix, integer comparison, booleans). Default.
//! 2. **Z3Backend**: full SMT solver (optional, feature-gated)

use crate::features::smt::domain::{Model, SymExpr, VerificationError, VerificationResult};
use std::sync::Arc;
use std::time::Duration;

pub mod symbolic;

#[cfg(feature = "z3")]
pub mod z3_backend;

pub use symbolic::SymbolicSolver;

#[cfg(feature = "z3")]
pub use z3_backend::Z3Backend;

/// Resource bounds for one `check`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SolverLimits {
    /// Wall-clock budget
    pub timeout: Duration,
    /// Search nodes the built-in solver may expand
    pub max_search_nodes: usize,
}

impl SolverLimits {
    pub fn new(timeout: Duration, max_search_nodes: usize) -> Self {
        Self {
            timeout,
            max_search_nodes,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout = Duration::from_millis(timeout_ms);
        self
    }
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(5_000),
            max_search_nodes: 100_000,
        }
    }
}

/// Solver capability trait
///
/// Each call is independent: backends keep no state between checks.
pub trait SolverBackend: Send + Sync {
    /// Name of this solver
    fn name(&self) -> &'static str;

    /// Decide the conjunction of `assertions` within `limits`
    fn check(
        &self,
        assertions: &[SymExpr],
        limits: &SolverLimits,
    ) -> Result<SolverResult, VerificationError>;
}

/// Solver result
#[derive(Debug, Clone, PartialEq)]
pub enum SolverResult {
    /// Satisfiable (with optional model/assignment)
    Sat(Option<Model>),

    /// Unsatisfiable (contradiction)
    Unsat,

    /// Unknown (timeout, too complex, unsupported)
    Unknown,
}

impl SolverResult {
    pub fn is_sat(&self) -> bool {
        matches!(self, SolverResult::Sat(_))
    }

    /// sat / unsat / unknown → Exploitable / Blocked / Unknown
    pub fn to_verdict(&self) -> VerificationResult {
        match self {
            SolverResult::Sat(_) => VerificationResult::Exploitable,
            SolverResult::Unsat => VerificationResult::Blocked,
            SolverResult::Unknown => VerificationResult::Unknown,
        }
    }
}

/// Backend used when none is configured
pub fn default_backend() -> Arc<dyn SolverBackend> {
    Arc::new(SymbolicSolver::new())
}
