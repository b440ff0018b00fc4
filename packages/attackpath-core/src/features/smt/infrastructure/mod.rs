//! SMT Infrastructure
//!
//! Constraint compilation, solver backends and the path verifier.

pub mod compiler;
pub mod path_policies;
pub mod solvers;
pub mod verifier;

pub use compiler::{ConstraintCompiler, NamedConstraint};
pub use path_policies::policies_for_path;
pub use solvers::{SolverBackend, SolverLimits, SolverResult, SymbolicSolver};
pub use verifier::PathVerifier;

#[cfg(feature = "z3")]
pub use solvers::Z3Backend;
