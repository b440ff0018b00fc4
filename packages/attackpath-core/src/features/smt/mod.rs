//! SMT Verification
//!
//! Formal check of whether an attack path is exploitable under a policy set
//! and execution context.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │ Domain Layer                            │
//! │  - SymExpr / SymVar (constraints)       │
//! │  - PolicyStatement / PolicyCondition    │
//! │  - ProofResult / VerificationResult     │
//! └─────────────────────────────────────────┘
//!                   ▲
//!                   │
//! ┌─────────────────────────────────────────┐
//! │ Infrastructure Layer                    │
//! │  - ConstraintCompiler (policy → expr)   │
//! │  - SymbolicSolver / Z3Backend           │
//! │  - PathVerifier (verdicts, batches)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! sat → Exploitable, unsat → Blocked, timeout or failure → Unknown.
//!
//! # Example
//!
//! ```rust,ignore
//! use attackpath_core::features::smt::{PathVerifier, PolicyStatement};
//!
//! let verifier = PathVerifier::new();
//! let proof = verifier.verify_path_exploitability(&path, &policies, &context, 5_000);
//! println!("{}: {}", proof.result, proof.explanation);
//! ```

pub mod domain;
pub mod infrastructure;

pub use domain::{
    ComparisonOp, Effect, Model, ModelValue, PolicyCondition, PolicyStatement, ProofResult, Sort,
    SymExpr, SymVar, VerificationError, VerificationResult, VerificationSummary,
};
pub use infrastructure::{
    policies_for_path, ConstraintCompiler, NamedConstraint, PathVerifier, SolverBackend,
    SolverLimits, SolverResult, SymbolicSolver,
};

#[cfg(feature = "z3")]
pub use infrastructure::Z3Backend;
