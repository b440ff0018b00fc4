//! SMT Domain Models
//!
//! Constraint language, policy statements and verification verdicts.

pub mod error;
pub mod expr;
pub mod policy;
pub mod proof;

pub use error::VerificationError;
pub use expr::{ComparisonOp, Sort, SymExpr, SymVar};
pub use policy::{Effect, PolicyCondition, PolicyStatement};
pub use proof::{Model, ModelValue, ProofResult, VerificationResult, VerificationSummary};
