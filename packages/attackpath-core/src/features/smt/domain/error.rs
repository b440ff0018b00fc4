//! Verification-layer errors
//!
//! Never escape `PathVerifier`: every variant becomes an `Unknown` verdict.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum VerificationError {
    /// A condition that cannot be turned into a constraint
    #[error("Cannot compile {operator} condition on '{key}': {reason}")]
    Compile {
        operator: String,
        key: String,
        reason: String,
    },

    /// The solver backend failed
    #[error("Solver backend error: {0}")]
    Backend(String),

    /// The backend panicked
    #[error("Solver crashed: {0}")]
    Internal(String),
}
