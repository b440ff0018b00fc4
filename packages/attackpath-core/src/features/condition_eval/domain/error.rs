//! Condition evaluation errors
//!
//! Contained inside the evaluator: every variant turns the offending key
//! into `false`.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConditionError {
    /// Malformed condition shape or key
    #[error("Invalid condition: {0}")]
    InvalidCondition(String),

    /// Operator outside the supported set
    #[error("Unsupported operator: {0}")]
    UnsupportedOperator(String),

    /// A value that cannot be cast for the operator family
    #[error("Invalid value for {operator}: {value}")]
    InvalidValue { operator: String, value: String },

    /// Glob pattern failed to compile
    #[error("Invalid pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}
