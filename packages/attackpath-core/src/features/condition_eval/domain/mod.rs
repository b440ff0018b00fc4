//! Condition evaluation domain models

pub mod error;
pub mod operator;

pub use error::ConditionError;
pub use operator::{ConditionKey, ConditionOperator, OperatorFamily};
