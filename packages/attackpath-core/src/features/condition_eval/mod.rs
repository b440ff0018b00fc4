//! Condition Evaluation
//!
//! Decides whether an IAM-style condition attached to a permission edge holds
//! under an execution context.
//!
//! ```text
//! {"IpAddress:source_ip": "10.0.0.0/8", "Bool:mfa": "true"}
//!        │                    │
//!   ConditionKey::parse   expected value(s)
//!        │                    │
//!        └──── ConditionEvaluator::evaluate_key ──► bool (AND over keys)
//! ```
//!
//! Operators form a closed set (`ConditionOperator`); anything outside it
//! fails closed.

pub mod domain;
pub mod infrastructure;

pub use domain::{ConditionError, ConditionKey, ConditionOperator, OperatorFamily};
pub use infrastructure::ConditionEvaluator;
