//! Condition evaluation infrastructure

pub mod evaluator;
pub mod matchers;

pub use evaluator::ConditionEvaluator;
