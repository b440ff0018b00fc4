//! Policy → constraint compiler
//!
//! Translates policy statements plus an execution context into one
//! conjunction of `SymExpr` assertions over variables keyed by the
//! (lowercased) condition key.
//!
//! Wildcards and CIDRs are approximated by string prefixes:
//!
//! - `StringLike` / `ArnLike` keep only the text before the first wildcard
//! - `IpAddress` keeps the CIDR's leading whole octets (`10.0.0.0/8` → `10.`)
//!
//! Exact glob and subnet semantics stay with `ConditionEvaluator`; this
//! model over-approximates what a pattern admits.
//!
//! Operators outside the compiled subset emit nothing (fail-open) and are
//! logged. See the design notes before changing that.

use super::solvers::{SolverBackend, SolverLimits, SolverResult};
use crate::features::condition_eval::ConditionOperator;
use crate::features::smt::domain::{
    ComparisonOp, Effect, PolicyCondition, PolicyStatement, SymExpr, VerificationError,
};
use crate::shared::models::{ContextValue, ExecutionContext};

/// Variable all IP conditions constrain
pub const SOURCE_IP_VAR: &str = "source_ip";

/// Condition keys recognised as the caller's source address
const SOURCE_IP_KEYS: [&str; 2] = ["aws:sourceip", "source_ip"];

/// Emitted constraint with its identifier (`Operator:key`)
#[derive(Debug, Clone, PartialEq)]
pub struct NamedConstraint {
    pub name: String,
    pub expr: SymExpr,
}

#[derive(Debug, Default)]
pub struct ConstraintCompiler {
    assertions: Vec<SymExpr>,
    constraints: Vec<NamedConstraint>,
    skipped: Vec<String>,
}

impl ConstraintCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile one condition; `Ok(None)` when the operator is not modeled
    pub fn condition_to_constraint(
        &self,
        condition: &PolicyCondition,
    ) -> Result<Option<SymExpr>, VerificationError> {
        let key = condition.key.trim().to_lowercase();
        let values = condition.string_values();

        let Some(operator) = ConditionOperator::from_name(condition.operator.trim()) else {
            tracing::warn!(
                "Unknown operator '{}' on '{}': no constraint emitted",
                condition.operator,
                key
            );
            return Ok(None);
        };

        let expr = match operator {
            ConditionOperator::StringEquals => string_equals(&key, &values),
            ConditionOperator::StringNotEquals => SymExpr::not(string_equals(&key, &values)),
            ConditionOperator::StringLike => SymExpr::or(
                values
                    .iter()
                    .map(|pattern| string_like(&key, pattern))
                    .collect(),
            ),
            ConditionOperator::ArnLike => SymExpr::or(
                values
                    .iter()
                    .map(|pattern| arn_like(&key, pattern))
                    .collect(),
            ),
            ConditionOperator::IpAddress | ConditionOperator::NotIpAddress => {
                if !SOURCE_IP_KEYS.contains(&key.as_str()) {
                    tracing::warn!(
                        "{} on non source-ip key '{}': no constraint emitted",
                        operator,
                        key
                    );
                    return Ok(None);
                }
                let positive = SymExpr::or(
                    values
                        .iter()
                        .map(|cidr| SymExpr::str_prefix(SOURCE_IP_VAR, cidr_prefix(cidr)))
                        .collect(),
                );
                if operator == ConditionOperator::IpAddress {
                    positive
                } else {
                    SymExpr::not(positive)
                }
            }
            ConditionOperator::NumericGreaterThan
            | ConditionOperator::NumericLessThan
            | ConditionOperator::NumericEquals => {
                let threshold = threshold(operator, &key, &values)?;
                let op = match operator {
                    ConditionOperator::NumericGreaterThan => ComparisonOp::Gt,
                    ConditionOperator::NumericLessThan => ComparisonOp::Lt,
                    _ => ComparisonOp::Eq,
                };
                SymExpr::int_cmp(key.as_str(), op, threshold)
            }
            // A constant: the condition's own literal decides it
            ConditionOperator::Bool => SymExpr::Const(
                values
                    .first()
                    .map(|v| matches!(v.trim().to_lowercase().as_str(), "true" | "1"))
                    .unwrap_or(false),
            ),
            other => {
                tracing::warn!(
                    "Operator {} is not modeled symbolically: no constraint emitted for '{}'",
                    other,
                    key
                );
                return Ok(None);
            }
        };

        Ok(Some(expr))
    }

    /// Add every statement: Allow asserts its conditions, Deny their negation
    ///
    /// Statements without compiled conditions add nothing.
    pub fn add_policy_constraints(
        &mut self,
        policies: &[PolicyStatement],
    ) -> Result<(), VerificationError> {
        for policy in policies {
            let mut statement = Vec::with_capacity(policy.conditions.len());
            for condition in &policy.conditions {
                match self.condition_to_constraint(condition)? {
                    Some(expr) => {
                        self.constraints.push(NamedConstraint {
                            name: constraint_name(condition),
                            expr: expr.clone(),
                        });
                        statement.push(expr);
                    }
                    None => self.skipped.push(constraint_name(condition)),
                }
            }

            if statement.is_empty() {
                continue;
            }
            let combined = SymExpr::and(statement);
            let clause = match policy.effect {
                Effect::Allow => combined,
                Effect::Deny => SymExpr::not(combined),
            };
            tracing::debug!("Added {:?} constraint: {}", policy.effect, clause);
            self.assertions.push(clause);
        }
        Ok(())
    }

    /// Bind context values as hard equalities
    ///
    /// Strings bind string variables, integers (and integral floats) bind
    /// integer variables, booleans bind boolean variables.
    pub fn add_execution_context(&mut self, context: &ExecutionContext) {
        for (key, value) in context.iter() {
            let var = key.to_lowercase();
            let assertion = match value {
                ContextValue::String(s) => SymExpr::str_eq(var, s.as_str()),
                ContextValue::Int(i) => SymExpr::int_cmp(var, ComparisonOp::Eq, *i),
                ContextValue::Float(f) if f.fract() == 0.0 && f.is_finite() => {
                    SymExpr::int_cmp(var, ComparisonOp::Eq, *f as i64)
                }
                ContextValue::Float(f) => {
                    tracing::debug!("Context '{}' = {} is not integral; not bound", key, f);
                    continue;
                }
                ContextValue::Bool(b) => SymExpr::bool_eq(var, *b),
            };
            tracing::debug!("Added context: {}", assertion);
            self.assertions.push(assertion);
        }
    }

    /// Decide the assertions on `backend` within `limits`
    pub fn verify_satisfiable(
        &self,
        backend: &dyn SolverBackend,
        limits: &SolverLimits,
    ) -> Result<SolverResult, VerificationError> {
        backend.check(&self.assertions, limits)
    }

    pub fn assertions(&self) -> &[SymExpr] {
        &self.assertions
    }

    pub fn constraints(&self) -> &[NamedConstraint] {
        &self.constraints
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Identifiers of the emitted condition constraints, in order
    pub fn constraint_names(&self) -> Vec<String> {
        self.constraints.iter().map(|c| c.name.clone()).collect()
    }

    /// Conditions that produced no constraint
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }
}

fn constraint_name(condition: &PolicyCondition) -> String {
    let operator = ConditionOperator::from_name(condition.operator.trim())
        .map(|op| op.as_str().to_string())
        .unwrap_or_else(|| condition.operator.trim().to_string());
    format!("{}:{}", operator, condition.key.trim().to_lowercase())
}

fn string_equals(key: &str, values: &[String]) -> SymExpr {
    SymExpr::or(values.iter().map(|v| SymExpr::str_eq(key, v.as_str())).collect())
}

/// Prefix before the first wildcard, or equality when there is none
/// Text before the first `*`; a `?`-only pattern is kept whole as the prefix
fn string_like(key: &str, pattern: &str) -> SymExpr {
    match pattern.find('*') {
        Some(at) => SymExpr::str_prefix(key, &pattern[..at]),
        None if pattern.contains('?') => SymExpr::str_prefix(key, pattern),
        None => SymExpr::str_eq(key, pattern),
    }
}

fn arn_like(key: &str, pattern: &str) -> SymExpr {
    match pattern.find('*') {
        Some(at) => SymExpr::str_prefix(key, &pattern[..at]),
        None => SymExpr::str_eq(key, pattern),
    }
}

/// Leading whole octets of an IPv4 CIDR (`192.168.0.0/16` → `192.168.`)
///
/// Bare addresses, IPv6 and malformed lengths keep the whole address text.
fn cidr_prefix(cidr: &str) -> String {
    let cidr = cidr.trim();
    let Some((address, length)) = cidr.split_once('/') else {
        return cidr.to_string();
    };
    let octets: Vec<&str> = address.split('.').collect();
    match length.parse::<usize>() {
        Ok(bits) if octets.len() == 4 && bits <= 32 => {
            let keep = bits / 8;
            if keep == 4 {
                address.to_string()
            } else {
                octets[..keep].iter().map(|o| format!("{}.", o)).collect()
            }
        }
        _ => address.to_string(),
    }
}

/// First value as an integer; no values means 0
fn threshold(
    operator: ConditionOperator,
    key: &str,
    values: &[String],
) -> Result<i64, VerificationError> {
    let Some(first) = values.first() else {
        return Ok(0);
    };
    let text = first.trim();
    text.parse::<i64>()
        .ok()
        .or_else(|| {
            text.parse::<f64>()
                .ok()
                .filter(|f| f.fract() == 0.0 && f.is_finite())
                .map(|f| f as i64)
        })
        .ok_or_else(|| VerificationError::Compile {
            operator: operator.to_string(),
            key: key.to_string(),
            reason: format!("'{}' is not an integer", text),
        })
}
