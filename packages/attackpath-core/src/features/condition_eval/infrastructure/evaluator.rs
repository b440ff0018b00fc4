//! Condition evaluator
//!
//! Total and side-effect free: a malformed key, an unsupported operator or
//! an unparsable value makes that key fail, never the caller.

use super::matchers::{glob_match, ip_in, parse_ip, truthy};
use crate::features::condition_eval::domain::{
    ConditionError, ConditionKey, ConditionOperator, OperatorFamily,
};
use crate::shared::models::{ContextValue, ExecutionContext};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Evaluates IAM-style conditions against an execution context
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    pub fn new() -> Self {
        Self
    }

    /// Decide whether `condition` holds under `context`
    ///
    /// `None`, JSON null and `{}` are vacuously satisfied. A non-mapping
    /// condition is false. Every key must hold.
    pub fn is_satisfied(&self, context: &ExecutionContext, condition: Option<&Value>) -> bool {
        match condition {
            None | Some(Value::Null) => true,
            Some(Value::Object(map)) => self.all_keys_hold(context, map),
            Some(other) => {
                debug!("Condition is not a mapping: {}", other);
                false
            }
        }
    }

    fn all_keys_hold(&self, context: &ExecutionContext, map: &Map<String, Value>) -> bool {
        map.iter().all(|(key, expected)| {
            match self.evaluate_key(context, key, expected) {
                Ok(result) => result,
                Err(err @ ConditionError::UnsupportedOperator(_)) => {
                    warn!("Condition key '{}' failed: {}", key, err);
                    false
                }
                Err(err) => {
                    debug!("Condition key '{}' failed: {}", key, err);
                    false
                }
            }
        })
    }

    /// Evaluate one `Operator:field` entry
    pub fn evaluate_key(
        &self,
        context: &ExecutionContext,
        key: &str,
        expected: &Value,
    ) -> Result<bool, ConditionError> {
        let parsed = ConditionKey::parse(key)?;
        let actual = context.get(&parsed.field);
        let expected = expected_values(parsed.operator, expected)?;
        self.apply(parsed.operator, actual, &expected)
    }

    fn apply(
        &self,
        operator: ConditionOperator,
        actual: Option<&ContextValue>,
        expected: &[String],
    ) -> Result<bool, ConditionError> {
        use ConditionOperator::*;

        match operator.family() {
            OperatorFamily::String | OperatorFamily::Arn => {
                let positive = match actual {
                    None => false,
                    Some(value) => {
                        let actual = value.as_string();
                        match operator {
                            StringEquals | StringNotEquals => {
                                expected.iter().any(|e| *e == actual)
                            }
                            StringEqualsIgnoreCase => {
                                let folded = actual.to_lowercase();
                                expected.iter().any(|e| e.to_lowercase() == folded)
                            }
                            _ => any_glob(expected, &actual)?,
                        }
                    }
                };
                Ok(positive != operator.is_negated())
            }
            OperatorFamily::Ip => {
                let value = actual.ok_or_else(|| ConditionError::InvalidValue {
                    operator: operator.to_string(),
                    value: "<missing>".to_string(),
                })?;
                let addr = parse_ip(&value.as_string())?;
                let mut positive = false;
                for spec in expected {
                    if ip_in(addr, spec)? {
                        positive = true;
                        break;
                    }
                }
                Ok(positive != operator.is_negated())
            }
            OperatorFamily::Numeric => {
                let lhs = numeric(operator, actual)?;
                let mut any = false;
                for text in expected {
                    let rhs = text.trim().parse::<f64>().map_err(|_| {
                        ConditionError::InvalidValue {
                            operator: operator.to_string(),
                            value: text.clone(),
                        }
                    })?;
                    let holds = match operator {
                        NumericEquals | NumericNotEquals => lhs == rhs,
                        NumericGreaterThan => lhs > rhs,
                        NumericGreaterThanEquals => lhs >= rhs,
                        NumericLessThan => lhs < rhs,
                        _ => lhs <= rhs,
                    };
                    if holds {
                        any = true;
                        break;
                    }
                }
                Ok(any != operator.is_negated())
            }
            // Plain lexicographic comparison of ISO-8601-like text; no calendar parsing
            OperatorFamily::Date => {
                let lhs = actual
                    .map(ContextValue::as_string)
                    .ok_or_else(|| ConditionError::InvalidValue {
                        operator: operator.to_string(),
                        value: "<missing>".to_string(),
                    })?;
                Ok(expected.iter().any(|rhs| match operator {
                    NumericDateGreaterThan => lhs.as_str() > rhs.as_str(),
                    _ => lhs.as_str() < rhs.as_str(),
                }))
            }
            OperatorFamily::Bool => {
                let lhs = actual.map(|v| truthy(&v.as_string())).unwrap_or(false);
                Ok(expected.iter().any(|rhs| truthy(rhs) == lhs))
            }
        }
    }
}

fn any_glob(patterns: &[String], candidate: &str) -> Result<bool, ConditionError> {
    for pattern in patterns {
        if glob_match(pattern, candidate)? {
            return Ok(true);
        }
    }
    Ok(false)
}

fn numeric(
    operator: ConditionOperator,
    actual: Option<&ContextValue>,
) -> Result<f64, ConditionError> {
    actual
        .and_then(ContextValue::as_f64)
        .ok_or_else(|| ConditionError::InvalidValue {
            operator: operator.to_string(),
            value: actual
                .map(ContextValue::as_string)
                .unwrap_or_else(|| "<missing>".to_string()),
        })
}

/// Flatten a scalar-or-list expected value into strings
fn expected_values(
    operator: ConditionOperator,
    expected: &Value,
) -> Result<Vec<String>, ConditionError> {
    let scalar = |value: &Value| match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(ConditionError::InvalidValue {
            operator: operator.to_string(),
            value: other.to_string(),
        }),
    };

    match expected {
        Value::Array(items) => items.iter().map(scalar).collect(),
        other => Ok(vec![scalar(other)?]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn check(context: &ExecutionContext, condition: Value) -> bool {
        ConditionEvaluator::new().is_satisfied(context, Some(&condition))
    }

    fn ctx(pairs: &[(&str, &str)]) -> ExecutionContext {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), ContextValue::from(*v)))
            .collect()
    }

    #[test]
    fn test_empty_and_null_conditions_hold() {
        let context = ctx(&[("source_ip", "10.0.0.1")]);
        let evaluator = ConditionEvaluator::new();
        assert!(evaluator.is_satisfied(&context, None));
        assert!(evaluator.is_satisfied(&context, Some(&Value::Null)));
        assert!(check(&context, json!({})));
    }

    #[test]
    fn test_non_mapping_condition_fails() {
        let context = ExecutionContext::new();
        assert!(!check(&context, json!("StringEquals")));
        assert!(!check(&context, json!(["a", "b"])));
    }

    #[test]
    fn test_bare_key_is_equality() {
        let context = ctx(&[("source_ip", "external")]);
        assert!(check(&context, json!({"source_ip": "external"})));
        assert!(!check(&context, json!({"source_ip": "internal"})));
    }

    #[test]
    fn test_string_equals_list_and_negation() {
        let context = ctx(&[("user", "alice")]);
        assert!(check(&context, json!({"StringEquals:user": ["bob", "alice"]})));
        assert!(!check(&context, json!({"StringNotEquals:user": ["bob", "alice"]})));
        assert!(check(&context, json!({"StringNotEquals:user": "bob"})));
    }

    #[test]
    fn test_missing_context_value() {
        let context = ExecutionContext::new();
        assert!(!check(&context, json!({"StringEquals:user": "alice"})));
        assert!(check(&context, json!({"StringNotEquals:user": "alice"})));
        assert!(!check(&context, json!({"IpAddress:source_ip": "10.0.0.0/8"})));
        assert!(!check(&context, json!({"NotIpAddress:source_ip": "10.0.0.0/8"})));
    }

    #[test]
    fn test_ignore_case() {
        let context = ctx(&[("role", "Admin")]);
        assert!(check(&context, json!({"StringEqualsIgnoreCase:role": "ADMIN"})));
        assert!(!check(&context, json!({"StringEquals:role": "ADMIN"})));
    }

    #[test]
    fn test_string_like_resource() {
        let context = ctx(&[("resource", "arn:aws:s3:::my-bucket/x")]);
        assert!(check(
            &context,
            json!({"StringLike:resource": "arn:aws:s3:::my-bucket/*"})
        ));
        assert!(!check(&context, json!({"StringLike:resource": "arn:aws:ec2:::*"})));
        assert!(check(&context, json!({"StringNotLike:resource": "arn:aws:ec2:::*"})));
    }

    #[test]
    fn test_arn_like() {
        let context = ctx(&[("principal", "arn:aws:iam::123456789012:role/deploy")]);
        assert!(check(
            &context,
            json!({"ArnLike:principal": "arn:aws:iam::*:role/*"})
        ));
        assert!(!check(
            &context,
            json!({"ArnNotLike:principal": "arn:aws:iam::*:role/*"})
        ));
    }

    #[test]
    fn test_ip_address_cidr() {
        let context = ctx(&[("source_ip", "192.168.1.50")]);
        assert!(check(&context, json!({"IpAddress:source_ip": "192.168.1.0/24"})));
        assert!(!check(&context, json!({"IpAddress:source_ip": "10.0.0.0/8"})));
        assert!(check(&context, json!({"NotIpAddress:source_ip": "10.0.0.0/8"})));
        assert!(check(
            &context,
            json!({"IpAddress:source_ip": ["10.0.0.0/8", "192.168.1.50"]})
        ));
    }

    #[test]
    fn test_ip_parse_errors_fail_both_variants() {
        let context = ctx(&[("source_ip", "external")]);
        assert!(!check(&context, json!({"IpAddress:source_ip": "10.0.0.0/8"})));
        assert!(!check(&context, json!({"NotIpAddress:source_ip": "10.0.0.0/8"})));
    }

    #[test]
    fn test_numeric_operators() {
        let context = ExecutionContext::new().with("age", 30i64);
        assert!(check(&context, json!({"NumericGreaterThan:age": "18"})));
        assert!(check(&context, json!({"NumericGreaterThanEquals:age": 30})));
        assert!(check(&context, json!({"NumericLessThan:age": 31.5})));
        assert!(check(&context, json!({"NumericLessThanEquals:age": "30"})));
        assert!(check(&context, json!({"NumericEquals:age": "30.0"})));
        assert!(check(&context, json!({"NumericNotEquals:age": "29"})));
        assert!(!check(&context, json!({"NumericGreaterThan:age": "40"})));
    }

    #[test]
    fn test_numeric_non_numeric_is_false() {
        let context = ctx(&[("age", "thirty")]);
        assert!(!check(&context, json!({"NumericGreaterThan:age": "18"})));
        assert!(!check(&context, json!({"NumericNotEquals:age": "18"})));
        let context = ExecutionContext::new().with("age", 30i64);
        assert!(!check(&context, json!({"NumericEquals:age": "abc"})));
    }

    #[test]
    fn test_date_comparison_is_lexicographic() {
        let context = ctx(&[("current_time", "2024-06-01T12:00:00Z")]);
        assert!(check(
            &context,
            json!({"NumericDateGreaterThan:current_time": "2024-01-01T00:00:00Z"})
        ));
        assert!(check(
            &context,
            json!({"NumericDateLessThan:current_time": "2025-01-01"})
        ));
        assert!(!check(
            &context,
            json!({"NumericDateLessThan:current_time": "2024-01-01"})
        ));
    }

    #[test]
    fn test_bool_normalization() {
        let context = ctx(&[("mfa", "YES")]);
        assert!(check(&context, json!({"Bool:mfa": "true"})));
        assert!(check(&context, json!({"Bool:mfa": true})));
        assert!(!check(&context, json!({"Bool:mfa": "false"})));

        let context = ExecutionContext::new().with("mfa", false);
        assert!(check(&context, json!({"Bool:mfa": "0"})));

        let empty = ExecutionContext::new();
        assert!(check(&empty, json!({"Bool:mfa": false})));
    }

    #[test]
    fn test_unknown_operator_fails_closed() {
        let context = ctx(&[("user", "alice")]);
        assert!(!check(&context, json!({"RegexMatch:user": "alice"})));
        assert!(!check(
            &context,
            json!({"StringEquals:user": "alice", "Frobnicate:user": "alice"})
        ));
    }

    #[test]
    fn test_multi_colon_key_fails() {
        let mut context = ExecutionContext::new();
        context.insert("aws:username", "alice");
        assert!(!check(&context, json!({"StringEquals:aws:username": "alice"})));
    }

    #[test]
    fn test_all_keys_must_hold() {
        let context = ctx(&[("source_ip", "10.0.0.5"), ("user", "alice")]);
        assert!(check(
            &context,
            json!({"IpAddress:source_ip": "10.0.0.0/8", "StringEquals:user": "alice"})
        ));
        assert!(!check(
            &context,
            json!({"IpAddress:source_ip": "10.0.0.0/8", "StringEquals:user": "bob"})
        ));
    }

    #[test]
    fn test_object_expected_value_fails() {
        let context = ctx(&[("user", "alice")]);
        assert!(!check(&context, json!({"StringEquals:user": {"nested": 1}})));
    }
}
