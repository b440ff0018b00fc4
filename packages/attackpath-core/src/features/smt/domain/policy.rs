//! Policy statements fed to the constraint compiler

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Effect {
    #[default]
    #[serde(alias = "allow", alias = "ALLOW")]
    Allow,
    #[serde(alias = "deny", alias = "DENY")]
    Deny,
}

/// One `{operator, key, values}` triple
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyCondition {
    pub operator: String,
    pub key: String,
    #[serde(default, deserialize_with = "one_or_many")]
    pub values: Vec<Value>,
}

impl PolicyCondition {
    pub fn new(
        operator: impl Into<String>,
        key: impl Into<String>,
        values: impl IntoIterator<Item = impl Into<Value>>,
    ) -> Self {
        Self {
            operator: operator.into(),
            key: key.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Values cast to text; nested arrays/objects are skipped
    pub fn string_values(&self) -> Vec<String> {
        self.values
            .iter()
            .filter_map(|value| match value {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                Value::Bool(b) => Some(b.to_string()),
                _ => None,
            })
            .collect()
    }
}

/// Effect plus the conditions under which it applies
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PolicyStatement {
    #[serde(default)]
    pub effect: Effect,

    #[serde(default)]
    pub conditions: Vec<PolicyCondition>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl PolicyStatement {
    pub fn allow(conditions: Vec<PolicyCondition>) -> Self {
        Self {
            effect: Effect::Allow,
            conditions,
            name: None,
        }
    }

    pub fn deny(conditions: Vec<PolicyCondition>) -> Self {
        Self {
            effect: Effect::Deny,
            conditions,
            name: None,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Unconditional allow, for callers with no policy set to verify against
    pub fn fallback_allow() -> Vec<PolicyStatement> {
        vec![PolicyStatement::allow(Vec::new()).named("fallback-allow")]
    }

    /// Convert an edge condition mapping (`{"Operator:key": values}`)
    ///
    /// Bare keys become `StringEquals`. Only the first colon separates the
    /// operator, so `StringEquals:aws:username` keeps `aws:username` as key.
    pub fn from_condition_map(effect: Effect, condition: &Value) -> Self {
        let conditions = match condition {
            Value::Object(map) => map
                .iter()
                .map(|(qualified, values)| {
                    let (operator, key) = qualified
                        .split_once(':')
                        .unwrap_or(("StringEquals", qualified.as_str()));
                    PolicyCondition {
                        operator: operator.to_string(),
                        key: key.to_string(),
                        values: flatten(values),
                    }
                })
                .collect(),
            _ => Vec::new(),
        };
        Self {
            effect,
            conditions,
            name: None,
        }
    }
}

fn flatten(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items.clone(),
        Value::Null => Vec::new(),
        other => vec![other.clone()],
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(flatten(&Value::deserialize(deserializer)?))
}
