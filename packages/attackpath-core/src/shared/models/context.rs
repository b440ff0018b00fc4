//! Execution context
//!
//! Runtime facts (source IP, time of day, user, ...) that policy conditions
//! are evaluated against. Immutable for the duration of one analysis.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Scalar context value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ContextValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl ContextValue {
    /// String cast used by string-family operators
    pub fn as_string(&self) -> String {
        match self {
            ContextValue::Bool(b) => b.to_string(),
            ContextValue::Int(i) => i.to_string(),
            ContextValue::Float(f) => f.to_string(),
            ContextValue::String(s) => s.clone(),
        }
    }

    /// Numeric cast used by numeric operators; `None` when not a number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ContextValue::Int(i) => Some(*i as f64),
            ContextValue::Float(f) => Some(*f),
            ContextValue::String(s) => s.trim().parse::<f64>().ok(),
            ContextValue::Bool(_) => None,
        }
    }

    /// Convert a JSON scalar; arrays, objects and null are rejected
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(ContextValue::Bool(*b)),
            Value::Number(n) => n
                .as_i64()
                .map(ContextValue::Int)
                .or_else(|| n.as_f64().map(ContextValue::Float)),
            Value::String(s) => Some(ContextValue::String(s.clone())),
            Value::Null | Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// Parse CLI-style text: `true`/`false`, integers, floats, else string
    pub fn parse(text: &str) -> Self {
        if let Ok(b) = text.parse::<bool>() {
            ContextValue::Bool(b)
        } else if let Ok(i) = text.parse::<i64>() {
            ContextValue::Int(i)
        } else if let Ok(f) = text.parse::<f64>() {
            ContextValue::Float(f)
        } else {
            ContextValue::String(text.to_string())
        }
    }
}

impl From<&str> for ContextValue {
    fn from(s: &str) -> Self {
        ContextValue::String(s.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(s: String) -> Self {
        ContextValue::String(s)
    }
}

impl From<i64> for ContextValue {
    fn from(i: i64) -> Self {
        ContextValue::Int(i)
    }
}

impl From<f64> for ContextValue {
    fn from(f: f64) -> Self {
        ContextValue::Float(f)
    }
}

impl From<bool> for ContextValue {
    fn from(b: bool) -> Self {
        ContextValue::Bool(b)
    }
}

/// Mapping from context key to scalar value
///
/// Null entries are dropped on deserialization; an absent key and a null
/// value are indistinguishable to condition operators.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ExecutionContext {
    values: BTreeMap<String, ContextValue>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<ContextValue>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&ContextValue> {
        self.values.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ContextValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Build from a JSON object, skipping null and non-scalar entries
    pub fn from_json(value: &Value) -> Self {
        let mut context = Self::new();
        if let Value::Object(map) = value {
            for (key, raw) in map {
                if let Some(scalar) = ContextValue::from_json(raw) {
                    context.values.insert(key.clone(), scalar);
                }
            }
        }
        context
    }
}

impl<'de> Deserialize<'de> for ExecutionContext {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        match raw {
            Value::Object(_) | Value::Null => Ok(Self::from_json(&raw)),
            other => Err(serde::de::Error::custom(format!(
                "execution context must be a mapping, found {}",
                other
            ))),
        }
    }
}

impl<K: Into<String>, V: Into<ContextValue>> FromIterator<(K, V)> for ExecutionContext {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut context = Self::new();
        for (key, value) in iter {
            context.insert(key, value);
        }
        context
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_untagged_deserialization() {
        let context: ExecutionContext = serde_json::from_value(json!({
            "source_ip": "10.0.0.5",
            "port": 443,
            "load": 0.5,
            "mfa": true
        }))
        .unwrap();

        assert_eq!(context.get("source_ip"), Some(&ContextValue::from("10.0.0.5")));
        assert_eq!(context.get("port"), Some(&ContextValue::Int(443)));
        assert_eq!(context.get("load"), Some(&ContextValue::Float(0.5)));
        assert_eq!(context.get("mfa"), Some(&ContextValue::Bool(true)));
    }

    #[test]
    fn test_string_cast() {
        assert_eq!(ContextValue::Int(443).as_string(), "443");
        assert_eq!(ContextValue::Bool(true).as_string(), "true");
        assert_eq!(ContextValue::from("x").as_string(), "x");
    }

    #[test]
    fn test_numeric_cast() {
        assert_eq!(ContextValue::from(" 12.5 ").as_f64(), Some(12.5));
        assert_eq!(ContextValue::from("abc").as_f64(), None);
        assert_eq!(ContextValue::Bool(true).as_f64(), None);
    }

    #[test]
    fn test_deserialize_drops_null() {
        let context: ExecutionContext =
            serde_json::from_value(json!({"user": null, "role": "admin"})).unwrap();
        assert_eq!(context.len(), 1);
        assert!(serde_json::from_value::<ExecutionContext>(json!([1, 2])).is_err());
    }

    #[test]
    fn test_from_json_skips_null() {
        let context = ExecutionContext::from_json(&json!({"a": null, "b": "x", "c": [1]}));
        assert_eq!(context.len(), 1);
        assert!(context.get("a").is_none());
    }

    #[test]
    fn test_parse_cli_value() {
        assert_eq!(ContextValue::parse("true"), ContextValue::Bool(true));
        assert_eq!(ContextValue::parse("22"), ContextValue::Int(22));
        assert_eq!(ContextValue::parse("1.5"), ContextValue::Float(1.5));
        assert_eq!(ContextValue::parse("10.0.0.1"), ContextValue::from("10.0.0.1"));
    }
}
