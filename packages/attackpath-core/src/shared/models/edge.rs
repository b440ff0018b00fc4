//! Policy edge types
//!
//! Edges are directed. Several edges may join the same ordered pair
//! (e.g. a firewall rule and an IAM grant); they are kept as parallel edges.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Edge kind discriminant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Network reachability (allow rule)
    Network,
    /// IAM permission grant
    Iam,
}

impl EdgeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::Iam => "iam",
        }
    }
}

/// Edge payload, tagged by kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PolicyEdge {
    /// Existence of the edge implies allow; fields are display metadata
    Network {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        rule_name: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        protocol: Option<String>,
        #[serde(
            default,
            deserialize_with = "string_or_number",
            skip_serializing_if = "Option::is_none"
        )]
        port: Option<String>,
    },

    /// Traversable iff `condition` holds under the execution context
    Iam {
        action: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        policy_name: Option<String>,
    },
}

impl PolicyEdge {
    /// Bare network edge
    pub fn network() -> Self {
        PolicyEdge::Network {
            rule_name: None,
            protocol: None,
            port: None,
        }
    }

    /// Network edge with rule metadata
    pub fn network_rule(
        rule_name: impl Into<String>,
        protocol: Option<String>,
        port: Option<String>,
    ) -> Self {
        PolicyEdge::Network {
            rule_name: Some(rule_name.into()),
            protocol,
            port,
        }
    }

    /// IAM edge without condition
    pub fn iam(action: impl Into<String>) -> Self {
        PolicyEdge::Iam {
            action: action.into(),
            condition: None,
            policy_name: None,
        }
    }

    /// IAM edge with condition
    pub fn iam_with_condition(action: impl Into<String>, condition: Value) -> Self {
        PolicyEdge::Iam {
            action: action.into(),
            condition: Some(condition),
            policy_name: None,
        }
    }

    pub fn kind(&self) -> EdgeKind {
        match self {
            PolicyEdge::Network { .. } => EdgeKind::Network,
            PolicyEdge::Iam { .. } => EdgeKind::Iam,
        }
    }

    pub fn is_iam(&self) -> bool {
        matches!(self, PolicyEdge::Iam { .. })
    }

    /// Attached condition (IAM edges only)
    pub fn condition(&self) -> Option<&Value> {
        match self {
            PolicyEdge::Iam { condition, .. } => condition.as_ref(),
            PolicyEdge::Network { .. } => None,
        }
    }

    /// True when this is an IAM edge carrying a non-empty condition
    pub fn has_condition(&self) -> bool {
        self.condition().map_or(false, |c| !condition_is_empty(c))
    }
}

/// Null, `{}`, `[]` and `""` count as "no condition"
pub fn condition_is_empty(condition: &Value) -> bool {
    match condition {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    }
}

/// Accept `"443"`, `443` or null for display fields
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_edge_kind() {
        assert_eq!(PolicyEdge::network().kind(), EdgeKind::Network);
        assert_eq!(PolicyEdge::iam("s3:GetObject").kind(), EdgeKind::Iam);
    }

    #[test]
    fn test_has_condition() {
        assert!(!PolicyEdge::iam("s3:GetObject").has_condition());
        assert!(!PolicyEdge::iam_with_condition("s3:GetObject", json!({})).has_condition());
        assert!(PolicyEdge::iam_with_condition(
            "s3:GetObject",
            json!({"IpAddress:source_ip": "10.0.0.0/8"})
        )
        .has_condition());
        assert!(!PolicyEdge::network().has_condition());
    }

    #[test]
    fn test_deserialize_tagged() {
        let edge: PolicyEdge =
            serde_json::from_value(json!({"kind": "network", "protocol": "tcp", "port": 443}))
                .unwrap();
        assert_eq!(
            edge,
            PolicyEdge::Network {
                rule_name: None,
                protocol: Some("tcp".to_string()),
                port: Some("443".to_string()),
            }
        );

        let edge: PolicyEdge = serde_json::from_value(json!({
            "kind": "iam",
            "action": "rds:Connect",
            "condition": {"StringEquals:user": "alice"}
        }))
        .unwrap();
        assert!(edge.is_iam());
        assert!(edge.has_condition());
    }
}
