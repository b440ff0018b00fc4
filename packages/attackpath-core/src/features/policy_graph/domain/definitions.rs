//! Loader input models
//!
//! Shapes of the asset inventory, firewall rule rows and IAM policy
//! documents the graph is built from.

use super::error::GraphBuildError;
use crate::shared::models::{Asset, Criticality, PolicyEdge};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;

/// Asset inventory entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetDefinition {
    pub id: String,

    #[serde(rename = "type")]
    pub asset_type: String,

    /// Free text, unrecognized values map to `normal`
    #[serde(default)]
    pub criticality: Option<String>,
}

impl AssetDefinition {
    pub fn to_asset(&self) -> Asset {
        Asset {
            id: self.id.clone(),
            asset_type: self.asset_type.clone(),
            criticality: self
                .criticality
                .as_deref()
                .map(Criticality::from_str)
                .unwrap_or_default(),
        }
    }
}

/// Firewall rule row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirewallRule {
    pub source: String,
    pub destination: String,

    /// `allow` or `deny`
    pub action: String,

    #[serde(default, alias = "name")]
    pub rule_name: Option<String>,

    #[serde(default)]
    pub protocol: Option<String>,

    #[serde(default, deserialize_with = "port_text")]
    pub port: Option<String>,
}

impl FirewallRule {
    pub fn is_allow(&self) -> bool {
        self.action.trim().eq_ignore_ascii_case("allow")
    }

    pub fn to_edge(&self) -> PolicyEdge {
        PolicyEdge::Network {
            rule_name: self.rule_name.clone(),
            protocol: self.protocol.clone(),
            port: self.port.clone(),
        }
    }
}

/// IAM policy statement in the usual capitalized JSON form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IamPolicyDocument {
    #[serde(rename = "Effect")]
    pub effect: String,

    #[serde(rename = "Principal")]
    pub principal: String,

    #[serde(rename = "Action", deserialize_with = "one_or_many")]
    pub actions: Vec<String>,

    #[serde(rename = "Resource", deserialize_with = "one_or_many")]
    pub resources: Vec<String>,

    #[serde(rename = "Condition", default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Value>,

    #[serde(rename = "PolicyName", alias = "Sid", default)]
    pub policy_name: Option<String>,
}

impl IamPolicyDocument {
    pub fn is_allow(&self) -> bool {
        self.effect.trim().eq_ignore_ascii_case("allow")
    }

    /// Actions joined with `,`
    pub fn action_label(&self) -> String {
        self.actions.join(",")
    }

    pub fn to_edge(&self) -> PolicyEdge {
        PolicyEdge::Iam {
            action: self.action_label(),
            condition: self.condition.clone(),
            policy_name: self.policy_name.clone(),
        }
    }
}

/// Pre-built edge in a graph document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDefinition {
    pub source: String,
    pub target: String,

    #[serde(flatten)]
    pub edge: PolicyEdge,
}

/// Everything needed to build one graph
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub assets: Vec<AssetDefinition>,

    #[serde(default)]
    pub firewall_rules: Vec<FirewallRule>,

    #[serde(default)]
    pub iam_policies: Vec<IamPolicyDocument>,

    #[serde(default)]
    pub edges: Vec<EdgeDefinition>,
}

impl GraphDocument {
    /// Read a YAML or JSON document, picked by extension
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, GraphBuildError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml") | Some("yml") => Ok(serde_yaml::from_str(&content)?),
            Some("json") => Ok(serde_json::from_str(&content)?),
            other => Err(GraphBuildError::Parse(format!(
                "unsupported graph document extension {:?}",
                other.unwrap_or("")
            ))),
        }
    }
}

fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(item) => vec![item],
        OneOrMany::Many(items) => items,
    })
}

fn port_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) if s.is_empty() => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}
