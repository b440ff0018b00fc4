//! Asset (graph node) types

use serde::{Deserialize, Serialize};

/// Business criticality of an asset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    Critical,
    High,
    Medium,
    Low,
    #[default]
    Normal,
}

impl Criticality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "critical",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
            Self::Normal => "normal",
        }
    }

    /// Parse from string; anything unrecognized is `Normal`
    pub fn from_str(s: &str) -> Self {
        if s.eq_ignore_ascii_case("critical") {
            Self::Critical
        } else if s.eq_ignore_ascii_case("high") {
            Self::High
        } else if s.eq_ignore_ascii_case("medium") {
            Self::Medium
        } else if s.eq_ignore_ascii_case("low") {
            Self::Low
        } else {
            Self::Normal
        }
    }

    /// Bonus added to a path score when this asset is the target
    pub fn target_bonus(&self) -> f64 {
        match self {
            Self::Critical => 40.0,
            Self::High => 30.0,
            Self::Medium => 15.0,
            Self::Low | Self::Normal => 0.0,
        }
    }
}

impl std::fmt::Display for Criticality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Graph node: a host, service, role or data store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub id: String,

    #[serde(rename = "type")]
    pub asset_type: String,

    #[serde(default)]
    pub criticality: Criticality,
}

impl Asset {
    pub fn new(id: impl Into<String>, asset_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            asset_type: asset_type.into(),
            criticality: Criticality::Normal,
        }
    }

    pub fn with_criticality(mut self, criticality: Criticality) -> Self {
        self.criticality = criticality;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_criticality_default_is_normal() {
        let asset: Asset = serde_json::from_str(r#"{"id": "web", "type": "server"}"#).unwrap();
        assert_eq!(asset.criticality, Criticality::Normal);
        assert_eq!(asset.asset_type, "server");
    }

    #[test]
    fn test_criticality_parsing() {
        assert_eq!(Criticality::from_str("HIGH"), Criticality::High);
        assert_eq!(Criticality::from_str("whatever"), Criticality::Normal);
    }

    #[test]
    fn test_target_bonus() {
        assert_eq!(Criticality::Critical.target_bonus(), 40.0);
        assert_eq!(Criticality::High.target_bonus(), 30.0);
        assert_eq!(Criticality::Medium.target_bonus(), 15.0);
        assert_eq!(Criticality::Low.target_bonus(), 0.0);
        assert_eq!(Criticality::Normal.target_bonus(), 0.0);
    }
}
