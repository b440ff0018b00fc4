//! Threat score models

use crate::shared::models::AttackPath;
use serde::{Deserialize, Serialize};

/// Component weights (sum to 1.0)
pub mod weights {
    pub const EXPLOITABILITY: f64 = 0.35;
    pub const IMPACT: f64 = 0.35;
    pub const LINEAGE: f64 = 0.20;
    pub const CONFIDENCE: f64 = 0.10;
}

/// Threat level bands over the 0-10 overall score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ThreatLevel {
    Informational,
    Low,
    Medium,
    High,
    Critical,
}

impl ThreatLevel {
    /// ≥9 Critical, ≥7 High, ≥4 Medium, >0 Low, otherwise Informational
    pub fn from_score(score: f64) -> Self {
        if score >= 9.0 {
            Self::Critical
        } else if score >= 7.0 {
            Self::High
        } else if score >= 4.0 {
            Self::Medium
        } else if score > 0.0 {
            Self::Low
        } else {
            Self::Informational
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
            Self::Informational => "Informational",
        }
    }

    /// Nominal display range (inclusive)
    pub fn score_range(&self) -> (f64, f64) {
        match self {
            Self::Critical => (9.0, 10.0),
            Self::High => (7.0, 8.9),
            Self::Medium => (4.0, 6.9),
            Self::Low => (0.1, 3.9),
            Self::Informational => (0.0, 0.0),
        }
    }
}

impl std::fmt::Display for ThreatLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One weighted input of the overall score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatScoreComponent {
    pub name: String,
    pub value: f64,
    pub weight: f64,
    pub description: String,
}

impl ThreatScoreComponent {
    pub fn new(name: &str, value: f64, weight: f64, description: &str) -> Self {
        Self {
            name: name.to_string(),
            value,
            weight,
            description: description.to_string(),
        }
    }

    pub fn weighted_value(&self) -> f64 {
        self.value * self.weight
    }
}

/// Scored attack path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathThreatScore {
    /// `a|b|c`
    pub path_id: String,
    pub path: AttackPath,
    pub overall_score: f64,
    pub threat_level: ThreatLevel,
    pub components: Vec<ThreatScoreComponent>,
    pub exploitability_score: f64,
    pub impact_score: f64,
    pub lineage_score: f64,
    pub confidence_score: f64,
    pub cve_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_cve_score: Option<f64>,
    pub recommendations: Vec<String>,
}

impl std::fmt::Display for PathThreatScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] Path: {} Score: {:.1}/10",
            self.threat_level, self.path, self.overall_score
        )
    }
}

/// Inputs for scoring one path
///
/// Only `path` and `is_exploitable` are required; the rest default the way
/// an absent CVE feed would leave them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathScoreInput {
    pub path: AttackPath,
    #[serde(default)]
    pub is_exploitable: bool,
    #[serde(default)]
    pub cvss_base_score: Option<f64>,
    /// Solver confidence in 0..=1
    #[serde(default = "default_confidence")]
    pub z3_confidence: f64,
    #[serde(default)]
    pub cve_count: u32,
    #[serde(default)]
    pub max_cve_score: Option<f64>,
    #[serde(default, alias = "has_authentication_bypass")]
    pub has_auth_bypass: bool,
    #[serde(default, alias = "has_privilege_escalation")]
    pub has_privesc: bool,
}

fn default_confidence() -> f64 {
    1.0
}

impl PathScoreInput {
    pub fn new(path: impl Into<AttackPath>, is_exploitable: bool) -> Self {
        Self {
            path: path.into(),
            is_exploitable,
            cvss_base_score: None,
            z3_confidence: default_confidence(),
            cve_count: 0,
            max_cve_score: None,
            has_auth_bypass: false,
            has_privesc: false,
        }
    }

    pub fn with_cvss(mut self, score: f64) -> Self {
        self.cvss_base_score = Some(score);
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.z3_confidence = confidence;
        self
    }

    pub fn with_cves(mut self, count: u32, max_score: Option<f64>) -> Self {
        self.cve_count = count;
        self.max_cve_score = max_score;
        self
    }

    pub fn with_auth_bypass(mut self) -> Self {
        self.has_auth_bypass = true;
        self
    }

    pub fn with_privesc(mut self) -> Self {
        self.has_privesc = true;
        self
    }
}
