//! CVSS v3.1 base metrics

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CvssError {
    #[error("Invalid {metric}: {value}")]
    InvalidMetric { metric: &'static str, value: String },

    #[error("Invalid CVSS vector: {0}")]
    InvalidVector(String),
}

/// Declares a metric enum with its one-letter vector codes
macro_rules! cvss_metric {
    ($name:ident, $label:literal, { $($variant:ident => $code:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub fn code(&self) -> &'static str {
                match self {
                    $(Self::$variant => $code),+
                }
            }

            pub fn from_code(code: &str) -> Result<Self, CvssError> {
                match code {
                    $($code => Ok(Self::$variant),)+
                    other => Err(CvssError::InvalidMetric {
                        metric: $label,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

cvss_metric!(AttackVector, "AV", { Network => "N", Adjacent => "A", Local => "L", Physical => "P" });
cvss_metric!(AttackComplexity, "AC", { Low => "L", High => "H" });
cvss_metric!(PrivilegesRequired, "PR", { None => "N", Low => "L", High => "H" });
cvss_metric!(UserInteraction, "UI", { None => "N", Required => "R" });
cvss_metric!(Scope, "S", { Unchanged => "U", Changed => "C" });
cvss_metric!(ImpactLevel, "impact", { None => "N", Low => "L", High => "H" });

impl AttackVector {
    pub fn weight(&self) -> f64 {
        match self {
            Self::Network => 0.85,
            Self::Adjacent => 0.62,
            Self::Local => 0.55,
            Self::Physical => 0.20,
        }
    }
}

impl AttackComplexity {
    pub fn weight(&self) -> f64 {
        match self {
            Self::Low => 0.77,
            Self::High => 0.44,
        }
    }
}

impl PrivilegesRequired {
    /// Scope-adjusted weight
    pub fn weight(&self, scope: Scope) -> f64 {
        match (self, scope) {
            (Self::None, _) => 0.85,
            (Self::Low, Scope::Unchanged) => 0.62,
            (Self::Low, Scope::Changed) => 0.68,
            (Self::High, Scope::Unchanged) => 0.27,
            (Self::High, Scope::Changed) => 0.50,
        }
    }
}

impl UserInteraction {
    pub fn weight(&self) -> f64 {
        match self {
            Self::None => 0.85,
            Self::Required => 0.62,
        }
    }
}

impl ImpactLevel {
    pub fn weight(&self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Low => 0.22,
            Self::High => 0.56,
        }
    }
}

/// Base metric group; defaults to `AV:N/AC:L/PR:N/UI:N/S:U/C:N/I:N/A:N`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvssMetrics {
    pub attack_vector: AttackVector,
    pub attack_complexity: AttackComplexity,
    pub privileges_required: PrivilegesRequired,
    pub user_interaction: UserInteraction,
    pub scope: Scope,
    pub confidentiality: ImpactLevel,
    pub integrity: ImpactLevel,
    pub availability: ImpactLevel,
}

impl Default for CvssMetrics {
    fn default() -> Self {
        Self {
            attack_vector: AttackVector::Network,
            attack_complexity: AttackComplexity::Low,
            privileges_required: PrivilegesRequired::None,
            user_interaction: UserInteraction::None,
            scope: Scope::Unchanged,
            confidentiality: ImpactLevel::None,
            integrity: ImpactLevel::None,
            availability: ImpactLevel::None,
        }
    }
}

impl CvssMetrics {
    /// Vector string without the `CVSS:3.1/` prefix
    pub fn vector(&self) -> String {
        format!(
            "AV:{}/AC:{}/PR:{}/UI:{}/S:{}/C:{}/I:{}/A:{}",
            self.attack_vector.code(),
            self.attack_complexity.code(),
            self.privileges_required.code(),
            self.user_interaction.code(),
            self.scope.code(),
            self.confidentiality.code(),
            self.integrity.code(),
            self.availability.code()
        )
    }
}

/// Qualitative severity rating
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    None,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub fn from_score(score: f64) -> Self {
        if score <= 0.0 {
            Self::None
        } else if score < 4.0 {
            Self::Low
        } else if score < 7.0 {
            Self::Medium
        } else if score < 9.0 {
            Self::High
        } else {
            Self::Critical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
            Self::Critical => "Critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvssScore {
    pub base_score: f64,
    /// No temporal metrics are modeled, so this equals `base_score`
    pub temporal_score: f64,
    pub severity: Severity,
    pub vector_string: String,
    /// Impact sub-score (0 when there is no impact)
    pub impact: f64,
    pub exploitability: f64,
}

impl std::fmt::Display for CvssScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CVSS:3.1/{} Base:{:.1} Temporal:{:.1} ({})",
            self.vector_string, self.base_score, self.temporal_score, self.severity
        )
    }
}
