//! CVSS v3.1 base score calculator and path threat assessment

use crate::features::threat_scoring::domain::{
    AttackComplexity, AttackVector, CvssError, CvssMetrics, CvssScore, ImpactLevel,
    PrivilegesRequired, Scope, Severity, UserInteraction,
};
use crate::shared::models::AttackPath;
use serde::{Deserialize, Serialize};

const VECTOR_PREFIXES: [&str; 2] = ["CVSS:3.1/", "CVSS:3.0/"];

#[derive(Debug, Clone, Copy, Default)]
pub struct CvssCalculator;

impl CvssCalculator {
    pub fn new() -> Self {
        Self
    }

    pub fn calculate_base_score(&self, metrics: &CvssMetrics) -> CvssScore {
        let iss = 1.0
            - (1.0 - metrics.confidentiality.weight())
                * (1.0 - metrics.integrity.weight())
                * (1.0 - metrics.availability.weight());

        let impact = match metrics.scope {
            Scope::Unchanged => 6.42 * iss,
            Scope::Changed => 7.52 * (iss - 0.029) - 3.25 * (iss - 0.02).powi(15),
        };

        let exploitability = 8.22
            * metrics.attack_vector.weight()
            * metrics.attack_complexity.weight()
            * metrics.privileges_required.weight(metrics.scope)
            * metrics.user_interaction.weight();

        let base_score = if impact <= 0.0 {
            0.0
        } else {
            match metrics.scope {
                Scope::Unchanged => roundup((impact + exploitability).min(10.0)),
                Scope::Changed => roundup((1.08 * (impact + exploitability)).min(10.0)),
            }
        };

        CvssScore {
            base_score,
            temporal_score: base_score,
            severity: Severity::from_score(base_score),
            vector_string: metrics.vector(),
            impact: impact.max(0.0),
            exploitability,
        }
    }

    /// Parse `[CVSS:3.x/]AV:N/AC:L/...` and score it
    ///
    /// Missing base metrics take the `CvssMetrics` defaults; metrics outside
    /// the base group (temporal, environmental) are ignored.
    pub fn calculate_from_vector(&self, vector: &str) -> Result<CvssScore, CvssError> {
        let body = VECTOR_PREFIXES
            .iter()
            .find_map(|prefix| vector.strip_prefix(prefix))
            .unwrap_or(vector);

        let mut metrics = CvssMetrics::default();
        for component in body.split('/').filter(|c| !c.is_empty()) {
            let (key, value) = component
                .split_once(':')
                .filter(|(_, value)| !value.contains(':'))
                .ok_or_else(|| {
                    tracing::warn!("Error parsing CVSS vector {}: bad component '{}'", vector, component);
                    CvssError::InvalidVector(vector.to_string())
                })?;

            match key {
                "AV" => metrics.attack_vector = AttackVector::from_code(value)?,
                "AC" => metrics.attack_complexity = AttackComplexity::from_code(value)?,
                "PR" => metrics.privileges_required = PrivilegesRequired::from_code(value)?,
                "UI" => metrics.user_interaction = UserInteraction::from_code(value)?,
                "S" => metrics.scope = Scope::from_code(value)?,
                "C" => metrics.confidentiality = impact_metric("C", value)?,
                "I" => metrics.integrity = impact_metric("I", value)?,
                "A" => metrics.availability = impact_metric("A", value)?,
                _ => {}
            }
        }

        Ok(self.calculate_base_score(&metrics))
    }
}

fn impact_metric(metric: &'static str, value: &str) -> Result<ImpactLevel, CvssError> {
    ImpactLevel::from_code(value).map_err(|_| CvssError::InvalidMetric {
        metric,
        value: value.to_string(),
    })
}

/// Smallest one-decimal value ≥ `value`, computed on integers to avoid
/// float artifacts (e.g. 4.000002 → 4.0, not 4.1)
fn roundup(value: f64) -> f64 {
    let int_input = (value * 100_000.0).round() as i64;
    if int_input % 10_000 == 0 {
        int_input as f64 / 100_000.0
    } else {
        ((int_input / 10_000) + 1) as f64 / 10.0
    }
}

/// What an attacker needs to walk a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequirements {
    pub authentication_required: bool,
    pub user_interaction_required: bool,
    pub network_proximity_required: bool,
}

impl Default for AccessRequirements {
    fn default() -> Self {
        Self {
            authentication_required: false,
            user_interaction_required: false,
            network_proximity_required: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathAssessment {
    pub threat_score: f64,
    pub severity: Severity,
    /// Absent for non-exploitable paths
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cvss: Option<CvssScore>,
    pub path_length: usize,
    pub access_requirements: AccessRequirements,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Worst-case CVSS estimate for an attack path
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreatAssessment {
    calculator: CvssCalculator,
}

impl ThreatAssessment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Score the path as a scope-changing, full-impact vulnerability whose
    /// exploitability follows `requirements`; 0 when not exploitable
    pub fn assess_attack_path(
        &self,
        path: &AttackPath,
        is_exploitable: bool,
        requirements: AccessRequirements,
    ) -> PathAssessment {
        if !is_exploitable {
            return PathAssessment {
                threat_score: 0.0,
                severity: Severity::None,
                cvss: None,
                path_length: path.len(),
                access_requirements: requirements,
                reason: Some("Path not exploitable".to_string()),
            };
        }

        let metrics = CvssMetrics {
            attack_vector: if requirements.network_proximity_required {
                AttackVector::Local
            } else {
                AttackVector::Network
            },
            attack_complexity: AttackComplexity::Low,
            privileges_required: if requirements.authentication_required {
                PrivilegesRequired::Low
            } else {
                PrivilegesRequired::None
            },
            user_interaction: if requirements.user_interaction_required {
                UserInteraction::Required
            } else {
                UserInteraction::None
            },
            scope: Scope::Changed,
            confidentiality: ImpactLevel::High,
            integrity: ImpactLevel::High,
            availability: ImpactLevel::High,
        };
        let cvss = self.calculator.calculate_base_score(&metrics);
        tracing::debug!("Assessed {}: {}", path, cvss);

        PathAssessment {
            threat_score: cvss.base_score,
            severity: cvss.severity,
            cvss: Some(cvss),
            path_length: path.len(),
            access_requirements: requirements,
            reason: None,
        }
    }
}
