//! Composite path threat scorer
//!
//! overall = 0.35·exploitability + 0.35·impact + 0.20·lineage + 0.10·confidence,
//! every component on a 0-10 scale, result clamped to [0, 10].

use crate::config::ScoringConfig;
use crate::features::threat_scoring::domain::{
    weights, PathScoreInput, PathThreatScore, ThreatLevel, ThreatScoreComponent,
};
use crate::shared::models::AttackPath;

/// Impact assumed when no CVSS or CVE score is supplied
pub const DEFAULT_IMPACT: f64 = 5.0;

const NOT_EXPLOITABLE: &str = "No immediate action required - path not exploitable.";
const DETECTIVE_CONTROLS: &str = "Implement detective controls (CloudTrail, VPC Flow Logs)";

/// Stateless apart from its recommendation settings
#[derive(Debug, Clone, Default)]
pub struct ThreatScorer {
    config: ScoringConfig,
}

impl ThreatScorer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ScoringConfig) -> Self {
        Self {
            config: config.clone(),
        }
    }

    pub fn score_path(&self, input: &PathScoreInput) -> PathThreatScore {
        let path = &input.path;
        let exploitability = exploitability(
            input.is_exploitable,
            path.len(),
            input.has_auth_bypass,
            input.has_privesc,
        );
        let impact = impact(input.cvss_base_score, input.max_cve_score, input.cve_count);
        let lineage = lineage(path.len());
        let confidence = confidence(input.z3_confidence, input.is_exploitable);

        let components = vec![
            ThreatScoreComponent::new(
                "Exploitability",
                exploitability,
                weights::EXPLOITABILITY,
                "Ease of exploitation based on path structure",
            ),
            ThreatScoreComponent::new(
                "Impact",
                impact,
                weights::IMPACT,
                "Severity of impact if path is exploited",
            ),
            ThreatScoreComponent::new(
                "Lineage",
                lineage,
                weights::LINEAGE,
                "Attack path complexity and length",
            ),
            ThreatScoreComponent::new(
                "Confidence",
                confidence,
                weights::CONFIDENCE,
                "Confidence in the verification result",
            ),
        ];

        let overall_score = components
            .iter()
            .map(ThreatScoreComponent::weighted_value)
            .sum::<f64>()
            .clamp(0.0, 10.0);
        let threat_level = ThreatLevel::from_score(overall_score);

        tracing::debug!(
            "Scored {}: {:.2} ({}) [E={:.2} I={:.2} L={:.2} C={:.2}]",
            path,
            overall_score,
            threat_level,
            exploitability,
            impact,
            lineage,
            confidence
        );

        PathThreatScore {
            path_id: path.id(),
            path: path.clone(),
            overall_score,
            threat_level,
            components,
            exploitability_score: exploitability,
            impact_score: impact,
            lineage_score: lineage,
            confidence_score: confidence,
            cve_count: input.cve_count,
            max_cve_score: input.max_cve_score,
            recommendations: self.recommendations(input),
        }
    }

    /// Score each input; highest overall score first (ties keep input order)
    pub fn score_multiple_paths(&self, inputs: &[PathScoreInput]) -> Vec<PathThreatScore> {
        let mut scores: Vec<PathThreatScore> =
            inputs.iter().map(|input| self.score_path(input)).collect();
        scores.sort_by(|a, b| b.overall_score.total_cmp(&a.overall_score));

        tracing::info!(
            "Scored {} paths ({} at High or above)",
            scores.len(),
            scores
                .iter()
                .filter(|s| s.threat_level >= ThreatLevel::High)
                .count()
        );
        scores
    }

    fn recommendations(&self, input: &PathScoreInput) -> Vec<String> {
        if !input.is_exploitable {
            return vec![NOT_EXPLOITABLE.to_string()];
        }

        let path: &AttackPath = &input.path;
        let nodes = path.nodes();
        let mut recommendations = Vec::new();

        if nodes.len() > self.config.segmentation_threshold {
            recommendations.push(format!(
                "Consider network segmentation: Break path by isolating {}",
                nodes[nodes.len() / 2]
            ));
        }

        if let Some(target) = path.target() {
            if self.config.sensitive_targets.iter().any(|s| s == target) {
                recommendations.push(format!(
                    "Increase access controls on {}: Implement MFA and least-privilege IAM",
                    target
                ));
            }
        }

        if input.cve_count > 0 {
            recommendations.push(format!(
                "Review {} associated CVEs and apply patches",
                input.cve_count
            ));
        } else if input.cvss_base_score.is_some_and(|score| score >= 7.0) {
            recommendations.push("High CVSS score detected - prioritize remediation".to_string());
        }

        recommendations.push(DETECTIVE_CONTROLS.to_string());
        recommendations
    }
}

/// 6.0 minus 0.5 per hop (floor 3.5), +1.5 auth bypass, +1.0 privesc, cap 10
fn exploitability(is_exploitable: bool, path_len: usize, auth_bypass: bool, privesc: bool) -> f64 {
    if !is_exploitable {
        return 0.0;
    }
    let hops = path_len.saturating_sub(1) as f64;
    let mut score = (6.0 - hops * 0.5).max(3.5);
    if auth_bypass {
        score += 1.5;
    }
    if privesc {
        score += 1.0;
    }
    score.min(10.0)
}

fn impact(cvss: Option<f64>, max_cve: Option<f64>, cve_count: u32) -> f64 {
    let mut score = cvss.unwrap_or(0.0).max(max_cve.unwrap_or(0.0));
    if score <= 0.0 {
        score = DEFAULT_IMPACT;
    }
    if cve_count > 0 {
        score += (f64::from(cve_count) * 0.2).min(1.0);
    }
    score.min(10.0)
}

/// Shorter paths score higher: 9.5/9.0/8.5, then 6.5/6.0/5.5, then a slow decline to 3.0
fn lineage(path_len: usize) -> f64 {
    let len = path_len as f64;
    if path_len <= 3 {
        9.5 - (len - 1.0).max(0.0) * 0.5
    } else if path_len <= 6 {
        7.0 - (len - 3.0) * 0.5
    } else {
        (6.0 - (len - 6.0) * 0.3).max(3.0)
    }
}

fn confidence(solver_confidence: f64, is_exploitable: bool) -> f64 {
    if !is_exploitable {
        return 0.0;
    }
    if !solver_confidence.is_finite() {
        return 0.0;
    }
    (solver_confidence * 10.0).clamp(0.0, 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_simple_exploitable_path() {
        let scorer = ThreatScorer::new();
        let input = PathScoreInput::new(vec!["internet", "app", "database"], true)
            .with_cvss(8.0)
            .with_cves(2, None);
        let result = scorer.score_path(&input);

        assert_eq!(result.path_id, "internet|app|database");
        assert_eq!(result.components.len(), 4);
        assert!(approx(result.exploitability_score, 5.0));
        assert!(approx(result.impact_score, 8.4));
        assert!(approx(result.lineage_score, 8.5));
        assert!(approx(result.confidence_score, 10.0));
        // 1.75 + 2.94 + 1.7 + 1.0
        assert!(approx(result.overall_score, 7.39));
        assert_eq!(result.threat_level, ThreatLevel::High);
        assert_eq!(
            result.recommendations,
            vec![
                "Increase access controls on database: Implement MFA and least-privilege IAM",
                "Review 2 associated CVEs and apply patches",
                DETECTIVE_CONTROLS,
            ]
        );
    }

    #[test]
    fn test_blocked_path() {
        let result = ThreatScorer::new().score_path(&PathScoreInput::new(
            vec!["external", "protected_resource"],
            false,
        ));
        assert_eq!(result.exploitability_score, 0.0);
        assert_eq!(result.confidence_score, 0.0);
        // Impact 5.0 and lineage 9.0 still count
        assert!(approx(result.overall_score, 0.35 * 5.0 + 0.2 * 9.0));
        assert_eq!(result.threat_level, ThreatLevel::Low);
        assert_eq!(result.recommendations, vec![NOT_EXPLOITABLE]);
    }

    #[test]
    fn test_exploitability_bonuses_and_floor() {
        assert!(approx(exploitability(true, 2, false, true), 6.5));
        assert!(approx(exploitability(true, 2, true, true), 8.0));
        assert!(approx(exploitability(true, 20, false, false), 3.5));
        assert_eq!(exploitability(false, 2, true, true), 0.0);
    }

    #[test]
    fn test_impact_rules() {
        assert_eq!(impact(None, None, 0), DEFAULT_IMPACT);
        assert_eq!(impact(Some(0.0), Some(0.0), 0), DEFAULT_IMPACT);
        assert!(approx(impact(Some(6.0), Some(7.5), 0), 7.5));
        assert!(approx(impact(Some(9.5), None, 10), 10.0));
        assert!(approx(impact(None, None, 3), 5.6));
    }

    #[test]
    fn test_non_finite_confidence_scores_zero() {
        let scorer = ThreatScorer::new();
        for solver_confidence in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let input = PathScoreInput::new(vec!["internet", "db"], true)
                .with_confidence(solver_confidence);
            let result = scorer.score_path(&input);
            assert_eq!(result.confidence_score, 0.0);
            assert!(result.overall_score.is_finite());
            assert!((0.0..=10.0).contains(&result.overall_score));
            assert_eq!(result.threat_level, ThreatLevel::from_score(result.overall_score));
        }
    }

    #[test]
    fn test_lineage_bands() {
        let expected = [
            (1, 9.5),
            (2, 9.0),
            (3, 8.5),
            (4, 6.5),
            (5, 6.0),
            (6, 5.5),
            (7, 5.7),
            (20, 3.0),
        ];
        for (len, score) in expected {
            assert!(approx(lineage(len), score), "len {} -> {}", len, lineage(len));
        }
    }

    #[test]
    fn test_short_path_outscores_long() {
        let scorer = ThreatScorer::new();
        let short = scorer.score_path(&PathScoreInput::new(vec!["s", "d"], true).with_cvss(5.0));
        let long = scorer.score_path(
            &PathScoreInput::new(vec!["s", "m1", "m2", "m3", "m4", "d"], true).with_cvss(5.0),
        );
        assert!(short.lineage_score > long.lineage_score);
        assert!(short.overall_score > long.overall_score);
        assert_eq!(
            long.recommendations[0],
            "Consider network segmentation: Break path by isolating m3"
        );
    }

    #[test]
    fn test_high_cvss_without_cves() {
        let result = ThreatScorer::new()
            .score_path(&PathScoreInput::new(vec!["a", "b"], true).with_cvss(7.0));
        assert!(result
            .recommendations
            .contains(&"High CVSS score detected - prioritize remediation".to_string()));
    }

    #[test]
    fn test_multiple_paths_sorted_descending() {
        let inputs = vec![
            PathScoreInput::new(vec!["external", "locked"], false),
            PathScoreInput::new(vec!["internet", "web", "db"], true)
                .with_cvss(8.0)
                .with_cves(1, None),
            PathScoreInput::new(vec!["internal", "admin"], true).with_cvss(6.0),
        ];
        let results = ThreatScorer::new().score_multiple_paths(&inputs);
        assert_eq!(results.len(), 3);
        assert!(results
            .windows(2)
            .all(|pair| pair[0].overall_score >= pair[1].overall_score));
        assert_eq!(results[2].path_id, "external|locked");
    }

    #[test]
    fn test_custom_sensitive_targets() {
        let config = ScoringConfig {
            sensitive_targets: vec!["vault".to_string()],
            segmentation_threshold: 2,
        };
        let result = ThreatScorer::from_config(&config)
            .score_path(&PathScoreInput::new(vec!["a", "b", "vault"], true));
        assert_eq!(
            result.recommendations,
            vec![
                "Consider network segmentation: Break path by isolating b",
                "Increase access controls on vault: Implement MFA and least-privilege IAM",
                DETECTIVE_CONTROLS,
            ]
        );
    }
}
