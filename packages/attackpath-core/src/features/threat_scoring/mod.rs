//! Threat Scoring
//!
//! Turns a path plus its verification verdict and optional CVE data into a
//! 0-10 risk score, a threat level and remediation advice.
//!
//! | Component      | Weight | Source                                  |
//! |----------------|--------|-----------------------------------------|
//! | Exploitability | 0.35   | verdict, hop count, auth bypass/privesc |
//! | Impact         | 0.35   | CVSS / max CVE score, CVE count         |
//! | Lineage        | 0.20   | path length                             |
//! | Confidence     | 0.10   | solver confidence                       |
//!
//! `CvssCalculator` is a standalone CVSS v3.1 base-score calculator.

pub mod domain;
pub mod infrastructure;

pub use domain::{
    CvssError, CvssMetrics, CvssScore, PathScoreInput, PathThreatScore, Severity, ThreatLevel,
    ThreatScoreComponent,
};
pub use infrastructure::{
    AccessRequirements, CvssCalculator, PathAssessment, ThreatAssessment, ThreatScorer,
};
