//! Threat scoring domain models

pub mod cvss;
pub mod threat;

pub use cvss::{
    AttackComplexity, AttackVector, CvssError, CvssMetrics, CvssScore, ImpactLevel,
    PrivilegesRequired, Scope, Severity, UserInteraction,
};
pub use threat::{weights, PathScoreInput, PathThreatScore, ThreatLevel, ThreatScoreComponent};
