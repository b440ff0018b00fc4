//! Threat scoring implementations

pub mod cvss_calculator;
pub mod scorer;

pub use cvss_calculator::{AccessRequirements, CvssCalculator, PathAssessment, ThreatAssessment};
pub use scorer::{ThreatScorer, DEFAULT_IMPACT};
