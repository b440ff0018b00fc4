//! Verification verdicts

use crate::shared::models::AttackPath;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Variable assignment returned by the solver
pub type Model = BTreeMap<String, ModelValue>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ModelValue {
    Int(i64),
    Bool(bool),
    String(String),
}

impl fmt::Display for ModelValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelValue::Int(i) => write!(f, "{}", i),
            ModelValue::Bool(b) => write!(f, "{}", b),
            ModelValue::String(s) => write!(f, "{:?}", s),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationResult {
    /// A satisfying assignment exists
    Exploitable,
    /// Provably no satisfying assignment
    Blocked,
    /// Timeout, incomplete search or internal failure
    Unknown,
}

impl VerificationResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Exploitable => "exploitable",
            Self::Blocked => "blocked",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of verifying one path; never mutated after construction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProofResult {
    pub result: VerificationResult,
    pub path: AttackPath,
    /// `None` when the solver could not decide
    pub constraints_satisfied: Option<bool>,
    pub num_constraints: usize,
    pub solver_time_ms: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Model>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub counterexample: Option<BTreeMap<String, String>>,
    pub explanation: String,
    #[serde(default)]
    pub constraints_used: Vec<String>,
}

impl ProofResult {
    pub fn is_exploitable(&self) -> bool {
        self.result == VerificationResult::Exploitable
    }

    pub fn is_blocked(&self) -> bool {
        self.result == VerificationResult::Blocked
    }
}

/// Verdict counts over a batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub exploitable: usize,
    pub blocked: usize,
    pub unknown: usize,
}

impl VerificationSummary {
    pub fn from_results(results: &[ProofResult]) -> Self {
        results.iter().fold(Self::default(), |mut acc, proof| {
            acc.total += 1;
            match proof.result {
                VerificationResult::Exploitable => acc.exploitable += 1,
                VerificationResult::Blocked => acc.blocked += 1,
                VerificationResult::Unknown => acc.unknown += 1,
            }
            acc
        })
    }
}
