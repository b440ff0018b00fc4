//! Analysis configuration types
//!
//! One struct per pipeline stage, each with its own `validate()`.

use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ============================================================================
// Top level
// ============================================================================

/// Complete configuration for one analysis run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Preset the remaining values were derived from
    pub preset: Preset,

    pub paths: PathAnalysisConfig,

    pub verification: VerificationConfig,

    pub scoring: ScoringConfig,

    pub graph: GraphRefreshConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            preset: Preset::Balanced,
            paths: PathAnalysisConfig::default(),
            verification: VerificationConfig::default(),
            scoring: ScoringConfig::default(),
            graph: GraphRefreshConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Start from a preset
    pub fn preset(preset: Preset) -> Self {
        preset.config()
    }

    /// Validate every stage
    pub fn validate(&self) -> ConfigResult<()> {
        self.paths.validate()?;
        self.verification.validate()?;
        self.scoring.validate()?;
        self.graph.validate()?;
        Ok(())
    }
}

// ============================================================================
// Path enumeration
// ============================================================================

/// Path enumeration settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathAnalysisConfig {
    /// Maximum edges per path (1..=20)
    pub max_depth: usize,

    /// Cache valid paths per (source, target)
    pub use_cache: bool,

    /// Stop after this many accepted paths (0 = unlimited)
    pub max_paths: usize,
}

impl Default for PathAnalysisConfig {
    fn default() -> Self {
        Self {
            max_depth: 5,
            use_cache: true,
            max_paths: 0,
        }
    }
}

impl PathAnalysisConfig {
    pub const MAX_DEPTH_LIMIT: usize = 20;

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_depth == 0 || self.max_depth > Self::MAX_DEPTH_LIMIT {
            return Err(ConfigError::range_with_hint(
                "paths.max_depth",
                self.max_depth,
                1,
                Self::MAX_DEPTH_LIMIT,
                "Enumeration is exponential in depth; keep it small",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Verification
// ============================================================================

/// Solver settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    /// Per-path solver budget in milliseconds (1..=600000)
    pub timeout_ms: u64,

    /// Search-node budget for the built-in solver (1..=10000000)
    pub max_search_nodes: usize,

    /// Verify batches on the worker pool
    pub parallel_batch: bool,

    /// Worker threads for batch verification (0 = 75% of cores)
    pub worker_threads: usize,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 5_000,
            max_search_nodes: 100_000,
            parallel_batch: true,
            worker_threads: 0,
        }
    }
}

impl VerificationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Resolved worker count
    pub fn effective_workers(&self) -> usize {
        if self.worker_threads > 0 {
            self.worker_threads
        } else {
            ((num_cpus::get() * 3) / 4).max(1)
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.timeout_ms == 0 || self.timeout_ms > 600_000 {
            return Err(ConfigError::range_with_hint(
                "verification.timeout_ms",
                self.timeout_ms,
                1,
                600_000,
                "The solver must always run with a bounded timeout",
            ));
        }
        if self.max_search_nodes == 0 || self.max_search_nodes > 10_000_000 {
            return Err(ConfigError::range_with_hint(
                "verification.max_search_nodes",
                self.max_search_nodes,
                1,
                10_000_000,
                "",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Threat scoring
// ============================================================================

/// Threat scoring settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringConfig {
    /// Target names that get an access-control recommendation
    pub sensitive_targets: Vec<String>,

    /// Paths longer than this get a segmentation recommendation
    pub segmentation_threshold: usize,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            sensitive_targets: vec![
                "database".to_string(),
                "secrets".to_string(),
                "admin".to_string(),
            ],
            segmentation_threshold: 4,
        }
    }
}

impl ScoringConfig {
    pub fn validate(&self) -> ConfigResult<()> {
        if self.segmentation_threshold < 2 {
            return Err(ConfigError::range_with_hint(
                "scoring.segmentation_threshold",
                self.segmentation_threshold,
                2,
                usize::MAX,
                "A path needs an interior node to segment",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Graph refresh
// ============================================================================

/// Refresh policy for the cached graph provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphRefreshConfig {
    /// Rebuild the graph after this many seconds (1..=86400)
    pub refresh_interval_secs: u64,
}

impl Default for GraphRefreshConfig {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 300,
        }
    }
}

impl GraphRefreshConfig {
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_secs)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.refresh_interval_secs == 0 || self.refresh_interval_secs > 86_400 {
            return Err(ConfigError::range_with_hint(
                "graph.refresh_interval_secs",
                self.refresh_interval_secs,
                1,
                86_400,
                "",
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.paths.max_depth, 5);
        assert_eq!(config.verification.timeout_ms, 5_000);
        assert_eq!(config.graph.refresh_interval_secs, 300);
    }

    #[test]
    fn test_zero_depth_rejected() {
        let mut config = AnalysisConfig::default();
        config.paths.max_depth = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("paths.max_depth"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = AnalysisConfig::default();
        config.verification.timeout_ms = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_effective_workers_at_least_one() {
        let config = VerificationConfig::default();
        assert!(config.effective_workers() >= 1);

        let pinned = VerificationConfig {
            worker_threads: 3,
            ..VerificationConfig::default()
        };
        assert_eq!(pinned.effective_workers(), 3);
    }

    #[test]
    fn test_partial_yaml_uses_defaults() {
        let config: AnalysisConfig = serde_yaml::from_str("paths:\n  max_depth: 7\n").unwrap();
        assert_eq!(config.paths.max_depth, 7);
        assert!(config.paths.use_cache);
        assert_eq!(config.verification, VerificationConfig::default());
    }
}
