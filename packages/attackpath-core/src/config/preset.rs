//! Preset configurations
//!
//! Presets provide complete default configurations for common use cases.

use super::analysis_config::{
    AnalysisConfig, GraphRefreshConfig, PathAnalysisConfig, ScoringConfig, VerificationConfig,
};
use super::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

const VALID_PRESETS: [&str; 3] = ["fast", "balanced", "thorough"];

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Interactive queries
    ///
    /// - Paths: max_depth=3, cache on
    /// - Verification: 1s solver budget
    Fast,

    /// Default
    ///
    /// - Paths: max_depth=5, cache on
    /// - Verification: 5s solver budget
    Balanced,

    /// Full audit
    ///
    /// - Paths: max_depth=8, cache on
    /// - Verification: 30s solver budget, larger search
    Thorough,
}

impl Preset {
    /// Build the full configuration for this preset
    pub fn config(&self) -> AnalysisConfig {
        match self {
            Self::Fast => AnalysisConfig {
                preset: *self,
                paths: PathAnalysisConfig {
                    max_depth: 3,
                    ..PathAnalysisConfig::default()
                },
                verification: VerificationConfig {
                    timeout_ms: 1_000,
                    max_search_nodes: 10_000,
                    ..VerificationConfig::default()
                },
                scoring: ScoringConfig::default(),
                graph: GraphRefreshConfig::default(),
            },
            Self::Balanced => AnalysisConfig {
                preset: *self,
                ..AnalysisConfig::default()
            },
            Self::Thorough => AnalysisConfig {
                preset: *self,
                paths: PathAnalysisConfig {
                    max_depth: 8,
                    ..PathAnalysisConfig::default()
                },
                verification: VerificationConfig {
                    timeout_ms: 30_000,
                    max_search_nodes: 1_000_000,
                    ..VerificationConfig::default()
                },
                scoring: ScoringConfig::default(),
                graph: GraphRefreshConfig::default(),
            },
        }
    }

    /// Parse preset from string
    pub fn from_str(s: &str) -> ConfigResult<Self> {
        match s.to_lowercase().as_str() {
            "fast" => Ok(Self::Fast),
            "balanced" => Ok(Self::Balanced),
            "thorough" => Ok(Self::Thorough),
            _ => Err(ConfigError::unknown_preset(s, &VALID_PRESETS)),
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fast => "fast",
            Self::Balanced => "balanced",
            Self::Thorough => "thorough",
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::Balanced
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parsing() {
        assert_eq!(Preset::from_str("fast").unwrap(), Preset::Fast);
        assert_eq!(Preset::from_str("FAST").unwrap(), Preset::Fast);
        assert_eq!(Preset::from_str("balanced").unwrap(), Preset::Balanced);
        assert_eq!(Preset::from_str("thorough").unwrap(), Preset::Thorough);
        assert!(Preset::from_str("custom").is_err());
    }

    #[test]
    fn test_preset_display() {
        assert_eq!(Preset::Fast.to_string(), "fast");
        assert_eq!(Preset::Balanced.to_string(), "balanced");
        assert_eq!(Preset::Thorough.to_string(), "thorough");
    }

    #[test]
    fn test_presets_are_valid() {
        for preset in [Preset::Fast, Preset::Balanced, Preset::Thorough] {
            let config = preset.config();
            assert_eq!(config.preset, preset);
            assert!(config.validate().is_ok(), "{} preset must validate", preset);
        }
    }

    #[test]
    fn test_preset_depth_ordering() {
        let fast = Preset::Fast.config().paths.max_depth;
        let balanced = Preset::Balanced.config().paths.max_depth;
        let thorough = Preset::Thorough.config().paths.max_depth;
        assert!(fast < balanced && balanced < thorough);
    }
}
