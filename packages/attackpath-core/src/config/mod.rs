//! Configuration System
//!
//! Two-tier configuration:
//! - Level 1: Preset (fast / balanced / thorough) - one-liner
//! - Level 2: YAML/JSON file - preset plus field overrides
//!
//! # Examples
//!
//! ```rust,ignore
//! use attackpath_core::config::{AnalysisConfig, Preset};
//!
//! // Level 1: preset
//! let config = AnalysisConfig::preset(Preset::Fast);
//!
//! // Level 2: file (validated on load)
//! let config = AnalysisConfig::from_file("analysis.yaml")?;
//! ```

pub mod analysis_config;
pub mod error;
pub mod io;
pub mod preset;

// Re-exports
pub use analysis_config::{
    AnalysisConfig, GraphRefreshConfig, PathAnalysisConfig, ScoringConfig, VerificationConfig,
};
pub use error::{ConfigError, ConfigResult};
pub use preset::Preset;
