//! Configuration file loading
//!
//! Files are layered: the `preset` key (default `balanced`) selects the base
//! configuration, every other key overrides it field by field.
//!
//! ```yaml
//! version: 1
//! preset: fast
//! paths:
//!   max_depth: 4
//! ```

use super::analysis_config::AnalysisConfig;
use super::error::{ConfigError, ConfigResult};
use super::preset::Preset;
use serde_json::{Map, Value};
use std::path::Path;

/// Supported file schema versions
pub const SUPPORTED_VERSIONS: [u32; 1] = [1];

impl AnalysisConfig {
    /// Load and validate a YAML or JSON configuration file
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_lowercase();

        let raw: Value = match extension.as_str() {
            "yaml" | "yml" => parse_yaml(&content)?,
            "json" => serde_json::from_str(&content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        let config = Self::from_value(raw)?;
        tracing::debug!(
            "Loaded configuration from {} (preset={})",
            path.display(),
            config.preset
        );
        Ok(config)
    }

    /// Load and validate configuration from YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<Self> {
        Self::from_value(parse_yaml(content)?)
    }

    fn from_value(raw: Value) -> ConfigResult<Self> {
        let mut overrides = match raw {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(ConfigError::Custom(format!(
                    "Configuration root must be a mapping, found {}",
                    other
                )))
            }
        };

        if let Some(version) = overrides.remove("version") {
            let found = version.as_u64().unwrap_or(0) as u32;
            if !SUPPORTED_VERSIONS.contains(&found) {
                return Err(ConfigError::UnsupportedVersion {
                    found,
                    supported: SUPPORTED_VERSIONS.to_vec(),
                });
            }
        }

        let preset = match overrides.get("preset").and_then(Value::as_str) {
            Some(name) => Preset::from_str(name)?,
            None => Preset::default(),
        };
        overrides.insert("preset".to_string(), Value::from(preset.as_str()));

        let mut base = serde_json::to_value(preset.config())?;
        merge(&mut base, Value::Object(overrides));

        let config: AnalysisConfig = serde_json::from_value(base)?;
        config.validate()?;
        Ok(config)
    }
}

fn parse_yaml(content: &str) -> ConfigResult<Value> {
    if content.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_yaml::from_str(content)?)
}

/// Deep-merge `overlay` into `base` (objects merge, everything else replaces)
fn merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
