//! Graph construction errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphBuildError {
    /// Two assets share an id
    #[error("Duplicate asset id: {0}")]
    DuplicateAsset(String),

    /// An edge references an asset that was never defined
    #[error("Edge {source_id} -> {target_id} references unknown asset '{missing}'")]
    UnknownEndpoint {
        source_id: String,
        target_id: String,
        missing: String,
    },

    /// A definition is structurally valid but semantically unusable
    #[error("Invalid definition: {0}")]
    InvalidDefinition(String),

    /// Document could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for GraphBuildError {
    fn from(err: serde_json::Error) -> Self {
        GraphBuildError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for GraphBuildError {
    fn from(err: serde_yaml::Error) -> Self {
        GraphBuildError::Parse(err.to_string())
    }
}
