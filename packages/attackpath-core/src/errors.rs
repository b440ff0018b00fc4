//! Error types for attackpath-core
//!
//! Caller-facing failures only. Condition mismatches, unsupported operators
//! and solver timeouts are ordinary results, never errors.

use crate::config::ConfigError;
use crate::features::policy_graph::GraphBuildError;
use thiserror::Error;

/// Main error type for attack-path operations
#[derive(Debug, Error)]
pub enum AttackPathError {
    /// Source or target asset is not in the graph
    #[error("Node not found in graph: {0}")]
    NodeNotFound(String),

    /// The graph breaks the loader contract (e.g. an edge endpoint with no asset)
    #[error("Graph integrity violation: {0}")]
    GraphIntegrity(String),

    /// Traversal depth outside the accepted range
    #[error("Invalid max_depth {0}: must be at least 1")]
    InvalidDepth(usize),

    /// Graph construction error
    #[error("Graph build error: {0}")]
    GraphBuild(#[from] GraphBuildError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl AttackPathError {
    /// Create a node-not-found error
    pub fn node_not_found(id: impl Into<String>) -> Self {
        AttackPathError::NodeNotFound(id.into())
    }

    /// Create a graph-integrity error
    pub fn integrity(msg: impl Into<String>) -> Self {
        AttackPathError::GraphIntegrity(msg.into())
    }

    /// True for the recoverable, caller-facing failure class
    pub fn is_node_not_found(&self) -> bool {
        matches!(self, AttackPathError::NodeNotFound(_))
    }
}

impl From<serde_json::Error> for AttackPathError {
    fn from(err: serde_json::Error) -> Self {
        AttackPathError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AttackPathError {
    fn from(err: serde_yaml::Error) -> Self {
        AttackPathError::Serialization(err.to_string())
    }
}

/// Result type alias for attack-path operations
pub type Result<T> = std::result::Result<T, AttackPathError>;
