//! Attack path type

use serde::{Deserialize, Serialize};

/// Ordered, repetition-free sequence of asset ids
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttackPath {
    nodes: Vec<String>,
}

impl AttackPath {
    pub fn new(nodes: Vec<String>) -> Self {
        Self { nodes }
    }

    pub fn nodes(&self) -> &[String] {
        &self.nodes
    }

    pub fn into_nodes(self) -> Vec<String> {
        self.nodes
    }

    /// Number of nodes (edges + 1)
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of traversed edges
    pub fn hops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    pub fn source(&self) -> Option<&str> {
        self.nodes.first().map(String::as_str)
    }

    pub fn target(&self) -> Option<&str> {
        self.nodes.last().map(String::as_str)
    }

    /// Consecutive (from, to) pairs
    pub fn steps(&self) -> impl Iterator<Item = (&str, &str)> {
        self.nodes
            .windows(2)
            .map(|pair| (pair[0].as_str(), pair[1].as_str()))
    }

    /// Stable identifier (`a|b|c`)
    pub fn id(&self) -> String {
        self.nodes.join("|")
    }

    /// No node appears twice
    pub fn is_simple(&self) -> bool {
        let mut seen = std::collections::HashSet::with_capacity(self.nodes.len());
        self.nodes.iter().all(|node| seen.insert(node.as_str()))
    }
}

impl std::fmt::Display for AttackPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.nodes.join(" → "))
    }
}

impl From<Vec<String>> for AttackPath {
    fn from(nodes: Vec<String>) -> Self {
        Self::new(nodes)
    }
}

impl From<Vec<&str>> for AttackPath {
    fn from(nodes: Vec<&str>) -> Self {
        Self::new(nodes.into_iter().map(String::from).collect())
    }
}

impl AsRef<[String]> for AttackPath {
    fn as_ref(&self) -> &[String] {
        &self.nodes
    }
}
