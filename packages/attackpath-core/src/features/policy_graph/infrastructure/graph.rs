//! Policy graph over petgraph
//!
//! Nodes carry asset ids; edge weights are `PolicyEdge` payloads. Parallel
//! edges between the same ordered pair are kept. Asset metadata lives beside
//! the topology so an edge can exist before (or without) its asset, which is
//! what `GraphIntegrity` errors downstream detect.

use crate::features::policy_graph::domain::GraphBuildError;
use crate::shared::models::{Asset, PolicyEdge};
use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::HashMap;

/// Directed multigraph of assets and policy edges
#[derive(Debug, Clone, Default)]
pub struct PolicyGraph {
    graph: DiGraph<String, PolicyEdge>,

    /// Asset id → node index (every topology node)
    node_index: HashMap<String, NodeIndex>,

    /// Asset id → metadata (only nodes with a loaded asset)
    assets: HashMap<String, Asset>,
}

impl PolicyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asset; ids must be unique
    pub fn add_asset(&mut self, asset: Asset) -> Result<(), GraphBuildError> {
        if self.assets.contains_key(&asset.id) {
            return Err(GraphBuildError::DuplicateAsset(asset.id));
        }
        self.ensure_node(&asset.id);
        self.assets.insert(asset.id.clone(), asset);
        Ok(())
    }

    /// Add an edge without checking that its endpoints are assets
    ///
    /// Missing endpoints become bare topology nodes.
    pub fn add_edge(
        &mut self,
        source: impl Into<String>,
        target: impl Into<String>,
        edge: PolicyEdge,
    ) -> EdgeIndex {
        let source = self.ensure_node(&source.into());
        let target = self.ensure_node(&target.into());
        self.graph.add_edge(source, target, edge)
    }

    /// Add an edge whose endpoints must both be loaded assets
    pub fn add_edge_checked(
        &mut self,
        source: &str,
        target: &str,
        edge: PolicyEdge,
    ) -> Result<EdgeIndex, GraphBuildError> {
        for endpoint in [source, target] {
            if !self.assets.contains_key(endpoint) {
                return Err(GraphBuildError::UnknownEndpoint {
                    source_id: source.to_string(),
                    target_id: target.to_string(),
                    missing: endpoint.to_string(),
                });
            }
        }
        Ok(self.add_edge(source, target, edge))
    }

    fn ensure_node(&mut self, id: &str) -> NodeIndex {
        if let Some(idx) = self.node_index.get(id) {
            return *idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.node_index.insert(id.to_string(), idx);
        idx
    }

    /// True if the id is a node of the topology
    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn asset(&self, id: &str) -> Option<&Asset> {
        self.assets.get(id)
    }

    pub fn assets(&self) -> impl Iterator<Item = &Asset> {
        self.assets.values()
    }

    pub fn node_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_index.get(id).copied()
    }

    /// Asset id of a node index
    pub fn node_id(&self, idx: NodeIndex) -> &str {
        &self.graph[idx]
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Distinct successors in first-edge insertion order
    pub fn successors(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut out: Vec<(EdgeIndex, NodeIndex)> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (e.id(), e.target()))
            .collect();
        out.sort_by_key(|(edge, _)| *edge);

        let mut seen = Vec::with_capacity(out.len());
        for (_, target) in out {
            if !seen.contains(&target) {
                seen.push(target);
            }
        }
        seen
    }

    /// All edges from `source` to `target`, in insertion order
    pub fn edges_between(&self, source: &str, target: &str) -> Vec<&PolicyEdge> {
        let (Some(src), Some(dst)) = (self.node_index(source), self.node_index(target)) else {
            return Vec::new();
        };
        let mut edges: Vec<(EdgeIndex, &PolicyEdge)> = self
            .graph
            .edges_connecting(src, dst)
            .map(|e| (e.id(), e.weight()))
            .collect();
        edges.sort_by_key(|(idx, _)| *idx);
        edges.into_iter().map(|(_, edge)| edge).collect()
    }

    /// Node ids that appear in edges but have no asset
    pub fn dangling_nodes(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .node_index
            .keys()
            .filter(|id| !self.assets.contains_key(*id))
            .map(String::as_str)
            .collect();
        ids.sort_unstable();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain() -> PolicyGraph {
        let mut graph = PolicyGraph::new();
        for id in ["a", "b", "c"] {
            graph.add_asset(Asset::new(id, "server")).unwrap();
        }
        graph.add_edge_checked("a", "b", PolicyEdge::network()).unwrap();
        graph.add_edge_checked("a", "c", PolicyEdge::network()).unwrap();
        graph.add_edge_checked("a", "b", PolicyEdge::iam("sts:AssumeRole")).unwrap();
        graph
    }

    #[test]
    fn test_duplicate_asset_rejected() {
        let mut graph = PolicyGraph::new();
        graph.add_asset(Asset::new("a", "server")).unwrap();
        assert!(matches!(
            graph.add_asset(Asset::new("a", "server")),
            Err(GraphBuildError::DuplicateAsset(id)) if id == "a"
        ));
    }

    #[test]
    fn test_checked_edge_requires_assets() {
        let mut graph = PolicyGraph::new();
        graph.add_asset(Asset::new("a", "server")).unwrap();
        let err = graph
            .add_edge_checked("a", "ghost", PolicyEdge::network())
            .unwrap_err();
        assert!(err.to_string().contains("ghost"));
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_parallel_edges_kept_in_order() {
        let graph = chain();
        let edges = graph.edges_between("a", "b");
        assert_eq!(edges.len(), 2);
        assert!(!edges[0].is_iam());
        assert!(edges[1].is_iam());
    }

    #[test]
    fn test_successors_deduplicated() {
        let graph = chain();
        let a = graph.node_index("a").unwrap();
        let succ: Vec<&str> = graph
            .successors(a)
            .into_iter()
            .map(|idx| graph.node_id(idx))
            .collect();
        assert_eq!(succ, vec!["b", "c"]);
    }

    #[test]
    fn test_unchecked_edge_creates_bare_node() {
        let mut graph = chain();
        graph.add_edge("c", "ghost", PolicyEdge::network());
        assert!(graph.contains_node("ghost"));
        assert!(graph.asset("ghost").is_none());
        assert_eq!(graph.dangling_nodes(), vec!["ghost"]);
    }
}
