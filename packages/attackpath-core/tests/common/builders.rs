//! Test data builders

use attackpath_core::{Asset, Criticality, PolicyEdge, PolicyGraph};
use serde_json::Value;

/// Builder for small policy graphs; every edge is endpoint-checked
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: PolicyGraph,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an asset with `Normal` criticality
    pub fn asset(self, id: &str) -> Self {
        self.asset_with(id, Criticality::Normal)
    }

    pub fn asset_with(mut self, id: &str, criticality: Criticality) -> Self {
        self.graph
            .add_asset(Asset::new(id, "server").with_criticality(criticality))
            .unwrap();
        self
    }

    pub fn network(mut self, source: &str, target: &str) -> Self {
        self.graph
            .add_edge_checked(source, target, PolicyEdge::network())
            .unwrap();
        self
    }

    pub fn iam(mut self, source: &str, target: &str, action: &str) -> Self {
        self.graph
            .add_edge_checked(source, target, PolicyEdge::iam(action))
            .unwrap();
        self
    }

    pub fn iam_when(mut self, source: &str, target: &str, action: &str, condition: Value) -> Self {
        self.graph
            .add_edge_checked(source, target, PolicyEdge::iam_with_condition(action, condition))
            .unwrap();
        self
    }

    pub fn build(self) -> PolicyGraph {
        self.graph
    }
}
