//! Strict graph builder
//!
//! Allow firewall rules become Network edges; Allow IAM policies become one
//! Iam edge per resource. Deny rows are skipped: the graph only records what
//! is reachable.

use super::graph::PolicyGraph;
use crate::features::policy_graph::domain::{
    AssetDefinition, EdgeDefinition, FirewallRule, GraphBuildError, GraphDocument,
    IamPolicyDocument,
};
use tracing::{debug, info};

#[derive(Debug, Default)]
pub struct PolicyGraphBuilder {
    graph: PolicyGraph,
    skipped: usize,
}

impl PolicyGraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asset(mut self, definition: &AssetDefinition) -> Result<Self, GraphBuildError> {
        if definition.id.trim().is_empty() {
            return Err(GraphBuildError::InvalidDefinition(
                "asset id must not be empty".to_string(),
            ));
        }
        self.graph.add_asset(definition.to_asset())?;
        Ok(self)
    }

    pub fn firewall_rule(mut self, rule: &FirewallRule) -> Result<Self, GraphBuildError> {
        if !rule.is_allow() {
            debug!(
                "Skipping non-allow firewall rule {} -> {} ({})",
                rule.source, rule.destination, rule.action
            );
            self.skipped += 1;
            return Ok(self);
        }
        self.graph
            .add_edge_checked(&rule.source, &rule.destination, rule.to_edge())?;
        Ok(self)
    }

    pub fn iam_policy(mut self, policy: &IamPolicyDocument) -> Result<Self, GraphBuildError> {
        if !policy.is_allow() {
            debug!("Skipping {} policy for {}", policy.effect, policy.principal);
            self.skipped += 1;
            return Ok(self);
        }
        if policy.actions.is_empty() {
            return Err(GraphBuildError::InvalidDefinition(format!(
                "policy for {} grants no actions",
                policy.principal
            )));
        }
        for resource in &policy.resources {
            self.graph
                .add_edge_checked(&policy.principal, resource, policy.to_edge())?;
        }
        Ok(self)
    }

    pub fn edge(mut self, definition: &EdgeDefinition) -> Result<Self, GraphBuildError> {
        self.graph.add_edge_checked(
            &definition.source,
            &definition.target,
            definition.edge.clone(),
        )?;
        Ok(self)
    }

    pub fn build(self) -> PolicyGraph {
        info!(
            "Policy graph built: {} nodes, {} edges ({} deny rules skipped)",
            self.graph.node_count(),
            self.graph.edge_count(),
            self.skipped
        );
        self.graph
    }
}

impl PolicyGraph {
    /// Build from a full document; assets are loaded before any edge
    pub fn from_document(document: &GraphDocument) -> Result<Self, GraphBuildError> {
        let mut builder = PolicyGraphBuilder::new();
        for asset in &document.assets {
            builder = builder.asset(asset)?;
        }
        for rule in &document.firewall_rules {
            builder = builder.firewall_rule(rule)?;
        }
        for policy in &document.iam_policies {
            builder = builder.iam_policy(policy)?;
        }
        for edge in &document.edges {
            builder = builder.edge(edge)?;
        }
        Ok(builder.build())
    }
}
