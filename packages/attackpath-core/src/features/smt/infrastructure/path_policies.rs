//! Policy statements implied by a path's IAM edges

use crate::features::policy_graph::PolicyGraph;
use crate::features::smt::domain::{Effect, PolicyStatement};
use crate::shared::models::{condition_is_empty, AttackPath, PolicyEdge};

/// One Allow statement per conditioned step
///
/// A step contributes nothing when it has a Network edge or an IAM edge
/// without condition. Otherwise the first conditioned IAM edge (insertion
/// order) supplies the statement.
pub fn policies_for_path(graph: &PolicyGraph, path: &AttackPath) -> Vec<PolicyStatement> {
    let mut statements = Vec::new();
    for (from, to) in path.steps() {
        let edges = graph.edges_between(from, to);
        let unconditional = edges
            .iter()
            .any(|edge| edge.condition().map_or(true, condition_is_empty));
        if unconditional {
            continue;
        }

        let chosen = edges.iter().find_map(|edge| match edge {
            PolicyEdge::Iam {
                condition: Some(condition),
                policy_name,
                ..
            } => Some((condition, policy_name)),
            _ => None,
        });
        if let Some((condition, policy_name)) = chosen {
            let mut statement = PolicyStatement::from_condition_map(Effect::Allow, condition);
            statement.name = policy_name
                .clone()
                .or_else(|| Some(format!("{} -> {}", from, to)));
            statements.push(statement);
        }
    }
    statements
}
