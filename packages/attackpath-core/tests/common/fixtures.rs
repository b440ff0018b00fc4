//! Shared graph fixtures

use super::GraphBuilder;
use attackpath_core::{Criticality, ExecutionContext, PathAnalyzer, PolicyGraph};
use serde_json::json;
use std::sync::Arc;

/// internet → web → app → db, all network edges, db critical
pub fn linear_chain() -> PolicyGraph {
    GraphBuilder::new()
        .asset("internet")
        .asset("web")
        .asset("app")
        .asset_with("db", Criticality::Critical)
        .network("internet", "web")
        .network("web", "app")
        .network("app", "db")
        .build()
}

/// Same chain, but app → db is an IAM edge gated on source_ip in 10.0.0.0/8
pub fn gated_chain() -> PolicyGraph {
    GraphBuilder::new()
        .asset("internet")
        .asset("web")
        .asset("app")
        .asset_with("db", Criticality::Critical)
        .network("internet", "web")
        .network("web", "app")
        .iam_when(
            "app",
            "db",
            "rds:Connect",
            json!({"IpAddress:source_ip": "10.0.0.0/8"}),
        )
        .build()
}

/// Two routes to `vault`: a direct conditioned IAM edge and a network detour
///
/// ```text
/// internet ──net──▶ bastion ──iam(mfa)──▶ vault
///     │                                    ▲
///     └──net──▶ web ──net──▶ app ──iam─────┘
/// ```
pub fn diamond() -> PolicyGraph {
    GraphBuilder::new()
        .asset("internet")
        .asset("bastion")
        .asset("web")
        .asset("app")
        .asset_with("vault", Criticality::High)
        .network("internet", "bastion")
        .network("internet", "web")
        .network("web", "app")
        .iam_when(
            "bastion",
            "vault",
            "secretsmanager:GetSecretValue",
            json!({"Bool:mfa_present": "true"}),
        )
        .iam("app", "vault", "kms:Decrypt")
        .build()
}

/// Fully connected layered graph: `layers` × `width` nodes plus `src`/`dst`
pub fn layered(layers: usize, width: usize) -> PolicyGraph {
    let mut builder = GraphBuilder::new().asset("src").asset("dst");
    for layer in 0..layers {
        for i in 0..width {
            builder = builder.asset(&format!("n{}_{}", layer, i));
        }
    }
    for i in 0..width {
        builder = builder.network("src", &format!("n0_{}", i));
        builder = builder.network(&format!("n{}_{}", layers - 1, i), "dst");
    }
    for layer in 1..layers {
        for i in 0..width {
            for j in 0..width {
                builder = builder.network(
                    &format!("n{}_{}", layer - 1, i),
                    &format!("n{}_{}", layer, j),
                );
            }
        }
    }
    builder.build()
}

pub fn analyzer(graph: PolicyGraph, context: ExecutionContext, max_depth: usize) -> PathAnalyzer {
    PathAnalyzer::new(Arc::new(graph), context, max_depth).unwrap()
}
