//! Policy Graph
//!
//! Directed multigraph of assets joined by network-reachability and IAM
//! permission edges, plus the loader that builds it.
//!
//! ```text
//! GraphDocument ─► PolicyGraphBuilder ─► PolicyGraph ─► GraphProvider
//!  (assets, firewall rules,                              (static / cached
//!   IAM policies, raw edges)                              with refresh)
//! ```

pub mod domain;
pub mod infrastructure;

pub use domain::{
    AssetDefinition, EdgeDefinition, FirewallRule, GraphBuildError, GraphDocument,
    IamPolicyDocument,
};
pub use infrastructure::{
    CachedGraphProvider, GraphProvider, PolicyGraph, PolicyGraphBuilder, StaticGraphProvider,
};
