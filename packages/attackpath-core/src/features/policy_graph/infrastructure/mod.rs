//! Policy graph infrastructure

pub mod builder;
pub mod graph;
pub mod provider;

pub use builder::PolicyGraphBuilder;
pub use graph::PolicyGraph;
pub use provider::{CachedGraphProvider, GraphProvider, StaticGraphProvider};
