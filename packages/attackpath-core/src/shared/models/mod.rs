//! Shared models

mod asset;
mod context;
mod edge;
mod path;

pub use asset::{Asset, Criticality};
pub use context::{ContextValue, ExecutionContext};
pub use edge::{condition_is_empty, EdgeKind, PolicyEdge};
pub use path::AttackPath;

// Conditions are free-form JSON mappings (`{"Operator:key": value}`)
pub use serde_json::Value;

/// Asset identifier type alias
pub type AssetId = String;
