//! Policy graph domain models

pub mod definitions;
pub mod error;

pub use definitions::{
    AssetDefinition, EdgeDefinition, FirewallRule, GraphDocument, IamPolicyDocument,
};
pub use error::GraphBuildError;
