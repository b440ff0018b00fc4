//! Common test utilities for attackpath-core
//!
//! Shared graph fixtures, builders and assertions for integration tests.

#![allow(dead_code)]

pub mod assertions;
mod builders;
mod fixtures;

// Path assertions are imported from `common::assertions` directly
pub use builders::*;
pub use fixtures::*;
