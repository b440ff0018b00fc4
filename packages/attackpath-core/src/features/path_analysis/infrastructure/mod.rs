//! Path analysis infrastructure

pub mod analyzer;

pub use analyzer::PathAnalyzer;
