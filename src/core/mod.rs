//! Shared building blocks for lerna-graph
//!
//! - **config**: CLI/env/file settings resolution
//! - **error**: Error types with exit codes and help messages

pub mod config;
pub mod error;
