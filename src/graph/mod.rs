//! Workspace discovery and dependency map construction
//!
//! - **discovery**: lerna.json patterns → package.json paths, grouped by pattern
//! - **dependency_map**: package.json files → `PackageDescriptor` list

pub mod dependency_map;
pub mod discovery;

pub use dependency_map::{DependencyFilter, PackageDescriptor, build_dependency_map};
pub use discovery::discover_packages;
