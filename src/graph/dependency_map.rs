//! Dependency map construction
//!
//! Turns discovered package groups into the flat list of `PackageDescriptor`s
//! handed to the renderer.
//!
//! ## Edges
//!
//! - Each `(descriptor.name, dependency)` pair is a directed edge `A → B`
//! - Runtime dependencies come first, then dev dependencies
//! - A name declared in both tables produces two identical edges
//! - Edge order carries no meaning; templates must not rely on it
//!
//! ## Filtering
//!
//! After every descriptor is built, each dependency list is passed through a
//! `DependencyFilter`. The default keeps everything, so external registry
//! packages show up as nodes in the graph. `InternalOnly` restricts edges to
//! packages that live in the workspace.

use super::discovery::PackageGroupDescriptor;
use crate::core::config::FilterMode;
use crate::core::error::GraphResult;
use crate::manifest::read_package_manifest;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::path::Path;

/// Names of every package found in the workspace
pub type InternalNames = HashSet<String>;

/// One package as seen by the template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageDescriptor {
  pub name: String,
  /// The workspace pattern this package was discovered through
  pub group: String,
  /// Named switches for templates. Only `docker` exists and it is always false.
  pub flags: BTreeMap<String, bool>,
  pub dependencies: Vec<String>,
}

impl PackageDescriptor {
  fn default_flags() -> BTreeMap<String, bool> {
    BTreeMap::from([("docker".to_string(), false)])
  }
}

/// Decides which dependency names survive as edges
#[derive(Default)]
pub enum DependencyFilter {
  /// Keep every dependency
  #[default]
  KeepAll,
  /// Keep dependencies that are workspace packages
  InternalOnly,
  /// Caller-supplied predicate
  Custom(Box<dyn Fn(&str, &InternalNames) -> bool>),
}

impl DependencyFilter {
  // The CLI only selects KeepAll/InternalOnly; predicates come from callers and tests
  #[allow(dead_code)]
  pub fn custom(predicate: impl Fn(&str, &InternalNames) -> bool + 'static) -> Self {
    DependencyFilter::Custom(Box::new(predicate))
  }

  pub fn keep(&self, dependency: &str, internal: &InternalNames) -> bool {
    match self {
      DependencyFilter::KeepAll => true,
      DependencyFilter::InternalOnly => internal.contains(dependency),
      DependencyFilter::Custom(predicate) => predicate(dependency, internal),
    }
  }
}

impl From<FilterMode> for DependencyFilter {
  fn from(mode: FilterMode) -> Self {
    match mode {
      FilterMode::All => DependencyFilter::KeepAll,
      FilterMode::Internal => DependencyFilter::InternalOnly,
    }
  }
}

impl fmt::Debug for DependencyFilter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      DependencyFilter::KeepAll => write!(f, "KeepAll"),
      DependencyFilter::InternalOnly => write!(f, "InternalOnly"),
      DependencyFilter::Custom(_) => write!(f, "Custom(..)"),
    }
  }
}

/// Read every discovered manifest and build the filtered descriptor list.
///
/// Any unreadable or malformed manifest aborts the whole build; no partial
/// list is returned.
pub fn build_dependency_map(
  groups: &[PackageGroupDescriptor],
  filter: &DependencyFilter,
) -> GraphResult<Vec<PackageDescriptor>> {
  let manifests = groups
    .iter()
    .flat_map(|g| g.manifest_paths.iter().map(move |path| (g.group.as_str(), path.as_path())));

  let mut descriptors = Vec::new();
  for (group, path) in manifests {
    descriptors.push(describe_package(group, path)?);
  }

  let internal: InternalNames = descriptors.iter().map(|d| d.name.clone()).collect();
  for descriptor in &mut descriptors {
    let before = descriptor.dependencies.len();
    descriptor.dependencies.retain(|dep| filter.keep(dep, &internal));

    let dropped = before - descriptor.dependencies.len();
    if dropped > 0 {
      tracing::trace!(package = %descriptor.name, dropped, "filtered dependencies");
    }
  }

  tracing::debug!(
    packages = descriptors.len(),
    edges = descriptors.iter().map(|d| d.dependencies.len()).sum::<usize>(),
    filter = ?filter,
    "built dependency map"
  );

  Ok(descriptors)
}

fn describe_package(group: &str, manifest_path: &Path) -> GraphResult<PackageDescriptor> {
  let manifest = read_package_manifest(manifest_path)?;
  if manifest.name.is_empty() {
    tracing::warn!(path = %manifest_path.display(), "package.json has no name");
  }

  Ok(PackageDescriptor {
    dependencies: manifest.dependency_names(),
    name: manifest.name,
    group: group.to_string(),
    flags: PackageDescriptor::default_flags(),
  })
}
