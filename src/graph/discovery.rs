//! Package discovery: workspace glob patterns → package.json paths
//!
//! Each pattern from lerna.json is resolved against the workspace root, the
//! manifest file name is appended, and the result is expanded with `glob`.
//! Groups keep the order of the patterns; paths inside a group keep the order
//! `glob` yields them in.
//!
//! `**` is matched one directory level deep, like `*`, so `packages/**` never
//! descends into `node_modules`. Directories that cannot be read during
//! expansion are skipped with a warning; only a malformed pattern is an error.

use crate::core::error::{GraphError, GraphResult};
use crate::manifest::{PACKAGE_MANIFEST, WorkspaceConfig};
use crate::utils::absolute_manifest_glob;
use std::fmt::Display;
use std::path::{Path, PathBuf};

/// The manifests matched by one workspace glob pattern
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageGroupDescriptor {
  /// The pattern as written in lerna.json (unresolved)
  pub group: String,
  /// Absolute package.json paths matched by the pattern
  pub manifest_paths: Vec<PathBuf>,
}

/// Expand every workspace pattern into its matching package manifests.
///
/// A pattern that matches nothing yields an empty group rather than an error.
pub fn discover_packages(workspace: &WorkspaceConfig, root: &Path) -> GraphResult<Vec<PackageGroupDescriptor>> {
  let mut groups = Vec::with_capacity(workspace.packages.len());

  for pattern in &workspace.packages {
    let expression = absolute_manifest_glob(root, &single_level(pattern), PACKAGE_MANIFEST)?;
    let manifest_paths = expand(pattern, &expression)?;

    tracing::debug!(group = %pattern, matches = manifest_paths.len(), "expanded workspace pattern");
    if manifest_paths.is_empty() {
      tracing::warn!(group = %pattern, "workspace pattern matched no packages");
    }

    groups.push(PackageGroupDescriptor {
      group: pattern.clone(),
      manifest_paths,
    });
  }

  Ok(groups)
}

/// Collapse every run of `*` into a single `*`.
fn single_level(pattern: &str) -> String {
  let mut collapsed = String::with_capacity(pattern.len());
  for c in pattern.chars() {
    if c == '*' && collapsed.ends_with('*') {
      continue;
    }
    collapsed.push(c);
  }
  collapsed
}

fn expand(pattern: &str, expression: &str) -> GraphResult<Vec<PathBuf>> {
  let entries = glob::glob(expression).map_err(|e| GraphError::Glob {
    pattern: pattern.to_string(),
    reason: e.to_string(),
  })?;

  Ok(readable_entries(pattern, entries))
}

fn readable_entries<E: Display>(pattern: &str, entries: impl Iterator<Item = Result<PathBuf, E>>) -> Vec<PathBuf> {
  entries
    .filter_map(|entry| match entry {
      Ok(path) => Some(path),
      Err(e) => {
        tracing::warn!(group = %pattern, error = %e, "skipping unreadable path");
        None
      }
    })
    .collect()
}
