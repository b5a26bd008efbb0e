//! Workspace and package manifest reading
//!
//! Two JSON shapes matter:
//! - `lerna.json`: the list of workspace glob patterns
//! - `package.json`: a package's name and its dependency tables
//!
//! Unknown fields are ignored and missing tables default to empty, so any
//! manifest that parses as a JSON object of the right shape is accepted.

use crate::core::error::{GraphError, GraphResult};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Workspace descriptor file name
pub const WORKSPACE_MANIFEST: &str = "lerna.json";

/// Package manifest file name appended to every workspace glob
pub const PACKAGE_MANIFEST: &str = "package.json";

/// lerna.json structure
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct WorkspaceConfig {
  #[serde(default)]
  pub packages: Vec<String>,
}

/// package.json structure (minimal fields we care about)
///
/// Dependency tables are ordered maps so names come out sorted within each
/// table and the rendered graph is reproducible between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PackageManifest {
  #[serde(default)]
  pub name: String,
  #[serde(default)]
  pub dependencies: BTreeMap<String, String>,
  #[serde(default)]
  #[serde(rename = "devDependencies")]
  pub dev_dependencies: BTreeMap<String, String>,
  // Never rendered; kept so the manifest shape is complete
  #[allow(dead_code)]
  #[serde(default)]
  pub scripts: BTreeMap<String, String>,
}

/// The `workspaces` field of a root package.json (npm/yarn style)
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WorkspaceSpec {
  Array(Vec<String>),
  Object { packages: Vec<String> },
}

impl WorkspaceSpec {
  fn into_patterns(self) -> Vec<String> {
    match self {
      WorkspaceSpec::Array(patterns) => patterns,
      WorkspaceSpec::Object { packages } => packages,
    }
  }
}

#[derive(Debug, Deserialize)]
struct RootPackageJson {
  #[serde(default)]
  workspaces: Option<WorkspaceSpec>,
}

impl PackageManifest {
  /// Runtime dependency names followed by dev dependency names.
  ///
  /// A name present in both tables appears twice.
  pub fn dependency_names(&self) -> Vec<String> {
    self
      .dependencies
      .keys()
      .chain(self.dev_dependencies.keys())
      .cloned()
      .collect()
  }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> GraphResult<T> {
  let content = fs::read_to_string(path).map_err(|e| GraphError::io(path, e))?;
  serde_json::from_str(&content).map_err(|e| GraphError::parse(path, e))
}

/// Read and parse a lerna.json file
pub fn read_workspace_config(path: &Path) -> GraphResult<WorkspaceConfig> {
  read_json(path)
}

/// Read and parse a package.json file
pub fn read_package_manifest(path: &Path) -> GraphResult<PackageManifest> {
  read_json(path)
}

/// Load the workspace patterns for a monorepo root.
///
/// lerna.json wins when present. Without it, a root package.json carrying a
/// `workspaces` field is used instead. If neither exists the lerna.json read
/// error is returned.
pub fn load_workspace_config(root: &Path) -> GraphResult<WorkspaceConfig> {
  let lerna_json = root.join(WORKSPACE_MANIFEST);
  if lerna_json.exists() {
    tracing::debug!(path = %lerna_json.display(), "reading workspace config");
    return read_workspace_config(&lerna_json);
  }

  let package_json = root.join(PACKAGE_MANIFEST);
  if package_json.is_file() {
    let pkg: RootPackageJson = read_json(&package_json)?;
    if let Some(workspaces) = pkg.workspaces {
      tracing::debug!(path = %package_json.display(), "using package.json workspaces");
      return Ok(WorkspaceConfig {
        packages: workspaces.into_patterns(),
      });
    }
  }

  read_workspace_config(&lerna_json)
}
