//! Utility functions for turning workspace patterns into glob expressions

use crate::core::error::{GraphError, GraphResult};
use std::path::{Path, PathBuf};

/// Build the absolute glob expression `<root>/<pattern>/<manifest>`.
///
/// Only the root is escaped, so a checkout living under a directory such as
/// `builds[1]` does not turn into a character class. The workspace pattern
/// keeps its wildcards.
pub fn absolute_manifest_glob(root: &Path, pattern: &str, manifest: &str) -> GraphResult<String> {
  let absolute_root = std::path::absolute(root).map_err(|e| GraphError::PathResolution {
    path: root.to_path_buf(),
    reason: e.to_string(),
  })?;

  let escaped_root = glob::Pattern::escape(path_to_str(&absolute_root)?);
  let expression: PathBuf = Path::new(&escaped_root).join(pattern).join(manifest);

  path_to_str(&expression).map(str::to_string)
}

/// Glob expressions are strings, so the path must be valid UTF-8
fn path_to_str(path: &Path) -> GraphResult<&str> {
  path.to_str().ok_or_else(|| GraphError::PathResolution {
    path: path.to_path_buf(),
    reason: "path is not valid UTF-8".to_string(),
  })
}
