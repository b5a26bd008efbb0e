//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A throwaway JavaScript monorepo on disk
pub struct NodeWorkspace {
  _root: TempDir,
  pub path: PathBuf,
}

impl NodeWorkspace {
  /// Create a Lerna workspace whose lerna.json lists `patterns`
  pub fn new_lerna(patterns: &[&str]) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    let lerna_json = serde_json::json!({
      "version": "independent",
      "npmClient": "yarn",
      "packages": patterns,
    });
    std::fs::write(path.join("lerna.json"), serde_json::to_string_pretty(&lerna_json)?)?;

    Ok(Self { _root: root, path })
  }

  /// Create an npm/yarn workspace (no lerna.json, `workspaces` in the root package.json)
  pub fn new_npm(patterns: &[&str]) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    let package_json = serde_json::json!({
      "name": "monorepo-root",
      "private": true,
      "workspaces": patterns,
    });
    std::fs::write(path.join("package.json"), serde_json::to_string_pretty(&package_json)?)?;

    Ok(Self { _root: root, path })
  }

  /// Add a package under `dir` (e.g. "packages/core")
  pub fn add_package(&self, dir: &str, name: &str, deps: &[&str], dev_deps: &[&str]) -> Result<PathBuf> {
    let pkg_path = self.path.join(dir);
    std::fs::create_dir_all(pkg_path.join("src"))?;

    let table = |names: &[&str]| -> serde_json::Map<String, serde_json::Value> {
      names
        .iter()
        .map(|n| (n.to_string(), serde_json::Value::String("^1.0.0".to_string())))
        .collect()
    };

    let package_json = serde_json::json!({
      "name": name,
      "version": "1.0.0",
      "main": "src/index.js",
      "scripts": { "test": "jest" },
      "dependencies": table(deps),
      "devDependencies": table(dev_deps),
    });
    std::fs::write(pkg_path.join("package.json"), serde_json::to_string_pretty(&package_json)?)?;
    std::fs::write(pkg_path.join("src/index.js"), format!("module.exports = '{}';\n", name))?;

    Ok(pkg_path)
  }

  /// Write an arbitrary file relative to the workspace root
  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let file_path = self.path.join(path);
    if let Some(parent) = file_path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
  }

  /// Read a file relative to the workspace root
  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }
}

fn lerna_graph_command(cwd: &Path, args: &[&str]) -> Command {
  let mut cmd = Command::new(env!("CARGO_BIN_EXE_lerna-graph"));
  cmd
    .current_dir(cwd)
    .args(args)
    .env_remove("LERNA_GRAPH_ROOT")
    .env_remove("LERNA_GRAPH_TEMPLATE")
    .env_remove("RUST_LOG");
  cmd
}

/// Run lerna-graph and return its output, whatever the exit status
pub fn run_lerna_graph_raw(cwd: &Path, args: &[&str]) -> Result<Output> {
  lerna_graph_command(cwd, args)
    .output()
    .context("Failed to run lerna-graph")
}

/// Run lerna-graph with extra environment variables
pub fn run_lerna_graph_with_env(cwd: &Path, args: &[&str], env: &[(&str, &str)]) -> Result<Output> {
  let mut cmd = lerna_graph_command(cwd, args);
  for (key, value) in env {
    cmd.env(key, value);
  }
  let output = cmd.output().context("Failed to run lerna-graph")?;
  ensure_success(args, output)
}

/// Run lerna-graph and fail unless it exits successfully
pub fn run_lerna_graph(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_lerna_graph_raw(cwd, args)?;
  ensure_success(args, output)
}

fn ensure_success(args: &[&str], output: Output) -> Result<Output> {
  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "lerna-graph command failed: lerna-graph {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}

/// Render the graph for `ws` with the built-in template and return stdout
pub fn render_dot(ws: &NodeWorkspace, extra_args: &[&str]) -> Result<String> {
  let root = ws.path.to_string_lossy().to_string();
  let mut args = vec!["--root", root.as_str()];
  args.extend_from_slice(extra_args);

  let output = run_lerna_graph(&ws.path, &args)?;
  Ok(String::from_utf8(output.stdout)?)
}

/// Count `"from" -> "to";` lines in a DOT document
pub fn edge_count(dot: &str, from: &str, to: &str) -> usize {
  dot.matches(&format!("\"{}\" -> \"{}\";", from, to)).count()
}
