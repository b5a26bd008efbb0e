//! Integration tests for failure handling: every error aborts the run,
//! writes nothing to stdout, and exits non-zero

use crate::helpers::*;
use anyhow::Result;

fn assert_failed(output: &std::process::Output, code: i32, stderr_fragment: &str) {
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert_eq!(output.status.code(), Some(code), "Unexpected exit status, stderr:\n{}", stderr);
  assert!(
    output.stdout.is_empty(),
    "Nothing should reach stdout on failure:\n{}",
    String::from_utf8_lossy(&output.stdout)
  );
  assert!(
    stderr.contains(stderr_fragment),
    "stderr should mention '{}':\n{}",
    stderr_fragment,
    stderr
  );
}

#[test]
fn test_invalid_package_json_aborts() -> Result<()> {
  let ws = NodeWorkspace::new_lerna(&["packages/*"])?;
  ws.add_package("packages/good", "good", &[], &[])?;
  ws.write_file("packages/broken/package.json", "{ \"name\": \"broken\", ")?;

  let output = run_lerna_graph_raw(&ws.path, &["--root", "."])?;
  assert_failed(&output, 1, "Failed to parse");

  Ok(())
}

#[test]
fn test_package_json_with_wrong_shape_aborts() -> Result<()> {
  let ws = NodeWorkspace::new_lerna(&["packages/*"])?;
  ws.write_file("packages/odd/package.json", r#"{"name": "odd", "dependencies": ["react"]}"#)?;

  let output = run_lerna_graph_raw(&ws.path, &["--root", "."])?;
  assert_failed(&output, 1, "Failed to parse");

  Ok(())
}

#[test]
fn test_missing_lerna_json() -> Result<()> {
  let dir = tempfile::TempDir::new()?;

  let output = run_lerna_graph_raw(dir.path(), &["--root", "."])?;
  assert_failed(&output, 2, "lerna.json");

  Ok(())
}

#[test]
fn test_invalid_lerna_json() -> Result<()> {
  let ws = NodeWorkspace::new_lerna(&["packages/*"])?;
  ws.write_file("lerna.json", "packages: [packages/*]")?;

  let output = run_lerna_graph_raw(&ws.path, &["--root", "."])?;
  assert_failed(&output, 1, "Failed to parse");

  Ok(())
}

#[test]
fn test_malformed_glob_pattern() -> Result<()> {
  let ws = NodeWorkspace::new_lerna(&["packages/[*"])?;

  let output = run_lerna_graph_raw(&ws.path, &["--root", "."])?;
  assert_failed(&output, 1, "Invalid glob pattern");

  Ok(())
}

#[test]
fn test_malformed_template() -> Result<()> {
  let ws = NodeWorkspace::new_lerna(&["packages/*"])?;
  ws.add_package("packages/a", "a", &[], &[])?;
  ws.write_file("bad.tera", "{% for p in packages %}{{ p.name }}")?;

  let output = run_lerna_graph_raw(&ws.path, &["--root", ".", "--template", "bad.tera"])?;
  assert_failed(&output, 1, "Template error");

  Ok(())
}

#[test]
fn test_template_with_unknown_filter() -> Result<()> {
  let ws = NodeWorkspace::new_lerna(&["packages/*"])?;
  ws.add_package("packages/a", "a", &[], &[])?;
  ws.write_file("bad.tera", "{{ packages | nosuchfilter }}")?;

  let output = run_lerna_graph_raw(&ws.path, &["--root", ".", "--template", "bad.tera"])?;
  assert_failed(&output, 1, "Template error");

  Ok(())
}

#[test]
fn test_template_with_undefined_field() -> Result<()> {
  let ws = NodeWorkspace::new_lerna(&["packages/*"])?;
  ws.add_package("packages/a", "a", &[], &[])?;
  ws.write_file("bad.tera", "digraph {\n{% for p in packages %}{{ p.version }}{% endfor %}}")?;

  let output = run_lerna_graph_raw(&ws.path, &["--root", ".", "--template", "bad.tera"])?;
  assert_failed(&output, 1, "Render error");

  Ok(())
}

#[test]
fn test_missing_template_file() -> Result<()> {
  let ws = NodeWorkspace::new_lerna(&["packages/*"])?;

  let output = run_lerna_graph_raw(&ws.path, &["--root", ".", "--template", "nope.tera"])?;
  assert_failed(&output, 2, "nope.tera");

  Ok(())
}

#[test]
fn test_unknown_format() -> Result<()> {
  let ws = NodeWorkspace::new_lerna(&["packages/*"])?;

  let output = run_lerna_graph_raw(&ws.path, &["--root", ".", "--format", "yaml"])?;
  assert_failed(&output, 1, "Unknown value 'yaml'");

  Ok(())
}

#[test]
fn test_failed_run_leaves_no_output_file() -> Result<()> {
  let ws = NodeWorkspace::new_lerna(&["packages/*"])?;
  ws.write_file("packages/broken/package.json", "not json")?;

  let output = run_lerna_graph_raw(&ws.path, &["--root", ".", "--output", "graph.dot"])?;

  assert!(!output.status.success());
  assert!(!ws.path.join("graph.dot").exists());

  Ok(())
}
