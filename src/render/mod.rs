//! Graph rendering with Tera
//!
//! The descriptor list is exposed to templates as `packages`. A `slugify`
//! helper is registered both as a filter (`{{ name | slugify }}`) and as a
//! function (`{{ slugify(name=name) }}`); it strips `@` and `/` so scoped
//! package names become usable node identifiers.
//!
//! Tera resolves filters, functions and tests while rendering; a template
//! naming one that is not registered is still reported as a template error.
//!
//! The whole document is rendered into memory before anything is written,
//! so a template that fails halfway leaves the output untouched.

use crate::core::config::TemplateSource;
use crate::core::error::{GraphError, GraphResult, ResultExt};
use crate::graph::PackageDescriptor;
use std::collections::HashMap;
use std::io::Write;
use tera::{Context, ErrorKind, Tera, Value};

/// Default DOT template used when no template file is configured
pub const BUILTIN_TEMPLATE: &str = include_str!("graph.tera");

const TEMPLATE_NAME: &str = "graph";

/// Remove the characters DOT identifiers cannot carry (`@` and `/`).
///
/// Idempotent: `slugify(slugify(x)) == slugify(x)`.
pub fn slugify(input: &str) -> String {
  input.replace(['@', '/'], "")
}

fn slugify_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
  let input = value
    .as_str()
    .ok_or_else(|| tera::Error::msg("slugify filter requires a string"))?;
  Ok(Value::String(slugify(input)))
}

fn slugify_function(args: &HashMap<String, Value>) -> tera::Result<Value> {
  let input = args
    .get("name")
    .and_then(Value::as_str)
    .ok_or_else(|| tera::Error::msg("slugify() requires a string `name` argument"))?;
  Ok(Value::String(slugify(input)))
}

/// Read the template source
pub fn load_template(source: &TemplateSource) -> GraphResult<String> {
  match source {
    TemplateSource::File(path) => {
      tracing::debug!(path = %path.display(), "loading template");
      std::fs::read_to_string(path).map_err(|e| GraphError::io(path, e))
    }
    TemplateSource::Builtin => {
      tracing::debug!("using built-in DOT template");
      Ok(BUILTIN_TEMPLATE.to_string())
    }
  }
}

/// Render the descriptors through `template_source` and write the result.
pub fn render_graph(
  descriptors: &[PackageDescriptor],
  template_source: &str,
  output: &mut dyn Write,
) -> GraphResult<()> {
  let mut tera = Tera::default();
  tera.autoescape_on(vec![]);
  tera.register_filter("slugify", slugify_filter);
  tera.register_function("slugify", slugify_function);

  tera
    .add_raw_template(TEMPLATE_NAME, template_source)
    .map_err(|e| GraphError::Template(describe_tera_error(&e)))?;

  let mut context = Context::new();
  context.insert("packages", descriptors);

  let rendered = tera
    .render(TEMPLATE_NAME, &context)
    .map_err(|e| {
      if references_unknown_helper(&e) {
        GraphError::Template(describe_tera_error(&e))
      } else {
        GraphError::Render(describe_tera_error(&e))
      }
    })?;

  write_output(output, rendered.as_bytes())
}

/// Write the descriptor list as pretty-printed JSON.
pub fn render_json(descriptors: &[PackageDescriptor], output: &mut dyn Write) -> GraphResult<()> {
  let mut json = serde_json::to_string_pretty(descriptors).context("Failed to serialize dependency map")?;
  json.push('\n');

  write_output(output, json.as_bytes())
}

fn write_output(output: &mut dyn Write, bytes: &[u8]) -> GraphResult<()> {
  output
    .write_all(bytes)
    .and_then(|()| output.flush())
    .context("Failed to write graph")
}

fn references_unknown_helper(err: &tera::Error) -> bool {
  let mut current: Option<&(dyn std::error::Error + 'static)> = Some(err);
  while let Some(e) = current {
    if let Some(tera_err) = e.downcast_ref::<tera::Error>()
      && matches!(
        tera_err.kind,
        ErrorKind::FilterNotFound(_) | ErrorKind::FunctionNotFound(_) | ErrorKind::TestNotFound(_)
      )
    {
      return true;
    }
    current = e.source();
  }
  false
}

/// Tera keeps the useful part of a message in the source chain
/// ("Failed to render 'graph'" → "Variable `x` not found"), so flatten it.
fn describe_tera_error(err: &tera::Error) -> String {
  let mut message = err.to_string();
  let mut source = std::error::Error::source(err);
  while let Some(inner) = source {
    message.push_str(": ");
    message.push_str(&inner.to_string());
    source = inner.source();
  }
  message
}
