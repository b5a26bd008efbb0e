use crate::core::error::{ConfigError, GraphError, GraphResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Root used when neither `--root` nor `LERNA_GRAPH_ROOT` is given
pub const DEFAULT_ROOT: &str = "./mock-monorepo";

/// Template picked up from the working directory when no template is configured
pub const DEFAULT_TEMPLATE_FILE: &str = "graph.tera";

/// Configuration file for lerna-graph
/// Searched in order under the workspace root: lerna-graph.toml, .lerna-graph.toml, .config/lerna-graph.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GraphConfig {
  /// Template file, relative to the workspace root
  #[serde(default)]
  pub template: Option<PathBuf>,

  /// Which dependencies become edges
  #[serde(default)]
  pub filter: FilterMode,

  /// Output format ("template" or "json")
  #[serde(default)]
  pub format: Option<String>,

  /// Output file, relative to the workspace root
  #[serde(default)]
  pub output: Option<PathBuf>,
}

/// Dependency filter selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterMode {
  /// Keep every declared dependency, including external registry packages
  #[default]
  All,
  /// Keep only dependencies that are themselves workspace packages
  Internal,
}

/// Output format for the dependency map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
  #[default]
  Template,
  Json,
}

impl OutputFormat {
  pub fn parse(s: &str) -> GraphResult<Self> {
    match s.to_lowercase().as_str() {
      "template" | "dot" => Ok(Self::Template),
      "json" => Ok(Self::Json),
      _ => Err(
        ConfigError::UnknownValue {
          field: "format".to_string(),
          value: s.to_string(),
          expected: "template, json",
        }
        .into(),
      ),
    }
  }
}

impl GraphConfig {
  pub fn find_config_path(root: &Path) -> Option<PathBuf> {
    let candidates = vec![
      root.join("lerna-graph.toml"),
      root.join(".lerna-graph.toml"),
      root.join(".config").join("lerna-graph.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from the workspace root. A missing file is not an error.
  pub fn load(root: &Path) -> GraphResult<Option<Self>> {
    let Some(config_path) = Self::find_config_path(root) else {
      return Ok(None);
    };

    let content = fs::read_to_string(&config_path).map_err(|e| GraphError::io(&config_path, e))?;
    let config: GraphConfig = toml_edit::de::from_str(&content).map_err(|e| ConfigError::Invalid {
      path: config_path.clone(),
      reason: e.to_string(),
    })?;

    tracing::debug!(path = %config_path.display(), "loaded config file");
    Ok(Some(config))
  }
}

/// Where the template source comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
  File(PathBuf),
  Builtin,
}

/// Values given on the command line (or through environment variables)
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
  pub root: Option<PathBuf>,
  pub template: Option<PathBuf>,
  pub internal_only: bool,
  pub format: Option<String>,
  pub output: Option<PathBuf>,
}

/// Fully resolved settings for one run
#[derive(Debug, Clone)]
pub struct Settings {
  pub root: PathBuf,
  pub template: TemplateSource,
  pub filter: FilterMode,
  pub format: OutputFormat,
  pub output: Option<PathBuf>,
}

impl Settings {
  /// Merge CLI values over the config file over defaults.
  ///
  /// `cwd` anchors CLI paths and the `graph.tera` lookup; config file paths
  /// are anchored at the workspace root.
  pub fn resolve(cli: CliOverrides, cwd: &Path) -> GraphResult<Self> {
    let root = cli.root.unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT));
    let file = GraphConfig::load(&root)?.unwrap_or_default();

    let template = if let Some(path) = cli.template {
      TemplateSource::File(cwd.join(path))
    } else if let Some(path) = file.template {
      TemplateSource::File(root.join(path))
    } else if cwd.join(DEFAULT_TEMPLATE_FILE).is_file() {
      TemplateSource::File(cwd.join(DEFAULT_TEMPLATE_FILE))
    } else {
      TemplateSource::Builtin
    };

    let filter = if cli.internal_only { FilterMode::Internal } else { file.filter };

    let format = match cli.format.or(file.format) {
      Some(s) => OutputFormat::parse(&s)?,
      None => OutputFormat::default(),
    };

    let output = match (cli.output, file.output) {
      (Some(path), _) => Some(cwd.join(path)),
      (None, Some(path)) => Some(root.join(path)),
      (None, None) => None,
    };

    Ok(Self {
      root,
      template,
      filter,
      format,
      output,
    })
  }
}
