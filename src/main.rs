mod core;
mod graph;
mod manifest;
mod render;
mod utils;

use crate::core::config::{CliOverrides, OutputFormat, Settings};
use crate::core::error::{GraphError, GraphResult, ResultExt, print_error};
use crate::graph::DependencyFilter;
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Render the package dependency graph of a Lerna monorepo
#[derive(Parser)]
#[command(name = "lerna-graph")]
#[command(version, about, long_about = None)]
#[command(styles = get_styles())]
struct Cli {
  /// Monorepo root containing lerna.json [default: ./mock-monorepo]
  #[arg(short, long, env = "LERNA_GRAPH_ROOT")]
  root: Option<PathBuf>,

  /// Tera template to render (default: ./graph.tera if present, else the built-in DOT template)
  #[arg(short, long, env = "LERNA_GRAPH_TEMPLATE")]
  template: Option<PathBuf>,

  /// Only keep dependencies that are packages of this workspace
  #[arg(long)]
  internal_only: bool,

  /// Output format: template (default), json
  #[arg(long)]
  format: Option<String>,

  /// Write the graph to a file instead of stdout
  #[arg(short, long)]
  output: Option<PathBuf>,

  /// Increase log verbosity (-v debug, -vv trace)
  #[arg(short, long, action = clap::ArgAction::Count)]
  verbose: u8,
}

impl Cli {
  fn overrides(&self) -> CliOverrides {
    CliOverrides {
      root: self.root.clone(),
      template: self.template.clone(),
      internal_only: self.internal_only,
      format: self.format.clone(),
      output: self.output.clone(),
    }
  }
}

fn get_styles() -> clap::builder::Styles {
  use anstyle::{AnsiColor, Color, Style};

  let heading = Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Cyan)));
  clap::builder::Styles::styled()
    .header(heading)
    .usage(heading)
    .literal(Style::new().fg_color(Some(Color::Ansi(AnsiColor::Green))))
    .error(Style::new().bold().fg_color(Some(Color::Ansi(AnsiColor::Red))))
}

/// Logs go to stderr so stdout only ever carries the graph.
/// `-v` flags win over `RUST_LOG`; without either only warnings are shown.
fn init_logging(verbose: u8) {
  let filter = match verbose {
    0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    1 => EnvFilter::new("debug"),
    _ => EnvFilter::new("trace"),
  };

  let _ = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .with_target(false)
    .try_init();
}

fn main() {
  let cli = Cli::parse();
  init_logging(cli.verbose);

  if let Err(err) = run(&cli) {
    handle_error(err);
  }
}

fn run(cli: &Cli) -> GraphResult<()> {
  let cwd = std::env::current_dir().map_err(|e| {
    GraphError::with_help(
      format!("Failed to get current directory: {}", e),
      "Run lerna-graph from an existing directory.",
    )
  })?;
  let settings = Settings::resolve(cli.overrides(), &cwd)?;
  tracing::info!(root = %settings.root.display(), "building dependency graph");

  let workspace = manifest::load_workspace_config(&settings.root)?;
  let groups = graph::discover_packages(&workspace, &settings.root)?;
  let descriptors = graph::build_dependency_map(&groups, &DependencyFilter::from(settings.filter))?;

  // Everything is rendered into memory first: a failure at any stage leaves
  // stdout (or the output file) untouched.
  let mut document = Vec::new();
  match settings.format {
    OutputFormat::Template => {
      let template = render::load_template(&settings.template)?;
      render::render_graph(&descriptors, &template, &mut document)?;
    }
    OutputFormat::Json => render::render_json(&descriptors, &mut document)?,
  }

  match &settings.output {
    Some(path) => {
      std::fs::write(path, &document).map_err(|e| GraphError::io(path, e))?;
      tracing::info!(path = %path.display(), packages = descriptors.len(), "wrote graph");
    }
    None => {
      let mut stdout = std::io::stdout().lock();
      stdout
        .write_all(&document)
        .and_then(|()| stdout.flush())
        .context("Failed to write graph to stdout")?;
    }
  }

  Ok(())
}

fn handle_error(err: GraphError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
