//! Error types for lerna-graph with contextual messages and exit codes
//!
//! Every stage of the pipeline returns `GraphResult`. Nothing below `main`
//! terminates the process; errors bubble up to a single handler that prints
//! them and picks the exit code.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for lerna-graph
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (bad manifest, bad template, bad config)
  User = 1,
  /// System error (I/O)
  System = 2,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for lerna-graph
#[derive(Debug)]
pub enum GraphError {
  /// A file could not be opened, read or written
  Io { path: PathBuf, source: io::Error },

  /// A manifest is not valid JSON or does not match the expected shape
  Parse { path: PathBuf, source: serde_json::Error },

  /// A workspace pattern could not be turned into an absolute glob expression
  PathResolution { path: PathBuf, reason: String },

  /// A workspace pattern is malformed or its expansion failed
  Glob { pattern: String, reason: String },

  /// The template source could not be parsed
  Template(String),

  /// The template failed while rendering
  Render(String),

  /// Configuration errors
  Config(ConfigError),

  /// Generic error with message, optional context and help
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl GraphError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    GraphError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    GraphError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      GraphError::Message { message, context, help } => GraphError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      _ => self,
    }
  }

  pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    GraphError::Io {
      path: path.into(),
      source,
    }
  }

  pub fn parse(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
    GraphError::Parse {
      path: path.into(),
      source,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      GraphError::Io { .. } => ExitCode::System,
      GraphError::Parse { .. }
      | GraphError::PathResolution { .. }
      | GraphError::Glob { .. }
      | GraphError::Template(_)
      | GraphError::Render(_)
      | GraphError::Config(_)
      | GraphError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      GraphError::Io { source, .. } if source.kind() == io::ErrorKind::NotFound => {
        Some("Check the --root option; it must point at the directory holding lerna.json.".to_string())
      }
      GraphError::Glob { .. } => Some("Check the \"packages\" patterns in lerna.json.".to_string()),
      GraphError::Template(_) | GraphError::Render(_) => Some(
        "Templates receive `packages` (name, group, flags, dependencies) and the `slugify` helper.".to_string(),
      ),
      GraphError::Config(e) => e.help_message(),
      GraphError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for GraphError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GraphError::Io { path, source } => write!(f, "I/O error on {}: {}", path.display(), source),
      GraphError::Parse { path, source } => write!(f, "Failed to parse {}: {}", path.display(), source),
      GraphError::PathResolution { path, reason } => {
        write!(f, "Could not resolve path {}: {}", path.display(), reason)
      }
      GraphError::Glob { pattern, reason } => write!(f, "Invalid glob pattern '{}': {}", pattern, reason),
      GraphError::Template(msg) => write!(f, "Template error: {}", msg),
      GraphError::Render(msg) => write!(f, "Render error: {}", msg),
      GraphError::Config(e) => write!(f, "{}", e),
      GraphError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for GraphError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      GraphError::Io { source, .. } => Some(source),
      GraphError::Parse { source, .. } => Some(source),
      _ => None,
    }
  }
}

/// Errors without a file to attach; callers add what was being done via `ResultExt`
impl From<io::Error> for GraphError {
  fn from(err: io::Error) -> Self {
    GraphError::message(err.to_string())
  }
}

impl From<serde_json::Error> for GraphError {
  fn from(err: serde_json::Error) -> Self {
    GraphError::message(err.to_string())
  }
}

impl From<ConfigError> for GraphError {
  fn from(err: ConfigError) -> Self {
    GraphError::Config(err)
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Config file could not be parsed
  Invalid { path: PathBuf, reason: String },

  /// A field holds a value outside its allowed set
  UnknownValue {
    field: String,
    value: String,
    expected: &'static str,
  },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::Invalid { .. } => Some("Valid keys: template, filter, format, output.".to_string()),
      ConfigError::UnknownValue { field, expected, .. } => Some(format!("Set `{}` to one of: {}", field, expected)),
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Invalid { path, reason } => {
        write!(f, "Invalid configuration in {}: {}", path.display(), reason)
      }
      ConfigError::UnknownValue { field, value, .. } => {
        write!(f, "Unknown value '{}' for `{}`", value, field)
      }
    }
  }
}

/// Result type alias for lerna-graph
pub type GraphResult<T> = Result<T, GraphError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> GraphResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> GraphResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<GraphError>,
{
  fn context(self, ctx: impl Into<String>) -> GraphResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> GraphResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &GraphError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
