//! Error types for emsdk-release with contextual messages and exit codes
//!
//! Every failure is surfaced to the operator verbatim. Errors from external
//! tools (git, the regeneration hook, archivers, uploaders) carry the tool's
//! own stderr so the operator can clean up by hand.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for emsdk-release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (dirty tree, config, invalid args)
  User = 1,
  /// System error (git, external tools, I/O)
  System = 2,
  /// Validation failure (malformed registry, bad versions)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for emsdk-release
#[derive(Debug)]
pub enum ReleaseError {
  /// Configuration errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Version registry errors
  Registry(RegistryError),

  /// External tool errors (hook, archivers, uploader)
  Tool(ToolError),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Create an error with help text
  pub fn with_help(msg: impl Into<String>, help: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: Some(help.into()),
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(err) => ReleaseError::Message {
        message: format!("{}: {}", ctx_str, err),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Config(_) => ExitCode::User,
      ReleaseError::Git(GitError::DirtyWorkingTree { .. }) => ExitCode::User,
      ReleaseError::Git(_) => ExitCode::System,
      ReleaseError::Registry(_) => ExitCode::Validation,
      ReleaseError::Tool(_) => ExitCode::System,
      ReleaseError::Io(_) => ExitCode::System,
      ReleaseError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Git(e) => e.help_message(),
      ReleaseError::Registry(e) => e.help_message(),
      ReleaseError::Tool(e) => e.help_message(),
      ReleaseError::Message { help, .. } => help.clone(),
      ReleaseError::Io(_) => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Git(e) => write!(f, "{}", e),
      ReleaseError::Registry(e) => write!(f, "{}", e),
      ReleaseError::Tool(e) => write!(f, "{}", e),
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for ReleaseError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ReleaseError::message(format!("UTF-8 conversion error: {}", err))
  }
}

impl From<glob::PatternError> for ReleaseError {
  fn from(err: glob::PatternError) -> Self {
    ReleaseError::message(format!("Invalid glob pattern: {}", err))
  }
}

impl From<glob::GlobError> for ReleaseError {
  fn from(err: glob::GlobError) -> Self {
    ReleaseError::message(format!("Glob traversal error: {}", err))
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<GitError> for ReleaseError {
  fn from(err: GitError) -> Self {
    ReleaseError::Git(err)
  }
}

impl From<RegistryError> for ReleaseError {
  fn from(err: RegistryError) -> Self {
    ReleaseError::Registry(err)
  }
}

impl From<ToolError> for ReleaseError {
  fn from(err: ToolError) -> Self {
    ReleaseError::Tool(err)
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Config file exists but could not be parsed
  Parse { path: PathBuf, reason: String },

  /// Field present but holds an unusable value
  InvalidValue { field: String, reason: String },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::Parse { .. } => {
        Some("Fix the file or remove it to fall back to the built-in emsdk defaults.".to_string())
      }
      ConfigError::InvalidValue { .. } => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Parse { path, reason } => {
        write!(f, "Failed to parse config {}: {}", path.display(), reason)
      }
      ConfigError::InvalidValue { field, reason } => {
        write!(f, "Invalid value for '{}': {}", field, reason)
      }
    }
  }
}

/// Git operation errors
#[derive(Debug)]
pub enum GitError {
  /// Git command failed
  CommandFailed { command: String, stderr: String },

  /// Repository not found
  RepoNotFound { path: PathBuf },

  /// Working tree has staged, unstaged or untracked changes
  DirtyWorkingTree { entries: Vec<String> },

  /// Target branch already exists
  BranchExists { name: String, stderr: String },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::RepoNotFound { path } => Some(format!(
        "Run from inside the emsdk checkout or pass --repo: {}",
        path.display()
      )),
      GitError::DirtyWorkingTree { .. } => {
        Some("Commit or stash your changes (including untracked files) and try again.".to_string())
      }
      GitError::BranchExists { name, .. } => Some(format!(
        "Delete the stale branch with `git branch -D {}` if the previous attempt was abandoned.",
        name
      )),
      GitError::CommandFailed { .. } => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr)
      }
      GitError::RepoNotFound { path } => {
        write!(f, "Git repository not found at: {}", path.display())
      }
      GitError::DirtyWorkingTree { entries } => {
        write!(f, "tree is not clean ({} uncommitted change(s))", entries.len())?;
        for entry in entries.iter().take(10) {
          write!(f, "\n  {}", entry)?;
        }
        Ok(())
      }
      GitError::BranchExists { name, stderr } => {
        write!(f, "Branch '{}' already exists\n{}", name, stderr)
      }
    }
  }
}

/// Version registry errors
#[derive(Debug)]
pub enum RegistryError {
  /// Registry file could not be read or parsed
  Load { path: PathBuf, reason: String },

  /// Alias is not defined in the registry
  MissingAlias { alias: String },

  /// Alias points at a version that has no release entry
  DanglingAlias { alias: String, version: String },

  /// String does not describe a `major.minor.patch` version
  InvalidVersion { value: String },

  /// Patch component cannot be incremented
  PatchOverflow { version: String },
}

impl RegistryError {
  fn help_message(&self) -> Option<String> {
    match self {
      RegistryError::Load { .. } => Some("The registry must be a JSON object with `aliases` and `releases` maps of strings.".to_string()),
      RegistryError::MissingAlias { alias } => Some(format!(
        "Add an `\"{}\"` entry under `aliases` pointing at an existing release.",
        alias
      )),
      _ => None,
    }
  }
}

impl fmt::Display for RegistryError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      RegistryError::Load { path, reason } => {
        write!(f, "Failed to load version registry {}: {}", path.display(), reason)
      }
      RegistryError::MissingAlias { alias } => {
        write!(f, "Alias '{}' not found in version registry", alias)
      }
      RegistryError::DanglingAlias { alias, version } => {
        write!(f, "Alias '{}' points at unknown release '{}'", alias, version)
      }
      RegistryError::InvalidVersion { value } => {
        write!(f, "Invalid version '{}': expected major.minor.patch", value)
      }
      RegistryError::PatchOverflow { version } => {
        write!(f, "Cannot bump patch of release {}: patch number overflows", version)
      }
    }
  }
}

/// External tool errors
#[derive(Debug)]
pub enum ToolError {
  /// Program could not be spawned
  NotFound { program: String, reason: String },

  /// Program exited with a status that was not accepted
  Failed {
    command: String,
    code: Option<i32>,
    stderr: String,
  },
}

impl ToolError {
  fn help_message(&self) -> Option<String> {
    match self {
      ToolError::NotFound { program, .. } => Some(format!("Make sure `{}` is installed and on PATH.", program)),
      ToolError::Failed { .. } => None,
    }
  }
}

impl fmt::Display for ToolError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ToolError::NotFound { program, reason } => {
        write!(f, "Failed to run {}: {}", program, reason)
      }
      ToolError::Failed { command, code, stderr } => {
        match code {
          Some(code) => write!(f, "Command failed with exit code {}: {}", code, command)?,
          None => write!(f, "Command terminated by signal: {}", command)?,
        }
        if !stderr.is_empty() {
          write!(f, "\n{}", stderr)?;
        }
        Ok(())
      }
    }
  }
}

/// Result type alias for emsdk-release
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
