//! `release.toml` loading
//!
//! Registry location, promotion settings and Python build inputs. A missing
//! file means emsdk defaults throughout.

use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use crate::package::BuildConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for emsdk-release
/// Searched in order: release.toml, .release.toml, .config/release.toml
///
/// Every field has an emsdk default, so the file is optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReleaseConfig {
  #[serde(default)]
  pub registry: RegistryConfig,
  #[serde(default)]
  pub promote: PromoteConfig,
  #[serde(default)]
  pub python: BuildConfig,
}

/// Location and alias of the version registry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
  /// Registry file, relative to the repository root
  #[serde(default = "default_registry_path")]
  pub path: PathBuf,

  /// Alias that tracks the newest release
  #[serde(default = "default_latest_alias")]
  pub latest_alias: String,
}

fn default_registry_path() -> PathBuf {
  PathBuf::from("emscripten-releases-tags.json")
}

fn default_latest_alias() -> String {
  "latest".to_string()
}

impl Default for RegistryConfig {
  fn default() -> Self {
    Self {
      path: default_registry_path(),
      latest_alias: default_latest_alias(),
    }
  }
}

/// Settings for `emsdk-release promote`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PromoteConfig {
  /// Literal tag in front of `X_Y_Z` in release branch names
  #[serde(default = "default_branch_prefix")]
  pub branch_prefix: String,

  /// Workspace-regeneration hook, or `false` to skip it
  #[serde(default)]
  pub hook: HookSetting,

  /// Where the provenance id comes from when none is given on the command line
  #[serde(default)]
  pub tip_of_tree: TipOfTreeConfig,
}

fn default_branch_prefix() -> String {
  "version_".to_string()
}

impl Default for PromoteConfig {
  fn default() -> Self {
    Self {
      branch_prefix: default_branch_prefix(),
      hook: HookSetting::default(),
      tip_of_tree: TipOfTreeConfig::default(),
    }
  }
}

/// `hook = false` disables the hook, a table overrides the command
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HookSetting {
  Enabled(CommandConfig),
  Toggle(bool),
}

impl HookSetting {
  /// Resolve to the command to run, if any
  pub fn command(&self) -> Option<CommandConfig> {
    match self {
      HookSetting::Enabled(cmd) => Some(cmd.clone()),
      HookSetting::Toggle(true) => Some(CommandConfig::default_hook()),
      HookSetting::Toggle(false) => None,
    }
  }
}

impl Default for HookSetting {
  fn default() -> Self {
    HookSetting::Enabled(CommandConfig::default_hook())
  }
}

/// An external command: program plus arguments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommandConfig {
  pub program: String,
  #[serde(default)]
  pub args: Vec<String>,
}

impl CommandConfig {
  fn default_hook() -> Self {
    Self {
      program: "scripts/update_bazel_workspace.sh".to_string(),
      args: Vec::new(),
    }
  }
}

/// Tip-of-tree resolver selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum TipOfTreeConfig {
  /// Head of a branch on an upstream git remote
  Git { remote: String, branch: String },
  /// Trimmed stdout of a command
  Command {
    program: String,
    #[serde(default)]
    args: Vec<String>,
  },
}

impl Default for TipOfTreeConfig {
  fn default() -> Self {
    TipOfTreeConfig::Git {
      remote: "https://chromium.googlesource.com/emscripten-releases".to_string(),
      branch: "main".to_string(),
    }
  }
}

impl ReleaseConfig {
  /// Find config file in search order: release.toml, .release.toml, .config/release.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("release.toml"),
      path.join(".release.toml"),
      path.join(".config").join("release.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load config from the repository root, falling back to defaults when absent
  pub fn load(path: &Path) -> ReleaseResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      tracing::debug!(root = %path.display(), "no release.toml found, using defaults");
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config = Self::parse(&content).map_err(|e| match e {
      ReleaseError::Message { message, .. } => ReleaseError::Config(ConfigError::Parse {
        path: config_path.clone(),
        reason: message,
      }),
      other => other,
    })?;

    tracing::debug!(path = %config_path.display(), "loaded config");
    Ok(config)
  }

  /// Parse and validate config text
  pub fn parse(content: &str) -> ReleaseResult<Self> {
    let config: ReleaseConfig = toml_edit::de::from_str(content)?;
    config.validate()?;
    Ok(config)
  }

  /// Validate field values that serde cannot check
  pub fn validate(&self) -> ReleaseResult<()> {
    if self.registry.latest_alias.trim().is_empty() {
      return Err(ReleaseError::Config(ConfigError::InvalidValue {
        field: "registry.latest_alias".to_string(),
        reason: "must not be empty".to_string(),
      }));
    }

    if self.registry.path.is_absolute() {
      return Err(ReleaseError::Config(ConfigError::InvalidValue {
        field: "registry.path".to_string(),
        reason: "must be relative to the repository root".to_string(),
      }));
    }

    if self.promote.branch_prefix.chars().any(|c| c.is_whitespace() || c == '~' || c == ':') {
      return Err(ReleaseError::Config(ConfigError::InvalidValue {
        field: "promote.branch_prefix".to_string(),
        reason: format!("'{}' is not usable in a git branch name", self.promote.branch_prefix),
      }));
    }

    self.python.validate()?;
    Ok(())
  }
}
