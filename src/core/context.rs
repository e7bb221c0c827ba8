//! Repository context - build once, pass everywhere
//!
//! The repository root and configuration are resolved a single time in
//! main.rs and handed to every command by reference. Nothing below the
//! command layer reads the process's current directory.

use crate::core::config::ReleaseConfig;
use crate::core::error::ReleaseResult;
use crate::core::vcs::SystemGit;
use std::path::{Path, PathBuf};

/// Shared repository-level data for all commands
pub struct RepoContext {
  /// Repository top level (absolute path)
  pub root: PathBuf,

  /// Configuration (defaults when no release.toml exists)
  pub config: ReleaseConfig,
}

impl RepoContext {
  /// Build context from any directory inside the repository.
  ///
  /// The git top level becomes the root, so running from a subdirectory
  /// behaves the same as running from the checkout root.
  pub fn build(start: &Path) -> ReleaseResult<Self> {
    let git = SystemGit::open(start)?;
    let root = git.work_tree().to_path_buf();
    let config = ReleaseConfig::load(&root)?;

    tracing::debug!(root = %root.display(), "repository context ready");
    Ok(Self { root, config })
  }

  /// Build context from an explicit root and config (no git discovery)
  #[cfg(test)]
  pub fn with_config(root: impl Into<PathBuf>, config: ReleaseConfig) -> Self {
    Self {
      root: root.into(),
      config,
    }
  }

  /// Open the git repository at the root
  pub fn git(&self) -> ReleaseResult<SystemGit> {
    SystemGit::open(&self.root)
  }

  /// Absolute path of the version registry file
  pub fn registry_path(&self) -> PathBuf {
    self.root.join(&self.config.registry.path)
  }
}
