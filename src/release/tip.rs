//! Tip-of-tree resolution
//!
//! When no provenance id is given on the command line, the newest upstream
//! commit is used instead.

use crate::core::config::TipOfTreeConfig;
use crate::core::error::{ReleaseError, ReleaseResult, ToolError};
use crate::core::vcs::SystemGit;
use crate::utils::command_line;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Source of the latest upstream provenance id
pub trait TipOfTree {
  /// Human-readable description for plans and logs
  fn describe(&self) -> String;

  /// Resolve the current tip; failures are fatal to the caller
  fn resolve(&self) -> ReleaseResult<String>;
}

/// Head of a branch on a remote, via `git ls-remote`
pub struct GitRemoteTip<'a> {
  git: &'a SystemGit,
  remote: String,
  branch: String,
}

impl<'a> GitRemoteTip<'a> {
  pub fn new(git: &'a SystemGit, remote: impl Into<String>, branch: impl Into<String>) -> Self {
    Self {
      git,
      remote: remote.into(),
      branch: branch.into(),
    }
  }
}

impl TipOfTree for GitRemoteTip<'_> {
  fn describe(&self) -> String {
    format!("{} ({})", self.remote, self.branch)
  }

  fn resolve(&self) -> ReleaseResult<String> {
    let sha = self.git.ls_remote_head(&self.remote, &self.branch)?;
    tracing::info!(remote = %self.remote, branch = %self.branch, sha = %sha, "resolved tip of tree");
    Ok(sha)
  }
}

/// Trimmed stdout of a command run in the repository root
pub struct CommandTip {
  root: PathBuf,
  program: String,
  args: Vec<String>,
}

impl CommandTip {
  pub fn new(root: &Path, program: impl Into<String>, args: Vec<String>) -> Self {
    Self {
      root: root.to_path_buf(),
      program: program.into(),
      args,
    }
  }

  fn rendered(&self) -> String {
    let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
    command_line(&self.program, &args)
  }
}

impl TipOfTree for CommandTip {
  fn describe(&self) -> String {
    format!("`{}`", self.rendered())
  }

  fn resolve(&self) -> ReleaseResult<String> {
    tracing::debug!(command = %self.rendered(), "resolving tip of tree");
    let output = Command::new(&self.program)
      .args(&self.args)
      .current_dir(&self.root)
      .output()
      .map_err(|e| {
        ReleaseError::Tool(ToolError::NotFound {
          program: self.program.clone(),
          reason: e.to_string(),
        })
      })?;

    if !output.status.success() {
      return Err(ReleaseError::Tool(ToolError::Failed {
        command: self.rendered(),
        code: output.status.code(),
        stderr: String::from_utf8_lossy(&output.stderr).trim_end().to_string(),
      }));
    }

    let tip = String::from_utf8(output.stdout)?.trim().to_string();
    if tip.is_empty() || tip.contains(char::is_whitespace) {
      return Err(ReleaseError::message(format!(
        "Tip-of-tree command `{}` must print a single identifier, got '{}'",
        self.rendered(),
        tip
      )));
    }

    Ok(tip)
  }
}

/// Build the configured resolver
pub fn from_config<'a>(config: &TipOfTreeConfig, root: &Path, git: &'a SystemGit) -> Box<dyn TipOfTree + 'a> {
  match config {
    TipOfTreeConfig::Git { remote, branch } => Box::new(GitRemoteTip::new(git, remote.clone(), branch.clone())),
    TipOfTreeConfig::Command { program, args } => Box::new(CommandTip::new(root, program.clone(), args.clone())),
  }
}
