//! Workspace-regeneration hook
//!
//! After the registry is rewritten, an external script regenerates files that
//! are derived from it (Bazel revision tables in emsdk). What it does is its
//! own business; only its exit status matters here.

use crate::core::config::CommandConfig;
use crate::core::plan::Operation;
use std::path::Path;

/// An external command run from the repository root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegenerationHook {
  program: String,
  args: Vec<String>,
}

impl RegenerationHook {
  /// Resolve the configured program against the repository root
  ///
  /// Programs with a path separator (`scripts/update_bazel_workspace.sh`) are
  /// repository-relative; bare names are looked up on PATH.
  pub fn from_config(config: &CommandConfig, root: &Path) -> Self {
    let program = if config.program.contains('/') || config.program.contains('\\') {
      root.join(&config.program).to_string_lossy().to_string()
    } else {
      config.program.clone()
    };

    Self {
      program,
      args: config.args.clone(),
    }
  }

  /// Plan step that runs the hook with the repository root as cwd
  pub fn operation(&self) -> Operation {
    Operation::run(self.program.clone(), self.args.clone())
  }
}
