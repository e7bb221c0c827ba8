//! Release promotion: bump the registry and cut a release branch
//!
//! The workflow is strictly sequential and never retried:
//!
//! 1. Refuse to start unless the working tree is clean
//! 2. Load the registry and bump the patch of the `latest` alias
//! 3. Create and checkout `version_X_Y_Z`
//! 4. Resolve the provenance id (argument or tip of tree)
//! 5. Record the release, rewrite the registry, run the regeneration hook
//! 6. Stage tracked files and commit with the version as message
//!
//! A failure after step 3 leaves the branch and any written files behind for
//! the operator to inspect.

use super::hook::RegenerationHook;
use super::registry::VersionRegistry;
use super::tip::{self, TipOfTree};
use super::version::Version;
use crate::core::context::RepoContext;
use crate::core::error::ReleaseResult;
use crate::core::executor::Executor;
use crate::core::plan::{Operation, OperationType, Plan};
use crate::core::vcs::SystemGit;
use serde::Serialize;
use std::path::PathBuf;

/// What a promotion produced (or would produce, for a preview)
#[derive(Debug, Clone, Serialize)]
pub struct PromotionOutcome {
  pub previous_version: Version,
  pub version: Version,
  pub provenance: String,
  pub branch: String,
  pub registry_path: PathBuf,
  /// Commit created on the release branch; `None` for previews
  pub commit: Option<String>,
}

/// Registry state after the pre-branch steps
struct Prepared {
  registry: VersionRegistry,
  previous: Version,
  next: Version,
  branch: String,
}

/// Drives a single promotion against one repository
pub struct Promoter<'a> {
  ctx: &'a RepoContext,
  git: &'a SystemGit,
  tip: Box<dyn TipOfTree + 'a>,
  hook: Option<RegenerationHook>,
  quiet: bool,
}

impl<'a> Promoter<'a> {
  /// Promoter wired from the repository configuration
  pub fn new(ctx: &'a RepoContext, git: &'a SystemGit) -> Self {
    let promote = &ctx.config.promote;
    Self {
      ctx,
      git,
      tip: tip::from_config(&promote.tip_of_tree, &ctx.root, git),
      hook: promote
        .hook
        .command()
        .map(|cmd| RegenerationHook::from_config(&cmd, &ctx.root)),
      quiet: false,
    }
  }

  /// Suppress progress lines on stdout (for `--json`)
  pub fn quiet(mut self, quiet: bool) -> Self {
    self.quiet = quiet;
    self
  }

  /// Replace the tip-of-tree resolver
  #[cfg(test)]
  pub fn with_tip(mut self, tip: Box<dyn TipOfTree + 'a>) -> Self {
    self.tip = tip;
    self
  }

  /// Run the full promotion
  pub fn promote(&self, explicit_provenance: Option<String>) -> ReleaseResult<PromotionOutcome> {
    let Prepared {
      mut registry,
      previous,
      next,
      branch,
    } = self.prepare()?;

    self.progress(format_args!("🔀 Creating branch {}", branch));
    self.git.create_and_checkout_branch(&branch)?;

    let provenance = self.resolve_provenance(explicit_provenance)?;
    self.progress(format_args!("📦 Creating new release: {} -> {}", next, provenance));

    registry.record_release(&self.ctx.config.registry.latest_alias, &next, &provenance);
    registry.save(&self.ctx.registry_path())?;
    Executor::with_git(&self.ctx.root, self.git)
      .quiet(self.quiet)
      .execute(&self.commit_plan(&next))?;

    let commit = self.git.head_commit()?;
    tracing::info!(version = %next, branch = %branch, commit = %commit, "release promoted");

    Ok(PromotionOutcome {
      previous_version: previous,
      version: next,
      provenance,
      branch,
      registry_path: self.ctx.config.registry.path.clone(),
      commit: Some(commit),
    })
  }

  /// Compute the promotion without touching the repository
  ///
  /// The tip of tree is still queried when no provenance is given.
  pub fn preview(&self, explicit_provenance: Option<String>) -> ReleaseResult<(Plan, PromotionOutcome)> {
    let Prepared {
      mut registry,
      previous,
      next,
      branch,
    } = self.prepare()?;
    let provenance = self.resolve_provenance(explicit_provenance)?;
    registry.record_release(&self.ctx.config.registry.latest_alias, &next, &provenance);
    registry.validate()?;

    let mut plan = Plan::new(OperationType::Promote, Some(next.to_string())).with_summary(format!(
      "   {} → {} (provenance {})",
      previous, next, provenance
    ));
    plan.add_operation(Operation::CreateBranch { name: branch.clone() });
    plan.add_operation(Operation::WriteFile {
      path: self.ctx.config.registry.path.to_string_lossy().to_string(),
      contents: registry.to_json_string()?,
    });
    plan.add_operations(self.commit_plan(&next).operations);

    let outcome = PromotionOutcome {
      previous_version: previous,
      version: next,
      provenance,
      branch,
      registry_path: self.ctx.config.registry.path.clone(),
      commit: None,
    };
    Ok((plan, outcome))
  }

  /// Steps 1-5: clean-tree check, registry load, next version, branch name
  fn prepare(&self) -> ReleaseResult<Prepared> {
    self.git.ensure_clean()?;

    let registry = VersionRegistry::load(&self.ctx.registry_path())?;
    let previous = registry.resolve_version(&self.ctx.config.registry.latest_alias)?;
    let next = previous.bump_patch()?;
    let branch = next.branch_name(&self.ctx.config.promote.branch_prefix);

    tracing::debug!(previous = %previous, next = %next, branch = %branch, "computed next release");
    Ok(Prepared {
      registry,
      previous,
      next,
      branch,
    })
  }

  fn resolve_provenance(&self, explicit: Option<String>) -> ReleaseResult<String> {
    match explicit {
      Some(id) => Ok(id),
      None => {
        self.progress(format_args!("🔎 Resolving tip of tree from {}", self.tip.describe()));
        self.tip.resolve()
      }
    }
  }

  fn progress(&self, line: std::fmt::Arguments<'_>) {
    if !self.quiet {
      println!("{}", line);
    }
  }

  /// Steps after the registry is written: regenerate, stage, commit
  fn commit_plan(&self, version: &Version) -> Plan {
    let mut plan = Plan::new(OperationType::Promote, Some(version.to_string()));
    if let Some(hook) = &self.hook {
      plan.add_operation(hook.operation());
    }
    plan.add_operation(Operation::StageTracked);
    plan.add_operation(Operation::Commit {
      message: version.to_string(),
    });
    plan
  }
}
