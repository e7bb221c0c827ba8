use crate::core::context::RepoContext;
use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use crate::core::executor::Executor;
use crate::core::plan::Plan;
use crate::package::{Host, Recipes, Target};
use std::path::PathBuf;

/// Run the package-python command
///
/// Prints the plans unless `apply` is set. Plans run in `workdir` (default:
/// the current directory), where downloads are cached between runs.
pub fn run_package_python(
  ctx: &RepoContext,
  targets: Vec<Target>,
  workdir: Option<PathBuf>,
  apply: bool,
  json: bool,
) -> ReleaseResult<()> {
  let host = Host::current();
  let targets = if targets.is_empty() {
    host.default_targets()?
  } else {
    dedup(targets)
  };

  let recipes = Recipes::new(&ctx.config.python);
  let plans: Vec<Plan> = targets.iter().map(|t| recipes.plan(*t)).collect();

  if !apply {
    if json {
      println!("{}", serde_json::to_string_pretty(&plans)?);
    } else {
      println!("\n🔍 DRY-RUN MODE - No changes will be made");
      println!("   Add --apply to build and upload\n");
      for plan in &plans {
        println!("{}", plan.to_human_readable());
      }
    }
    return Ok(());
  }

  for target in &targets {
    if !target.buildable_on(&host) {
      return Err(ReleaseError::with_help(
        format!("Target {} cannot be built on {}-{}", target, host.os, host.arch),
        "Source builds must run on the platform they target",
      ));
    }
  }

  let workdir = match workdir {
    Some(dir) => dir,
    None => std::env::current_dir()?,
  };
  std::fs::create_dir_all(&workdir).with_context(|| format!("Failed to create {}", workdir.display()))?;

  if !json {
    println!("\n🚀 APPLY MODE - Building in {}\n", workdir.display());
  }
  let executor = Executor::new(&workdir).quiet(json);
  let mut built = Vec::new();
  for (target, plan) in targets.iter().zip(&plans) {
    if !json {
      println!("🔨 Packaging {}...", target);
    }
    executor.execute(plan)?;
    built.push(recipes.artifact_name(*target));
  }

  if json {
    println!("{}", serde_json::to_string_pretty(&built)?);
  } else {
    println!("\n🎉 Uploaded:");
    for name in &built {
      println!("   • {}", ctx.config.python.upload_url(name));
    }
  }

  Ok(())
}

fn dedup(targets: Vec<Target>) -> Vec<Target> {
  let mut seen = Vec::with_capacity(targets.len());
  for t in targets {
    if !seen.contains(&t) {
      seen.push(t);
    }
  }
  seen
}
