use crate::core::context::RepoContext;
use crate::core::error::ReleaseResult;
use crate::release::VersionRegistry;
use serde::Serialize;

/// Releases shown in the human-readable listing
const RECENT_RELEASES: usize = 10;

/// An alias and the release it ends up at
#[derive(Debug, Clone, Serialize)]
pub struct AliasStatus {
  pub name: String,
  /// Raw value in the registry (a version or another alias)
  pub target: String,
  pub version: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReleaseStatus {
  pub version: String,
  pub provenance: String,
}

/// Registry summary
#[derive(Debug, Clone, Serialize)]
pub struct RegistryStatus {
  pub path: String,
  pub branch: String,
  pub clean: bool,
  pub release_count: usize,
  pub aliases: Vec<AliasStatus>,
  pub releases: Vec<ReleaseStatus>,
}

/// Run the status command (read-only)
pub fn run_status(ctx: &RepoContext, json: bool) -> ReleaseResult<()> {
  let git = ctx.git()?;
  let registry = VersionRegistry::load(&ctx.registry_path())?;

  let mut aliases = Vec::with_capacity(registry.aliases.len());
  for (name, target) in registry.aliases.iter() {
    aliases.push(AliasStatus {
      name: name.to_string(),
      target: target.to_string(),
      version: registry.resolve_alias(name)?.to_string(),
    });
  }

  let status = RegistryStatus {
    path: ctx.config.registry.path.to_string_lossy().to_string(),
    branch: git.current_branch()?,
    clean: git.is_clean()?,
    release_count: registry.releases.len(),
    aliases,
    releases: registry
      .releases
      .iter()
      .map(|(version, provenance)| ReleaseStatus {
        version: version.to_string(),
        provenance: provenance.to_string(),
      })
      .collect(),
  };

  if json {
    println!("{}", serde_json::to_string_pretty(&status)?);
  } else {
    print_status(&status);
  }

  Ok(())
}

fn print_status(status: &RegistryStatus) {
  println!("\n📊 {} ({} releases)", status.path, status.release_count);
  println!(
    "   Branch: {}{}\n",
    status.branch,
    if status.clean { "" } else { " (uncommitted changes)" }
  );

  println!("{:<20} {:<12} VERSION", "ALIAS", "TARGET");
  println!("{:-<60}", "");
  for alias in &status.aliases {
    println!("{:<20} {:<12} {}", alias.name, alias.target, alias.version);
  }

  println!("\n{:<12} PROVENANCE", "RELEASE");
  println!("{:-<60}", "");
  for release in status.releases.iter().take(RECENT_RELEASES) {
    println!("{:<12} {}", release.version, release.provenance);
  }
  if status.release_count > RECENT_RELEASES {
    println!("... {} older", status.release_count - RECENT_RELEASES);
  }
  println!();
}
