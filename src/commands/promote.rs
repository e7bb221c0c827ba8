use crate::core::context::RepoContext;
use crate::core::error::ReleaseResult;
use crate::core::plan::Plan;
use crate::release::{PromotionOutcome, Promoter};
use serde::Serialize;

/// Dry-run report for `--json`
#[derive(Serialize)]
struct PreviewReport<'a> {
  plan: &'a Plan,
  release: &'a PromotionOutcome,
}

/// Run the promote command
///
/// Executes immediately unless `dry_run` is set; the workflow is short and
/// every step it takes is visible in git afterwards.
pub fn run_promote(ctx: &RepoContext, provenance: Option<String>, dry_run: bool, json: bool) -> ReleaseResult<()> {
  let git = ctx.git()?;
  let promoter = Promoter::new(ctx, &git).quiet(json);

  if dry_run {
    let (plan, outcome) = promoter.preview(provenance)?;
    if json {
      let report = PreviewReport {
        plan: &plan,
        release: &outcome,
      };
      println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
      println!("\n🔍 DRY-RUN MODE - No changes will be made\n");
      println!("{}", plan.to_human_readable());
      println!("✋ To create this release, run:");
      println!("   emsdk-release promote {}", outcome.provenance);
      println!();
    }
    return Ok(());
  }

  let outcome = promoter.promote(provenance)?;

  if json {
    println!("{}", serde_json::to_string_pretty(&outcome)?);
  } else {
    println!("🎉 New release created in branch: `{}`", outcome.branch);
    println!("\n📌 Next steps:");
    println!("   1. Review the commit on {}", outcome.branch);
    println!("   2. Push the branch and open a pull request");
  }

  Ok(())
}
