//! Integration tests for `emsdk-release promote`

use crate::helpers::{BASIC_REGISTRY, OFFLINE_CONFIG, TestRepo, git, run_cli, run_cli_ok};
use anyhow::Result;

const PROMOTED_REGISTRY: &str = r#"{
  "aliases": {
    "latest": "1.0.1"
  },
  "releases": {
    "1.0.1": "def",
    "1.0.0": "abc"
  }
}
"#;

#[test]
fn test_promote_with_explicit_provenance() -> Result<()> {
  let repo = TestRepo::basic()?;

  let output = run_cli_ok(&repo.path, &["promote", "def"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("Creating new release: 1.0.1 -> def"), "stdout: {}", stdout);
  assert!(stdout.contains("`version_1_0_1`"), "stdout: {}", stdout);
  assert_eq!(repo.current_branch()?, "version_1_0_1");
  assert_eq!(repo.registry()?, PROMOTED_REGISTRY);
  assert_eq!(repo.head_subject()?, "1.0.1");
  assert_eq!(repo.head_files()?, vec!["emscripten-releases-tags.json"]);

  Ok(())
}

#[test]
fn test_promote_uses_tip_of_tree_command() -> Result<()> {
  let repo = TestRepo::basic()?;

  run_cli_ok(&repo.path, &["promote"])?;

  let registry: serde_json::Value = serde_json::from_str(&repo.registry()?)?;
  assert_eq!(registry["releases"]["1.0.1"], "feedface");
  assert_eq!(registry["aliases"]["latest"], "1.0.1");

  Ok(())
}

#[test]
fn test_promote_uses_git_remote_tip() -> Result<()> {
  let upstream = TestRepo::basic()?;
  upstream.write_file("DEPS", "chromium_revision = 1\n")?;
  let upstream_head = upstream.commit("Roll dependencies")?;

  let config = format!(
    r#"[promote]
hook = false

[promote.tip_of_tree]
kind = "git"
remote = "{}"
branch = "main"
"#,
    upstream.path.display()
  );
  let repo = TestRepo::new(BASIC_REGISTRY, &config)?;

  run_cli_ok(&repo.path, &["promote"])?;

  let registry: serde_json::Value = serde_json::from_str(&repo.registry()?)?;
  assert_eq!(registry["releases"]["1.0.1"], upstream_head.as_str());

  Ok(())
}

#[test]
fn test_dirty_tree_exits_one_and_changes_nothing() -> Result<()> {
  let repo = TestRepo::basic()?;
  repo.write_file("notes.txt", "work in progress")?;

  let output = run_cli(&repo.path, &["promote", "def"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(1));
  assert!(stderr.contains("tree is not clean"), "stderr: {}", stderr);
  assert_eq!(repo.registry()?, BASIC_REGISTRY);
  assert_eq!(repo.current_branch()?, "main");
  assert!(!repo.branch_exists("version_1_0_1"));

  Ok(())
}

#[test]
fn test_modified_tracked_file_counts_as_dirty() -> Result<()> {
  let repo = TestRepo::basic()?;
  repo.write_file("TIP", "changed\n")?;

  let output = run_cli(&repo.path, &["promote", "def"])?;

  assert_eq!(output.status.code(), Some(1));
  assert_eq!(repo.registry()?, BASIC_REGISTRY);

  Ok(())
}

#[test]
fn test_existing_branch_fails_without_writing() -> Result<()> {
  let repo = TestRepo::basic()?;
  git(&repo.path, &["branch", "version_1_0_1"])?;

  let output = run_cli(&repo.path, &["promote", "def"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);

  assert_eq!(output.status.code(), Some(2));
  assert!(stderr.contains("version_1_0_1"), "stderr: {}", stderr);
  assert_eq!(repo.registry()?, BASIC_REGISTRY);
  assert_eq!(repo.current_branch()?, "main");

  Ok(())
}

#[test]
fn test_hook_output_is_committed() -> Result<()> {
  let config = r#"[promote]
hook = { program = "sh", args = ["scripts/regen.sh"] }
"#;
  let repo = TestRepo::new(BASIC_REGISTRY, config)?;
  repo.write_file("scripts/regen.sh", "cp emscripten-releases-tags.json bazel/revisions.json\n")?;
  repo.write_file("bazel/revisions.json", "{}\n")?;
  repo.commit("Add regeneration script")?;

  run_cli_ok(&repo.path, &["promote", "def"])?;

  assert_eq!(repo.read_file("bazel/revisions.json")?, PROMOTED_REGISTRY);
  let mut files = repo.head_files()?;
  files.sort();
  assert_eq!(files, vec!["bazel/revisions.json", "emscripten-releases-tags.json"]);

  Ok(())
}

#[test]
fn test_failing_hook_leaves_partial_state() -> Result<()> {
  let config = r#"[promote]
hook = { program = "sh", args = ["-c", "exit 4"] }
"#;
  let repo = TestRepo::new(BASIC_REGISTRY, config)?;

  let output = run_cli(&repo.path, &["promote", "def"])?;

  assert_eq!(output.status.code(), Some(2));
  // Branch and registry stay for the operator to inspect; nothing is committed
  assert_eq!(repo.current_branch()?, "version_1_0_1");
  assert_eq!(repo.registry()?, PROMOTED_REGISTRY);
  assert_eq!(repo.head_subject()?, "Initial registry");

  Ok(())
}

#[test]
fn test_dry_run_touches_nothing() -> Result<()> {
  let repo = TestRepo::basic()?;

  let output = run_cli_ok(&repo.path, &["promote", "def", "--dry-run"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("DRY-RUN"), "stdout: {}", stdout);
  assert!(stdout.contains("version_1_0_1"), "stdout: {}", stdout);
  assert!(stdout.contains("1.0.0 → 1.0.1"), "stdout: {}", stdout);
  assert_eq!(repo.registry()?, BASIC_REGISTRY);
  assert_eq!(repo.current_branch()?, "main");
  assert!(!repo.branch_exists("version_1_0_1"));

  Ok(())
}

#[test]
fn test_dry_run_json() -> Result<()> {
  let repo = TestRepo::basic()?;

  let output = run_cli_ok(&repo.path, &["promote", "--dry-run", "--json"])?;
  let report: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(report["release"]["branch"], "version_1_0_1");
  assert_eq!(report["release"]["provenance"], "feedface");
  assert!(report["release"]["commit"].is_null());
  assert_eq!(report["plan"]["metadata"]["operation_type"], "promote");
  assert_eq!(report["plan"]["operations"][0]["type"], "create_branch");
  assert_eq!(report["plan"]["operations"][1]["type"], "write_file");

  Ok(())
}

#[test]
fn test_promote_json_outcome() -> Result<()> {
  let repo = TestRepo::basic()?;

  let output = run_cli_ok(&repo.path, &["promote", "def", "--json"])?;
  let outcome: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(outcome["previous_version"], "1.0.0");
  assert_eq!(outcome["version"], "1.0.1");
  assert_eq!(outcome["provenance"], "def");
  assert_eq!(outcome["branch"], "version_1_0_1");
  assert_eq!(outcome["registry_path"], "emscripten-releases-tags.json");
  assert_eq!(outcome["commit"].as_str().map(str::len), Some(40));

  Ok(())
}

#[test]
fn test_json_outcome_survives_noisy_hook() -> Result<()> {
  let config = r#"[promote]
hook = { program = "sh", args = ["-c", "echo regenerating bazel workspace; echo warning >&2"] }
"#;
  let repo = TestRepo::new(BASIC_REGISTRY, config)?;

  let output = run_cli_ok(&repo.path, &["promote", "def", "--json"])?;
  let outcome: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(outcome["version"], "1.0.1");
  assert_eq!(outcome["branch"], "version_1_0_1");
  // hook output is still visible, just not on stdout
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("regenerating bazel workspace"), "stderr: {}", stderr);
  assert!(stderr.contains("warning"));

  Ok(())
}

#[test]
fn test_hook_output_reaches_stdout_without_json() -> Result<()> {
  let config = r#"[promote]
hook = { program = "sh", args = ["-c", "echo regenerating bazel workspace"] }
"#;
  let repo = TestRepo::new(BASIC_REGISTRY, config)?;

  let output = run_cli_ok(&repo.path, &["promote", "def"])?;

  assert!(String::from_utf8_lossy(&output.stdout).contains("regenerating bazel workspace"));

  Ok(())
}

#[test]
fn test_patch_overflow_is_validation_error() -> Result<()> {
  let registry = r#"{
  "aliases": {
    "latest": "1.0.18446744073709551615"
  },
  "releases": {
    "1.0.18446744073709551615": "abc"
  }
}
"#;
  let repo = TestRepo::new(registry, OFFLINE_CONFIG)?;

  let output = run_cli(&repo.path, &["promote", "def"])?;

  assert_eq!(output.status.code(), Some(3));
  assert!(String::from_utf8_lossy(&output.stderr).contains("overflows"));
  assert_eq!(repo.registry()?, registry);
  assert_eq!(repo.current_branch()?, "main");

  Ok(())
}

#[test]
fn test_versions_sort_numerically() -> Result<()> {
  let registry = r#"{
  "aliases": {
    "latest": "1.10.0"
  },
  "releases": {
    "1.9.0": "old",
    "1.10.0": "new"
  }
}
"#;
  let repo = TestRepo::new(registry, OFFLINE_CONFIG)?;

  run_cli_ok(&repo.path, &["promote", "next"])?;

  let written = repo.registry()?;
  let first = written.find("\"1.10.1\"").unwrap();
  let second = written.find("\"1.10.0\"").unwrap();
  let third = written.find("\"1.9.0\"").unwrap();
  assert!(first < second && second < third, "registry: {}", written);
  assert_eq!(repo.current_branch()?, "version_1_10_1");

  Ok(())
}

#[test]
fn test_missing_alias_is_validation_error() -> Result<()> {
  let config = format!("[registry]\nlatest_alias = \"stable\"\n\n{}", OFFLINE_CONFIG);
  let repo = TestRepo::new(BASIC_REGISTRY, &config)?;

  let output = run_cli(&repo.path, &["promote", "def"])?;

  assert_eq!(output.status.code(), Some(3));
  assert!(!repo.branch_exists("version_1_0_1"));

  Ok(())
}

#[test]
fn test_repo_flag_from_outside() -> Result<()> {
  let repo = TestRepo::basic()?;
  let elsewhere = tempfile::TempDir::new()?;

  let repo_arg = repo.path.to_string_lossy().to_string();
  run_cli_ok(elsewhere.path(), &["--repo", &repo_arg, "promote", "def"])?;

  assert_eq!(repo.registry()?, PROMOTED_REGISTRY);

  Ok(())
}

#[test]
fn test_not_a_repository() -> Result<()> {
  let dir = tempfile::TempDir::new()?;

  let output = run_cli(dir.path(), &["promote", "def"])?;

  assert_eq!(output.status.code(), Some(2));

  Ok(())
}
