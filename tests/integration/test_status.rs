//! Integration tests for `emsdk-release status`

use crate::helpers::{OFFLINE_CONFIG, TestRepo, run_cli, run_cli_ok};
use anyhow::Result;

const CHAINED_REGISTRY: &str = r#"{
  "aliases": {
    "latest": "2.0.1",
    "latest-sdk": "latest"
  },
  "releases": {
    "2.0.1": "bbb",
    "2.0.0": "aaa"
  }
}
"#;

#[test]
fn test_status_lists_aliases_and_releases() -> Result<()> {
  let repo = TestRepo::new(CHAINED_REGISTRY, OFFLINE_CONFIG)?;

  let output = run_cli_ok(&repo.path, &["status"])?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("2 releases"), "stdout: {}", stdout);
  assert!(stdout.contains("latest-sdk"));
  assert!(stdout.contains("bbb"));
  assert!(stdout.contains("Branch: main"));

  Ok(())
}

#[test]
fn test_status_json_resolves_chains() -> Result<()> {
  let repo = TestRepo::new(CHAINED_REGISTRY, OFFLINE_CONFIG)?;

  let output = run_cli_ok(&repo.path, &["status", "--json"])?;
  let status: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(status["release_count"], 2);
  assert_eq!(status["clean"], true);
  assert_eq!(status["aliases"][1]["name"], "latest-sdk");
  assert_eq!(status["aliases"][1]["target"], "latest");
  assert_eq!(status["aliases"][1]["version"], "2.0.1");
  assert_eq!(status["releases"][0]["version"], "2.0.1");

  Ok(())
}

#[test]
fn test_status_after_promote() -> Result<()> {
  let repo = TestRepo::basic()?;
  run_cli_ok(&repo.path, &["promote", "def"])?;

  let output = run_cli_ok(&repo.path, &["status", "--json"])?;
  let status: serde_json::Value = serde_json::from_slice(&output.stdout)?;

  assert_eq!(status["branch"], "version_1_0_1");
  assert_eq!(status["aliases"][0]["version"], "1.0.1");

  Ok(())
}

#[test]
fn test_dangling_alias_fails_load() -> Result<()> {
  let registry = r#"{
  "aliases": {
    "latest": "9.9.9"
  },
  "releases": {
    "1.0.0": "abc"
  }
}
"#;
  let repo = TestRepo::new(registry, OFFLINE_CONFIG)?;

  let output = run_cli(&repo.path, &["status"])?;

  assert_eq!(output.status.code(), Some(3));
  assert!(String::from_utf8_lossy(&output.stderr).contains("9.9.9"));

  Ok(())
}
