//! Integration tests for `emsdk-release package-python` (plan mode only)

use crate::helpers::{BASIC_REGISTRY, OFFLINE_CONFIG, TestRepo, run_cli, run_cli_ok};
use anyhow::Result;

#[test]
fn test_windows_plans_are_printed_not_run() -> Result<()> {
  let repo = TestRepo::basic()?;

  let output = run_cli_ok(
    &repo.path,
    &["package-python", "--target", "windows-amd64", "--target", "windows-win32"],
  )?;
  let stdout = String::from_utf8_lossy(&output.stdout);

  assert!(stdout.contains("DRY-RUN"), "stdout: {}", stdout);
  assert!(stdout.contains("windows-amd64"));
  assert!(stdout.contains("windows-win32"));
  assert!(stdout.contains("pywin32-227.win-amd64-py3.9.exe"));
  assert!(stdout.contains("pywin32-227.win32-py3.9.exe"));
  assert!(stdout.contains(
    "gs://webassembly/emscripten-releases-builds/deps/python-3.9.2-1-embed-win32+pywin32.zip"
  ));
  assert!(!repo.path.join("python-embed").exists());

  Ok(())
}

#[test]
fn test_json_plans_follow_config() -> Result<()> {
  let config = format!(
    "{}\n[python]\nversion = \"3.11.4\"\nrevision = \"2\"\nupload_base = \"gs://example-bucket/deps/\"\n",
    OFFLINE_CONFIG
  );
  let repo = TestRepo::new(BASIC_REGISTRY, &config)?;

  let output = run_cli_ok(&repo.path, &["package-python", "--target", "linux", "--json"])?;
  let plans: serde_json::Value = serde_json::from_slice(&output.stdout)?;
  let plans = plans.as_array().unwrap();

  assert_eq!(plans.len(), 1);
  assert_eq!(plans[0]["metadata"]["target"], "linux");
  assert_eq!(plans[0]["metadata"]["is_destructive"], true);

  let operations = plans[0]["operations"].as_array().unwrap();
  assert_eq!(operations[0]["type"], "clone");
  let upload = operations.last().unwrap();
  assert_eq!(upload["type"], "upload");
  assert_eq!(upload["file"], "python-3.11.4-2-linux.tar.gz");
  assert_eq!(upload["url"], "gs://example-bucket/deps/python-3.11.4-2-linux.tar.gz");

  Ok(())
}

#[test]
fn test_unknown_target_rejected() -> Result<()> {
  let repo = TestRepo::basic()?;

  let output = run_cli(&repo.path, &["package-python", "--target", "solaris"])?;

  assert!(!output.status.success());
  assert!(String::from_utf8_lossy(&output.stderr).contains("solaris"));

  Ok(())
}

#[test]
fn test_invalid_python_version_is_config_error() -> Result<()> {
  let config = "[python]\nversion = \"3.9\"\n";
  let repo = TestRepo::new(BASIC_REGISTRY, config)?;

  let output = run_cli(&repo.path, &["package-python", "--target", "linux"])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("python.version"));

  Ok(())
}

#[test]
fn test_source_build_for_other_platform_refused_on_apply() -> Result<()> {
  let repo = TestRepo::basic()?;
  let foreign = if cfg!(target_os = "macos") { "linux" } else { "macos-arm64" };
  let workdir = tempfile::TempDir::new()?;
  let workdir_arg = workdir.path().to_string_lossy().to_string();

  let output = run_cli(
    &repo.path,
    &["package-python", "--target", foreign, "--workdir", &workdir_arg, "--apply"],
  )?;

  assert_eq!(output.status.code(), Some(1));
  assert!(String::from_utf8_lossy(&output.stderr).contains("cannot be built"));
  assert!(std::fs::read_dir(workdir.path())?.next().is_none());

  Ok(())
}
