//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Registry with one release, as in a freshly bootstrapped emsdk checkout
pub const BASIC_REGISTRY: &str = r#"{
  "aliases": {
    "latest": "1.0.0"
  },
  "releases": {
    "1.0.0": "abc"
  }
}
"#;

/// Config that skips the regeneration hook and never touches the network
pub const OFFLINE_CONFIG: &str = r#"[promote]
hook = false

[promote.tip_of_tree]
kind = "command"
program = "cat"
args = ["TIP"]
"#;

/// A test emsdk checkout with git history
pub struct TestRepo {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestRepo {
  /// Repository holding `registry` and `config`, committed on main
  pub fn new(registry: &str, config: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    std::fs::write(path.join("emscripten-releases-tags.json"), registry)?;
    std::fs::write(path.join("release.toml"), config)?;
    std::fs::write(path.join("TIP"), "feedface\n")?;

    let repo = Self { _root: root, path };
    repo.commit("Initial registry")?;
    Ok(repo)
  }

  /// Repository with the one-release registry and the offline config
  pub fn basic() -> Result<Self> {
    Self::new(BASIC_REGISTRY, OFFLINE_CONFIG)
  }

  /// Write a file relative to the repository root
  pub fn write_file(&self, path: &str, content: &str) -> Result<()> {
    let file = self.path.join(path);
    if let Some(parent) = file.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file, content)?;
    Ok(())
  }

  /// Stage everything and commit
  pub fn commit(&self, message: &str) -> Result<String> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;

    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Read a file
  pub fn read_file(&self, path: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(path))?)
  }

  pub fn registry(&self) -> Result<String> {
    self.read_file("emscripten-releases-tags.json")
  }

  pub fn current_branch(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "--abbrev-ref", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  pub fn branch_exists(&self, name: &str) -> bool {
    Command::new("git")
      .current_dir(&self.path)
      .args(["rev-parse", "--verify", "--quiet", &format!("refs/heads/{}", name)])
      .output()
      .map(|o| o.status.success())
      .unwrap_or(false)
  }

  /// Subject line of the HEAD commit
  pub fn head_subject(&self) -> Result<String> {
    let output = git(&self.path, &["log", "-1", "--format=%s"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Files changed by the HEAD commit
  pub fn head_files(&self) -> Result<Vec<String>> {
    let output = git(&self.path, &["show", "--name-only", "--format=", "HEAD"])?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect(),
    )
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run emsdk-release and return its output whatever the exit status
pub fn run_cli(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_emsdk-release");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .env_remove("RUST_LOG")
    .output()
    .context("Failed to run emsdk-release")
}

/// Run emsdk-release and fail unless it exits successfully
pub fn run_cli_ok(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = run_cli(cwd, args)?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let stdout = String::from_utf8_lossy(&output.stdout);
    anyhow::bail!(
      "emsdk-release command failed: emsdk-release {}\nstdout: {}\nstderr: {}",
      args.join(" "),
      stdout,
      stderr
    );
  }

  Ok(output)
}
