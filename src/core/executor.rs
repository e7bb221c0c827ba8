//! Plan executor
//!
//! Applies operations strictly in order and stops at the first failure.
//! Nothing is rolled back; the operator inspects whatever state is left.
//!
//! In quiet mode stdout is reserved for the caller's JSON: progress lines
//! are dropped and child processes write their stdout to stderr.

use crate::core::error::{ReleaseError, ReleaseResult, ResultExt, ToolError};
use crate::core::plan::{Operation, Plan};
use crate::core::vcs::SystemGit;
use crate::utils::{command_line, write_replacing};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Executes plans against a base directory
pub struct Executor<'a> {
  base_dir: PathBuf,
  git: Option<&'a SystemGit>,
  quiet: bool,
}

impl<'a> Executor<'a> {
  /// Executor for plans that only touch the filesystem and run tools
  pub fn new(base_dir: impl Into<PathBuf>) -> Self {
    Self {
      base_dir: base_dir.into(),
      git: None,
      quiet: false,
    }
  }

  /// Executor that can also create branches, stage and commit
  pub fn with_git(base_dir: impl Into<PathBuf>, git: &'a SystemGit) -> Self {
    Self {
      base_dir: base_dir.into(),
      git: Some(git),
      quiet: false,
    }
  }

  /// Keep stdout free of progress lines and tool output
  pub fn quiet(mut self, quiet: bool) -> Self {
    self.quiet = quiet;
    self
  }

  /// Apply every operation of a plan in order
  pub fn execute(&self, plan: &Plan) -> ReleaseResult<()> {
    tracing::info!(
      plan = %plan.metadata.id,
      kind = %plan.metadata.operation_type,
      operations = plan.len(),
      "executing plan"
    );

    for (i, op) in plan.operations.iter().enumerate() {
      tracing::debug!(step = i + 1, operation = ?op, "apply");
      self
        .apply(op)
        .with_context(|| format!("Step {} of plan {} failed", i + 1, plan.metadata.id))?;
    }

    Ok(())
  }

  /// Apply a single operation
  pub fn apply(&self, op: &Operation) -> ReleaseResult<()> {
    match op {
      Operation::Download { url, dest } => {
        let dest_path = self.resolve(dest);
        if dest_path.exists() {
          self.progress(format_args!("   Using cached {}", dest));
          return Ok(());
        }
        self.progress(format_args!("   Downloading {}", url));

        // Only complete downloads land at `dest`, so an interrupted one is never cached
        let partial = format!("{}.part", dest);
        self.run_tool("curl", &["-fsSL", "-o", &partial, url], &self.base_dir, &[], &[0])?;
        let partial_path = self.resolve(&partial);
        fs::rename(&partial_path, &dest_path)
          .with_context(|| format!("Failed to move {} to {}", partial_path.display(), dest_path.display()))
      }
      Operation::Clone { url, path } => {
        if self.resolve(path).exists() {
          tracing::debug!(path = %path, "clone target exists, skipping");
          return Ok(());
        }
        self.run_tool("git", &["clone", url, path], &self.base_dir, &[], &[0])
      }
      Operation::CreateDir { path } => {
        let dir = self.resolve(path);
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))
      }
      Operation::Run {
        program,
        args,
        cwd,
        env,
        success_codes,
      } => {
        let dir = match cwd {
          Some(cwd) => self.resolve(cwd),
          None => self.base_dir.clone(),
        };
        let args: Vec<&str> = args.iter().map(String::as_str).collect();
        self.run_tool(program, &args, &dir, env, success_codes)
      }
      Operation::RemoveFile { path, ignore_missing } => {
        let file = self.resolve(path);
        match fs::remove_file(&file) {
          Err(e) if *ignore_missing && e.kind() == std::io::ErrorKind::NotFound => Ok(()),
          other => other.with_context(|| format!("Failed to remove {}", file.display())),
        }
      }
      Operation::RemoveDir { path, ignore_missing } => {
        let dir = self.resolve(path);
        if *ignore_missing && !dir.exists() {
          return Ok(());
        }
        fs::remove_dir_all(&dir).with_context(|| format!("Failed to remove {}", dir.display()))
      }
      Operation::RemoveGlob { pattern } => {
        let full = self.resolve(pattern);
        for entry in glob::glob(&full.to_string_lossy())? {
          let path = entry?;
          tracing::debug!(path = %path.display(), "remove");
          fs::remove_file(&path).with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        Ok(())
      }
      Operation::Move { from, to } => {
        let (from_path, to_path) = (self.resolve(from), self.resolve(to));
        if let Some(parent) = to_path.parent() {
          fs::create_dir_all(parent)?;
        }
        fs::rename(&from_path, &to_path)
          .with_context(|| format!("Failed to move {} to {}", from_path.display(), to_path.display()))
      }
      Operation::Upload { file, url } => {
        self.progress(format_args!("   Uploading: {}", url));
        self.run_tool("gsutil", &["cp", "-n", file, url], &self.base_dir, &[], &[0])
      }
      Operation::CreateBranch { name } => self.require_git()?.create_and_checkout_branch(name),
      Operation::WriteFile { path, contents } => {
        let file = self.resolve(path);
        write_replacing(&file, contents)
      }
      Operation::StageTracked => self.require_git()?.stage_tracked(),
      Operation::Commit { message } => self.require_git()?.commit(message).map(|_| ()),
    }
  }

  fn progress(&self, line: std::fmt::Arguments<'_>) {
    if !self.quiet {
      println!("{}", line);
    }
  }

  /// Run an external program, streaming its output to the terminal
  ///
  /// The operator sees the tool's own diagnostics; the exit status decides
  /// success. In quiet mode the child's stdout goes to stderr.
  fn run_tool(
    &self,
    program: &str,
    args: &[&str],
    cwd: &Path,
    env: &[(String, String)],
    success_codes: &[i32],
  ) -> ReleaseResult<()> {
    let rendered = command_line(program, args);
    tracing::debug!(command = %rendered, cwd = %cwd.display(), "run");

    let mut cmd = Command::new(program);
    cmd
      .args(args)
      .current_dir(cwd)
      .envs(env.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    if self.quiet {
      cmd.stdout(Stdio::from(std::io::stderr()));
    }

    let status = cmd.status().map_err(|e| {
      ReleaseError::Tool(ToolError::NotFound {
        program: program.to_string(),
        reason: e.to_string(),
      })
    })?;

    match status.code() {
      Some(code) if success_codes.contains(&code) => Ok(()),
      code => Err(ReleaseError::Tool(ToolError::Failed {
        command: rendered,
        code,
        stderr: String::new(),
      })),
    }
  }

  fn require_git(&self) -> ReleaseResult<&SystemGit> {
    self
      .git
      .ok_or_else(|| ReleaseError::message("Plan needs a git repository but the executor has none"))
  }

  fn resolve(&self, path: &str) -> PathBuf {
    let p = Path::new(path);
    if p.is_absolute() {
      p.to_path_buf()
    } else {
      self.base_dir.join(p)
    }
  }
}
