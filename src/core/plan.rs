//! Plan-based operations for reviewable release workflows
//!
//! Every mutating command produces a `Plan` before anything is touched:
//!
//! - **Dry-run mode**: Show what will happen without actually doing it
//! - **Auditability**: Plans are JSON-serializable for logging/review
//! - **Identity**: The plan ID is a content hash of its operations
//!
//! # Architecture
//!
//! ```text
//! Command (promote, package-python)
//!   ↓
//! Plan (what to do)
//!   ↓
//! Executor (apply the plan)
//! ```

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Plan identifier (SHA256 hash of plan contents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanId(String);

impl PlanId {
  /// Create a plan ID from plan contents
  pub fn from_contents(contents: &[u8]) -> Self {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    let result = hasher.finalize();
    Self(format!("{:x}", result))
  }

  /// Get the short ID (first 12 characters)
  pub fn short(&self) -> &str {
    &self.0[..12.min(self.0.len())]
  }
}

impl fmt::Display for PlanId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.short())
  }
}

/// A single step of a plan
///
/// Paths are relative to the executor's base directory unless absolute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
  /// Fetch a URL into a file (skipped when the file already exists)
  Download { url: String, dest: String },

  /// Clone a repository (skipped when the path already exists)
  Clone { url: String, path: String },

  /// Create a directory (parents included)
  CreateDir { path: String },

  /// Run an external program
  Run {
    program: String,
    args: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cwd: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    env: Vec<(String, String)>,
    /// Exit codes treated as success
    #[serde(default = "default_success_codes")]
    success_codes: Vec<i32>,
  },

  /// Delete a file
  RemoveFile { path: String, ignore_missing: bool },

  /// Delete a directory tree
  RemoveDir { path: String, ignore_missing: bool },

  /// Delete every file matching a glob pattern
  RemoveGlob { pattern: String },

  /// Rename a file or directory
  Move { from: String, to: String },

  /// Copy an archive to the storage bucket without overwriting (`gsutil cp -n`)
  Upload { file: String, url: String },

  /// Create and switch to a branch
  CreateBranch { name: String },

  /// Overwrite a file with new contents
  WriteFile { path: String, contents: String },

  /// Stage every modified tracked file
  StageTracked,

  /// Commit the index
  Commit { message: String },
}

fn default_success_codes() -> Vec<i32> {
  vec![0]
}

impl Operation {
  /// Run `program args...` in the base directory, success on exit code 0
  pub fn run<I, S>(program: impl Into<String>, args: I) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Operation::Run {
      program: program.into(),
      args: args.into_iter().map(Into::into).collect(),
      cwd: None,
      env: Vec::new(),
      success_codes: default_success_codes(),
    }
  }

  /// Set the working directory of a `Run` operation
  pub fn in_dir(mut self, dir: impl Into<String>) -> Self {
    if let Operation::Run { cwd, .. } = &mut self {
      *cwd = Some(dir.into());
    }
    self
  }

  /// Add environment variables to a `Run` operation
  pub fn with_env(mut self, vars: &[(String, String)]) -> Self {
    if let Operation::Run { env, .. } = &mut self {
      env.extend(vars.iter().cloned());
    }
    self
  }

  /// Replace the accepted exit codes of a `Run` operation
  pub fn accepting(mut self, codes: &[i32]) -> Self {
    if let Operation::Run { success_codes, .. } = &mut self {
      *success_codes = codes.to_vec();
    }
    self
  }
}

/// Plan metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanMetadata {
  /// Plan ID (content hash)
  pub id: PlanId,

  /// What operation this plan represents
  pub operation_type: OperationType,

  /// Release version or package target (if applicable)
  pub target: Option<String>,

  /// Whether this plan publishes anything outside the local machine
  pub is_destructive: bool,
}

/// Type of operation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
  Promote,
  Package,
}

impl fmt::Display for OperationType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      OperationType::Promote => write!(f, "promote"),
      OperationType::Package => write!(f, "package"),
    }
  }
}

/// A plan represents a sequence of operations to perform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
  /// Plan metadata
  pub metadata: PlanMetadata,

  /// Operations to perform (in order)
  pub operations: Vec<Operation>,

  /// Human-readable summary
  pub summary: String,
}

impl Plan {
  /// Create a new plan
  pub fn new(operation_type: OperationType, target: Option<String>) -> Self {
    Self {
      metadata: PlanMetadata {
        id: PlanId::from_contents(&[]),
        operation_type,
        target,
        is_destructive: false,
      },
      operations: Vec::new(),
      summary: String::new(),
    }
  }

  /// Add an operation to the plan
  pub fn add_operation(&mut self, operation: Operation) {
    self.operations.push(operation);
    self.recompute_id();
  }

  /// Add multiple operations (for batch operations)
  pub fn add_operations(&mut self, operations: impl IntoIterator<Item = Operation>) {
    self.operations.extend(operations);
    self.recompute_id();
  }

  /// Set the summary
  pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
    self.summary = summary.into();
    self
  }

  /// Mark as destructive
  pub fn mark_destructive(mut self) -> Self {
    self.metadata.is_destructive = true;
    self
  }

  /// Recompute plan ID based on current contents
  fn recompute_id(&mut self) {
    let json = serde_json::to_vec(&self.operations).unwrap_or_default();
    self.metadata.id = PlanId::from_contents(&json);
  }

  /// Get human-readable representation
  pub fn to_human_readable(&self) -> String {
    let mut output = String::new();

    output.push_str(&format!(
      "📋 Plan: {} ({})\n",
      self.metadata.operation_type, self.metadata.id
    ));

    if let Some(ref target) = self.metadata.target {
      output.push_str(&format!("   Target: {}\n", target));
    }

    if !self.summary.is_empty() {
      output.push_str(&format!("\n{}\n", self.summary));
    }

    output.push_str(&format!("\n   Operations ({}):\n", self.operations.len()));

    for (i, op) in self.operations.iter().enumerate() {
      output.push_str(&format!("   {}. {}\n", i + 1, operation_to_string(op)));
    }

    if self.metadata.is_destructive {
      output.push_str("\n⚠️  NOTE: This plan uploads to a shared storage bucket\n");
      output.push_str("   (Existing objects are never overwritten - `gsutil cp -n`)\n");
    }

    output
  }

  /// Get number of operations
  pub fn len(&self) -> usize {
    self.operations.len()
  }

  /// Check if plan is empty
  pub fn is_empty(&self) -> bool {
    self.operations.is_empty()
  }
}

/// Convert operation to human-readable string
fn operation_to_string(op: &Operation) -> String {
  match op {
    Operation::Download { url, dest } => format!("Download {} → {}", url, dest),
    Operation::Clone { url, path } => format!("Clone {} to {}", url, path),
    Operation::CreateDir { path } => format!("Create directory {}", path),
    Operation::Run { program, args, cwd, .. } => {
      let mut line = format!("Run `{}", program);
      for arg in args {
        line.push(' ');
        line.push_str(arg);
      }
      line.push('`');
      if let Some(cwd) = cwd {
        line.push_str(&format!(" in {}", cwd));
      }
      line
    }
    Operation::RemoveFile { path, .. } => format!("Remove file {}", path),
    Operation::RemoveDir { path, .. } => format!("Remove directory {}", path),
    Operation::RemoveGlob { pattern } => format!("Remove files matching {}", pattern),
    Operation::Move { from, to } => format!("Move {} → {}", from, to),
    Operation::Upload { file, url } => format!("Upload {} → {}", file, url),
    Operation::CreateBranch { name } => format!("Create and checkout branch {}", name),
    Operation::WriteFile { path, contents } => format!("Write {} ({} bytes)", path, contents.len()),
    Operation::StageTracked => "Stage modified tracked files".to_string(),
    Operation::Commit { message } => format!("Commit: {}", message),
  }
}
