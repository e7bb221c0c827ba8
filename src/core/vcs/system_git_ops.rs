//! Branch, staging and remote operations for SystemGit

use super::system_git::SystemGit;
use crate::core::error::{GitError, ReleaseError, ReleaseResult, ResultExt};

impl SystemGit {
  /// Entries reported by `git status --porcelain`, untracked files included
  pub fn status_entries(&self) -> ReleaseResult<Vec<String>> {
    let output = self.run(
      &["status", "--porcelain", "--untracked-files=normal"],
      "Failed to query working tree status",
    )?;

    let entries = String::from_utf8_lossy(&output.stdout)
      .lines()
      .map(|s| s.trim_end().to_string())
      .filter(|s| !s.is_empty())
      .collect();

    Ok(entries)
  }

  /// True when nothing is staged, modified or untracked
  pub fn is_clean(&self) -> ReleaseResult<bool> {
    Ok(self.status_entries()?.is_empty())
  }

  /// Fail with `DirtyWorkingTree` unless the tree is clean
  pub fn ensure_clean(&self) -> ReleaseResult<()> {
    let entries = self.status_entries()?;
    if !entries.is_empty() {
      return Err(ReleaseError::Git(GitError::DirtyWorkingTree { entries }));
    }
    Ok(())
  }

  /// Create and checkout a branch (`git checkout -b`)
  pub fn create_and_checkout_branch(&self, branch_name: &str) -> ReleaseResult<()> {
    tracing::debug!(branch = branch_name, "git checkout -b");
    let output = self
      .git_cmd()
      .args(["checkout", "-b", branch_name])
      .output()
      .context("Failed to create branch")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();
      if stderr.contains("already exists") {
        return Err(ReleaseError::Git(GitError::BranchExists {
          name: branch_name.to_string(),
          stderr,
        }));
      }
      return Err(ReleaseError::Git(GitError::CommandFailed {
        command: format!("git checkout -b {}", branch_name),
        stderr,
      }));
    }

    Ok(())
  }

  /// Stage every modified tracked file (`git add -u .`)
  pub fn stage_tracked(&self) -> ReleaseResult<()> {
    self.run(&["add", "-u", "."], "Failed to stage tracked files")?;
    Ok(())
  }

  /// Commit the index with a message
  pub fn commit(&self, message: &str) -> ReleaseResult<String> {
    self.run(&["commit", "-m", message], "Failed to commit")?;
    self.head_commit()
  }

  /// Resolve the head of a branch on a remote without fetching
  pub fn ls_remote_head(&self, remote: &str, branch: &str) -> ReleaseResult<String> {
    let refname = format!("refs/heads/{}", branch);
    let output = self.run(&["ls-remote", remote, &refname], "Failed to query remote")?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    stdout
      .lines()
      .filter_map(|line| line.split_whitespace().next())
      .next()
      .map(str::to_string)
      .ok_or_else(|| {
        ReleaseError::Git(GitError::CommandFailed {
          command: format!("git ls-remote {} {}", remote, refname),
          stderr: format!("branch '{}' not found on remote", branch),
        })
      })
  }
}
