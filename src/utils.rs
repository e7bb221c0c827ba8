//! Small filesystem and process helpers shared by the commands

use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use std::fs;
use std::path::Path;

/// Overwrite a file by writing a sibling temp file and renaming it into place
///
/// Readers either see the old contents or the new ones, never a partial write.
pub fn write_replacing(path: &Path, contents: &str) -> ReleaseResult<()> {
  let file_name = path
    .file_name()
    .ok_or_else(|| ReleaseError::message(format!("Not a file path: {}", path.display())))?;
  let mut tmp_name = file_name.to_os_string();
  tmp_name.push(".tmp");
  let tmp = path.with_file_name(tmp_name);

  fs::write(&tmp, contents).with_context(|| format!("Failed to write {}", tmp.display()))?;
  fs::rename(&tmp, path).with_context(|| format!("Failed to replace {}", path.display()))
}

/// Render a program and its arguments the way a shell user would type them
pub fn command_line(program: &str, args: &[&str]) -> String {
  let mut line = program.to_string();
  for arg in args {
    line.push(' ');
    if arg.is_empty() || arg.contains(char::is_whitespace) {
      line.push('\'');
      line.push_str(arg);
      line.push('\'');
    } else {
      line.push_str(arg);
    }
  }
  line
}
