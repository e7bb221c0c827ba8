//! Zip extraction and compression commands

use crate::core::plan::Operation;
use std::path::{Path, PathBuf};

/// Archiver used by the Windows recipe
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveTool {
  /// 7-Zip at an explicit path (`7z x`, `7z a -mx9`)
  SevenZip(PathBuf),
  /// Info-ZIP `unzip -q` / `zip -rq` from PATH
  InfoZip,
}

impl ArchiveTool {
  /// 7-Zip from `%ProgramFiles%\7-Zip` when installed, Info-ZIP otherwise
  pub fn detect() -> Self {
    match std::env::var_os("ProgramFiles") {
      Some(dir) => Self::detect_in(Path::new(&dir)),
      None => ArchiveTool::InfoZip,
    }
  }

  pub fn detect_in(program_files: &Path) -> Self {
    let sevenzip = program_files.join("7-Zip").join("7z.exe");
    if sevenzip.is_file() {
      ArchiveTool::SevenZip(sevenzip)
    } else {
      ArchiveTool::InfoZip
    }
  }

  /// Extract `archive` into the current directory of the step
  pub fn extract(&self, archive: &str) -> Operation {
    match self {
      ArchiveTool::SevenZip(exe) => Operation::run(exe.to_string_lossy(), ["x", archive]),
      ArchiveTool::InfoZip => Operation::run("unzip", ["-q", archive]),
    }
  }

  /// Compress everything under the step's directory into `archive`
  pub fn compress(&self, archive: &str) -> Operation {
    match self {
      ArchiveTool::SevenZip(exe) => Operation::run(exe.to_string_lossy(), ["a", "-mx9", archive, "."]),
      ArchiveTool::InfoZip => Operation::run("zip", ["-rq", archive, "."]),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_detect_prefers_sevenzip() {
    let dir = tempfile::tempdir().unwrap();
    assert_eq!(ArchiveTool::detect_in(dir.path()), ArchiveTool::InfoZip);

    std::fs::create_dir(dir.path().join("7-Zip")).unwrap();
    std::fs::write(dir.path().join("7-Zip").join("7z.exe"), "").unwrap();
    assert_eq!(
      ArchiveTool::detect_in(dir.path()),
      ArchiveTool::SevenZip(dir.path().join("7-Zip").join("7z.exe"))
    );
  }

  #[test]
  fn test_info_zip_commands() {
    assert_eq!(ArchiveTool::InfoZip.extract("../a.zip"), Operation::run("unzip", ["-q", "../a.zip"]));
    assert_eq!(
      ArchiveTool::InfoZip.compress("../out.zip"),
      Operation::run("zip", ["-rq", "../out.zip", "."])
    );
  }

  #[test]
  fn test_sevenzip_commands() {
    let tool = ArchiveTool::SevenZip(PathBuf::from("/pf/7-Zip/7z.exe"));
    assert_eq!(tool.extract("../a.zip"), Operation::run("/pf/7-Zip/7z.exe", ["x", "../a.zip"]));
    assert_eq!(
      tool.compress("../out.zip"),
      Operation::run("/pf/7-Zip/7z.exe", ["a", "-mx9", "../out.zip", "."])
    );
  }
}
