//! Package targets and host detection

use crate::core::error::{ReleaseError, ReleaseResult};
use serde::Serialize;
use std::fmt;

/// A Python archive that can be produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, clap::ValueEnum)]
pub enum Target {
  /// Embeddable zip + pywin32, 64-bit
  #[value(name = "windows-amd64")]
  #[serde(rename = "windows-amd64")]
  WindowsAmd64,
  /// Embeddable zip + pywin32, 32-bit
  #[value(name = "windows-win32")]
  #[serde(rename = "windows-win32")]
  WindowsWin32,
  /// Built from source
  #[value(name = "linux")]
  #[serde(rename = "linux")]
  Linux,
  /// Built from source against Homebrew openssl in /usr/local
  #[value(name = "macos-x86_64")]
  #[serde(rename = "macos-x86_64")]
  MacosX86_64,
  /// Built from source against Homebrew openssl in /opt/homebrew
  #[value(name = "macos-arm64")]
  #[serde(rename = "macos-arm64")]
  MacosArm64,
}

impl Target {
  pub fn as_str(self) -> &'static str {
    match self {
      Target::WindowsAmd64 => "windows-amd64",
      Target::WindowsWin32 => "windows-win32",
      Target::Linux => "linux",
      Target::MacosX86_64 => "macos-x86_64",
      Target::MacosArm64 => "macos-arm64",
    }
  }

  /// Windows targets repackage prebuilt binaries; the rest compile CPython
  pub fn is_windows(self) -> bool {
    matches!(self, Target::WindowsAmd64 | Target::WindowsWin32)
  }

  /// Whether the recipe can run on `host`
  ///
  /// Windows repackaging only needs archive tools, so it runs anywhere.
  /// Source builds must run on the platform they build for.
  pub fn buildable_on(self, host: &Host) -> bool {
    self.is_windows() || host.native_target() == Some(self)
  }
}

impl fmt::Display for Target {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Operating system and CPU of the machine running the packager
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Host {
  pub os: String,
  pub arch: String,
}

impl Host {
  pub fn current() -> Self {
    Self {
      os: std::env::consts::OS.to_string(),
      arch: std::env::consts::ARCH.to_string(),
    }
  }

  #[cfg(test)]
  pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
    Self {
      os: os.into(),
      arch: arch.into(),
    }
  }

  /// Source-build target matching this host, if any
  pub fn native_target(&self) -> Option<Target> {
    match (self.os.as_str(), self.arch.as_str()) {
      ("linux", _) => Some(Target::Linux),
      ("macos", "x86_64") => Some(Target::MacosX86_64),
      ("macos", "aarch64") => Some(Target::MacosArm64),
      _ => None,
    }
  }

  /// Targets built when none are requested
  pub fn default_targets(&self) -> ReleaseResult<Vec<Target>> {
    if self.os == "windows" {
      return Ok(vec![Target::WindowsAmd64, Target::WindowsWin32]);
    }

    self.native_target().map(|t| vec![t]).ok_or_else(|| {
      ReleaseError::with_help(
        format!("No Python package recipe for host {}-{}", self.os, self.arch),
        "Pass --target explicitly (windows-amd64, windows-win32, linux, macos-x86_64, macos-arm64)",
      )
    })
  }
}
