//! Build configuration for the packaged Python runtime

use crate::core::error::{ConfigError, ReleaseError, ReleaseResult};
use serde::{Deserialize, Serialize};

/// Versions and locations used to build and publish Python archives
///
/// `[python]` section of release.toml; every field has the emsdk default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct BuildConfig {
  /// CPython release, full semver (`3.9.2`)
  pub version: String,
  /// Packaging revision appended to archive names
  pub revision: String,
  /// pywin32 build number bundled into the Windows archives
  pub pywin32_version: String,
  /// python.org directory listing that holds `<version>/` subdirectories
  pub download_base: String,
  /// pywin32 GitHub releases download prefix
  pub pywin32_base: String,
  /// Bucket prefix archives are uploaded under
  pub upload_base: String,
  /// CPython source repository
  pub cpython_repo: String,
}

impl Default for BuildConfig {
  fn default() -> Self {
    Self {
      version: "3.9.2".to_string(),
      revision: "1".to_string(),
      pywin32_version: "227".to_string(),
      download_base: "https://www.python.org/ftp/python/".to_string(),
      pywin32_base: "https://github.com/mhammond/pywin32/releases/download/".to_string(),
      upload_base: "gs://webassembly/emscripten-releases-builds/deps/".to_string(),
      cpython_repo: "https://github.com/python/cpython".to_string(),
    }
  }
}

impl BuildConfig {
  /// Check version strings and URL prefixes
  pub fn validate(&self) -> ReleaseResult<()> {
    if semver::Version::parse(&self.version).is_err() {
      return Err(ReleaseError::Config(ConfigError::InvalidValue {
        field: "python.version".to_string(),
        reason: format!("'{}' is not valid semver (e.g. '3.9.2')", self.version),
      }));
    }

    for (field, value) in [("python.revision", &self.revision), ("python.pywin32_version", &self.pywin32_version)] {
      if value.is_empty() || !value.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(ReleaseError::Config(ConfigError::InvalidValue {
          field: field.to_string(),
          reason: format!("'{}' must be a non-empty alphanumeric token", value),
        }));
      }
    }

    for (field, value) in [
      ("python.download_base", &self.download_base),
      ("python.pywin32_base", &self.pywin32_base),
      ("python.upload_base", &self.upload_base),
    ] {
      if !value.ends_with('/') {
        return Err(ReleaseError::Config(ConfigError::InvalidValue {
          field: field.to_string(),
          reason: format!("'{}' must end with '/'", value),
        }));
      }
    }

    Ok(())
  }

  fn semver(&self) -> semver::Version {
    semver::Version::parse(&self.version).unwrap_or_else(|_| semver::Version::new(0, 0, 0))
  }

  /// `3.9.2` → `3.9`
  pub fn major_minor(&self) -> String {
    let v = self.semver();
    format!("{}.{}", v.major, v.minor)
  }

  /// `3.9.2` → `39`, as used in `python39._pth`
  pub fn major_minor_compact(&self) -> String {
    let v = self.semver();
    format!("{}{}", v.major, v.minor)
  }

  /// `python-3.9.2-1`
  pub fn dist_name(&self) -> String {
    format!("python-{}-{}", self.version, self.revision)
  }

  /// Download URL of a file in this release's python.org directory
  pub fn python_url(&self, filename: &str) -> String {
    format!("{}{}/{}", self.download_base, self.version, filename)
  }

  /// Download URL of a pywin32 release asset
  pub fn pywin32_url(&self, filename: &str) -> String {
    format!("{}b{}/{}", self.pywin32_base, self.pywin32_version, filename)
  }

  /// Destination of an uploaded archive
  pub fn upload_url(&self, filename: &str) -> String {
    format!("{}{}", self.upload_base, filename)
  }
}
