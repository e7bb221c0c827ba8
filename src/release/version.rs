//! Release version triples
//!
//! emsdk release versions are compared as integer triples. Registry keys may
//! carry suffixes (`3.1.50-git`), which are ignored for ordering.

use crate::core::error::{RegistryError, ReleaseError, ReleaseResult};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// A `major.minor.patch` release version
///
/// Ordering is lexicographic on the integer triple, never on the string form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
  pub major: u64,
  pub minor: u64,
  pub patch: u64,
}

/// Split on `.` and `-` and parse the first three tokens as integers
///
/// `"3.1.50-git"` → `[3, 1, 50]`
pub fn version_to_list(value: &str) -> ReleaseResult<[u64; 3]> {
  let invalid = || {
    ReleaseError::Registry(RegistryError::InvalidVersion {
      value: value.to_string(),
    })
  };

  let mut parts = value.split(['.', '-']);
  let mut list = [0u64; 3];
  for slot in &mut list {
    let token = parts.next().ok_or_else(invalid)?;
    *slot = token.parse().map_err(|_| invalid())?;
  }
  Ok(list)
}

impl Version {
  pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
    Self { major, minor, patch }
  }

  /// Parse a registry version string
  pub fn parse(value: &str) -> ReleaseResult<Self> {
    let [major, minor, patch] = version_to_list(value)?;
    Ok(Self::new(major, minor, patch))
  }

  /// Next patch release; major and minor are never bumped here
  pub fn bump_patch(self) -> ReleaseResult<Self> {
    let patch = self.patch.checked_add(1).ok_or_else(|| {
      ReleaseError::Registry(RegistryError::PatchOverflow {
        version: self.to_string(),
      })
    })?;
    Ok(Self { patch, ..self })
  }

  /// Branch name for this release: `<prefix>X_Y_Z`
  pub fn branch_name(&self, prefix: &str) -> String {
    format!("{}{}_{}_{}", prefix, self.major, self.minor, self.patch)
  }
}

impl FromStr for Version {
  type Err = ReleaseError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::parse(s)
  }
}

impl fmt::Display for Version {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
  }
}

impl Serialize for Version {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(self)
  }
}
