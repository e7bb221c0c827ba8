//! Version registry (`emscripten-releases-tags.json`)
//!
//! ```json
//! {
//!   "aliases": {
//!     "latest": "3.1.51"
//!   },
//!   "releases": {
//!     "3.1.51": "c0c2ca1314672a25699846b4663701bcb6f69cca",
//!     "3.1.50": "2ef1a7e7e9ab7fa1b4e0f2b4d5b0b3a2c1e9f0d4"
//!   }
//! }
//! ```
//!
//! Both maps keep file order. `releases` is rewritten newest-first; that
//! order is part of the file format, lookups never depend on it.

use super::version::Version;
use crate::core::error::{RegistryError, ReleaseError, ReleaseResult};
use crate::utils::write_replacing;
use indexmap::IndexMap;
use serde::de::{self, MapAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Registry section: string keys to string values, in file order
pub type Entries = IndexMap<String, String>;

/// Deserialize an [`Entries`] map, rejecting repeated keys
///
/// Plain `IndexMap` deserialization keeps the last duplicate silently.
fn unique_entries<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Entries, D::Error> {
  struct UniqueEntries;

  impl<'de> Visitor<'de> for UniqueEntries {
    type Value = Entries;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
      f.write_str("a map of strings to strings")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
      let mut entries = Entries::with_capacity(access.size_hint().unwrap_or(0));
      while let Some((key, value)) = access.next_entry::<String, String>()? {
        if entries.contains_key(&key) {
          return Err(de::Error::custom(format!("duplicate key '{}'", key)));
        }
        entries.insert(key, value);
      }
      Ok(entries)
    }
  }

  deserializer.deserialize_map(UniqueEntries)
}

/// The persisted registry: release versions and their aliases
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VersionRegistry {
  /// Symbolic name → release version, or another alias
  #[serde(deserialize_with = "unique_entries")]
  pub aliases: Entries,

  /// Version string → provenance id (e.g. a commit hash)
  #[serde(deserialize_with = "unique_entries")]
  pub releases: Entries,
}

impl VersionRegistry {
  /// Load and validate the registry file
  pub fn load(path: &Path) -> ReleaseResult<Self> {
    let load_error = |reason: String| {
      ReleaseError::Registry(RegistryError::Load {
        path: path.to_path_buf(),
        reason,
      })
    };

    let content = fs::read_to_string(path).map_err(|e| load_error(e.to_string()))?;
    let registry = Self::from_json_str(&content).map_err(|e| match e {
      ReleaseError::Registry(RegistryError::Load { reason, .. }) => load_error(reason),
      other => other,
    })?;

    tracing::debug!(
      path = %path.display(),
      releases = registry.releases.len(),
      aliases = registry.aliases.len(),
      "loaded version registry"
    );
    Ok(registry)
  }

  /// Parse and validate registry JSON
  pub fn from_json_str(content: &str) -> ReleaseResult<Self> {
    let registry: VersionRegistry = serde_json::from_str(content).map_err(|e| {
      ReleaseError::Registry(RegistryError::Load {
        path: Path::new("<registry>").to_path_buf(),
        reason: e.to_string(),
      })
    })?;
    registry.validate()?;
    Ok(registry)
  }

  /// Every release key parses as a version; every alias reaches a release
  pub fn validate(&self) -> ReleaseResult<()> {
    for key in self.releases.keys() {
      Version::parse(key)?;
    }

    for alias in self.aliases.keys() {
      self.resolve_alias(alias)?;
    }

    Ok(())
  }

  /// Release version string an alias resolves to
  ///
  /// Aliases may name other aliases (`"latest-sdk": "latest"`); chains are
  /// followed until a release key is reached.
  pub fn resolve_alias(&self, alias: &str) -> ReleaseResult<&str> {
    let mut current = self.aliases.get(alias).map(String::as_str).ok_or_else(|| {
      ReleaseError::Registry(RegistryError::MissingAlias {
        alias: alias.to_string(),
      })
    })?;

    let mut hops = 0;
    while !self.releases.contains_key(current) {
      match self.aliases.get(current) {
        Some(next) if hops < self.aliases.len() => {
          current = next.as_str();
          hops += 1;
        }
        _ => {
          return Err(ReleaseError::Registry(RegistryError::DanglingAlias {
            alias: alias.to_string(),
            version: current.to_string(),
          }));
        }
      }
    }

    Ok(current)
  }

  /// Parsed version an alias points at
  pub fn resolve_version(&self, alias: &str) -> ReleaseResult<Version> {
    Version::parse(self.resolve_alias(alias)?)
  }

  /// Provenance id recorded for a version string
  pub fn provenance(&self, version: &str) -> Option<&str> {
    self.releases.get(version).map(String::as_str)
  }

  /// Add a release, replacing the provenance if the version is already listed
  pub fn insert_release(&mut self, version: &Version, provenance: &str) {
    self.releases.insert(version.to_string(), provenance.to_string());
  }

  /// Stable sort of `releases`, newest version first
  ///
  /// Keys are validated on load, so every key parses here; an unparsable key
  /// would sort last.
  pub fn sort_releases_descending(&mut self) {
    self
      .releases
      .sort_by_cached_key(|k, _| std::cmp::Reverse(Version::parse(k).ok()));
  }

  /// Point an alias at a version string
  pub fn set_alias(&mut self, alias: &str, version: &Version) {
    self.aliases.insert(alias.to_string(), version.to_string());
  }

  /// Insert, re-sort and repoint `alias` in one step
  pub fn record_release(&mut self, alias: &str, version: &Version, provenance: &str) {
    self.insert_release(version, provenance);
    self.sort_releases_descending();
    self.set_alias(alias, version);
  }

  /// Two-space indented JSON with a trailing newline
  pub fn to_json_string(&self) -> ReleaseResult<String> {
    let mut out = serde_json::to_string_pretty(self)?;
    out.push('\n');
    Ok(out)
  }

  /// Validate and rewrite the whole registry file
  pub fn save(&self, path: &Path) -> ReleaseResult<()> {
    self.validate()?;
    write_replacing(path, &self.to_json_string()?)
  }
}
