//! Core engine for emsdk-release
//!
//! - **config**: release.toml parsing and defaults
//! - **context**: Repository root + config, resolved once in main.rs
//! - **error**: Error types with contextual help messages and exit codes
//! - **executor**: Ordered, fail-fast plan execution
//! - **plan**: Operation planning and serialization (dry-run, JSON)
//! - **vcs**: Git operations via system git (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod executor;
pub mod plan;
pub mod vcs;
