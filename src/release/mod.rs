//! Release promotion for the emsdk version registry
//!
//! # Core Invariants
//!
//! 1. **Versions compare as integer triples**
//!    - `1.10.0` is newer than `1.9.0`
//!    - Suffixes after the third component never affect ordering
//!
//! 2. **Only the patch component is bumped**
//!    - Major and minor bumps are made by hand in the registry file
//!
//! 3. **Every alias resolves to a listed release**
//!    - Checked when the registry is loaded and again before it is written
//!
//! # Architecture
//!
//! - **version**: `Version` triple, parsing, bumping, branch names
//! - **registry**: `emscripten-releases-tags.json` load/sort/save
//! - **tip**: tip-of-tree resolvers (git remote head, command output)
//! - **hook**: workspace-regeneration hook after the registry changes
//! - **promote**: the end-to-end workflow

pub mod hook;
pub mod promote;
pub mod registry;
pub mod tip;
pub mod version;

pub use promote::{PromotionOutcome, Promoter};
pub use registry::VersionRegistry;
