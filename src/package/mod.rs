//! Python runtime packaging
//!
//! Builds the Python archives emsdk downloads on first use and uploads them
//! to the storage bucket:
//!
//! - **Windows**: python.org embeddable zip with pywin32 merged into
//!   `lib/site-packages`, repacked as `python-<v>-<rev>-embed-<arch>+pywin32.zip`
//! - **macOS / Linux**: CPython built from source, installed into a staging
//!   root, trimmed and tarred as `python-<v>-<rev>-<os>.tar.gz`
//!
//! Recipes are plans; `package-python --apply` executes them in the work
//! directory.

pub mod archive;
pub mod config;
pub mod recipes;
pub mod target;

pub use config::BuildConfig;
pub use recipes::Recipes;
pub use target::{Host, Target};
