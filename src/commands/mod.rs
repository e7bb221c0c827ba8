//! CLI commands for emsdk-release
//!
//! - **promote**: Bump the latest release and commit it on a new branch
//! - **package**: Build and upload the bundled Python runtime
//! - **status**: Show registry aliases and recent releases
//!
//! All commands accept `&RepoContext` so the repository root is resolved once.

pub mod package;
pub mod promote;
pub mod status;

pub use package::run_package_python;
pub use promote::run_promote;
pub use status::run_status;
