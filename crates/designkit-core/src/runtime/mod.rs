//! Host tooling: package managers and git
//!
//! This module provides:
//! - The injectable [`HostEnvironment`] used for every external process
//! - Package manager probing and dependency installation
//! - Best-effort git initialization

pub mod env;
pub mod package_manager;
pub mod vcs;

pub use env::{CommandOutput, HostEnvironment, SystemEnvironment};
pub use package_manager::{probe, ManagerInfo, PackageManager};
pub use vcs::try_git_init;
