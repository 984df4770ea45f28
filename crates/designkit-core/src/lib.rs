//! designkit Core - Shared library for the designkit project scaffolder
//!
//! This library creates new designkit projects from a template. A project is
//! created in strict stages: the package name is validated, a package manager
//! is probed, the project directory is prepared, a template is materialized
//! (bundled bare template or downloaded archive), placeholders are replaced
//! with case variants of the project name, and finally dependencies are
//! installed and a git repository is initialized on a best-effort basis.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! - **Layer 1: Core Operations** - Name validation, token substitution,
//!   template fetching/copying, package manager and git helpers
//! - **Layer 2: Workflow Orchestration** - `ProductConfig` trait and
//!   `ProjectCreator` for custom UIs
//! - **Layer 3: CLI/TUI Interface** - Optional cliclack-based prompts (feature-gated)
//!
//! # Feature Flags
//!
//! - `tui` (default): Enables the cliclack-based TUI prompts module
//!
//! # Example Usage (without TUI)
//!
//! ```ignore
//! use designkit_core::{ProjectCreator, ProjectRequest, Silent, SystemEnvironment};
//!
//! let env = SystemEnvironment;
//! let request = ProjectRequest::new("my-cool-app", std::env::current_dir()?).bare(true);
//! let created = ProjectCreator::new(&MyConfig, &env)
//!     .create(&request, &mut Silent)
//!     .await?;
//! ```

pub mod error;
pub mod naming;
pub mod product;
pub mod project;
pub mod runtime;
pub mod target;
pub mod templates;
pub mod tokens;
pub mod workflow;

#[cfg(feature = "tui")]
pub mod tui;

// Re-export main types for convenience
pub use error::{Result, ScaffoldError};
pub use product::ProductConfig;
pub use project::ProjectRequest;
pub use runtime::{HostEnvironment, PackageManager, SystemEnvironment};
pub use tokens::TokenSet;
pub use workflow::{CreatedProject, Progress, ProjectCreator, Silent, Stage, StepOutcome};

#[cfg(feature = "tui")]
pub use tui::{run, CreateArgs};
