//! Product configuration trait for CLI binaries
//!
//! This trait defines what a binary tells the scaffolder about itself: where
//! its remote template lives, how it names itself, and what it prints after a
//! project is created.

use crate::workflow::CreatedProject;

/// Configuration trait for a CLI product
pub trait ProductConfig: Clone + Send + Sync + 'static {
    /// Internal product name (used for CLI command, env vars)
    fn name(&self) -> &'static str;

    /// Human-readable display name
    fn display_name(&self) -> &'static str;

    /// CLI version; also selects the remote template release
    fn version(&self) -> &'static str;

    /// Base URL of template releases; the archive lives at
    /// `{base}/{version}/createproject/project.tgz`
    fn default_archive_base(&self) -> &'static str;

    /// Environment variable name for overriding the archive base URL
    fn archive_base_env(&self) -> &'static str;

    /// URL for product documentation
    fn docs_url(&self) -> &'static str;

    /// Upgrade/install command shown in version warnings
    fn upgrade_command(&self) -> &'static str;

    /// Generate the "next steps" instructions after project creation.
    /// `project.install` tells whether dependencies still need installing.
    fn next_steps(&self, project: &CreatedProject) -> Vec<String>;

    /// User agent string for HTTP requests
    fn user_agent(&self) -> String {
        format!("{}/{}", self.name(), self.version())
    }
}
