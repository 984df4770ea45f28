//! Error types for project scaffolding
//!
//! Every variant here aborts project creation. Failures of the best-effort
//! steps (dependency install, git init) never become a `ScaffoldError`; they
//! are collected as warnings on the creation report instead.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using the scaffolder's error type
pub type Result<T> = std::result::Result<T, ScaffoldError>;

/// Fatal project-creation errors
#[derive(Error, Debug)]
pub enum ScaffoldError {
    /// The package name broke one or more npm naming rules
    #[error(
        "Cannot create a project named \"{name}\" because of npm naming restrictions:\n{}\nPlease choose a different project name.",
        format_problems(.problems)
    )]
    InvalidPackageName { name: String, problems: Vec<String> },

    /// Neither yarn nor npm could be run
    #[error("No usable package manager found. Install yarn or npm and try again.")]
    PackageManagerUnavailable,

    /// npm reports a different working directory than the one we run in
    #[error(
        "Could not start an npm process in the right directory.\n\
         The current directory is: {}\n\
         However, a newly started npm process runs in: {}\n\
         This is probably caused by a misconfigured system terminal shell.\n\
         Try running the command again from a plain shell, or install yarn.",
        .expected.display(),
        .reported.display()
    )]
    NpmCwdMismatch { expected: PathBuf, reported: PathBuf },

    /// Something other than a directory occupies the project path
    #[error("{} exists and is not a directory. Remove it or choose another project name.", .path.display())]
    RootNotADirectory { path: PathBuf },

    /// The project directory already holds files that could conflict
    #[error(
        "The directory {} contains files that could conflict:\n{}\nEither try using a new directory name, or remove the files listed above.",
        .path.display(),
        format_problems(.conflicts)
    )]
    RootConflict { path: PathBuf, conflicts: Vec<String> },

    /// The remote template archive could not be downloaded
    #[error("Failed to download the project template from {url}: {reason}\nTry again with --bare to use the bundled template.")]
    TemplateDownload { url: String, reason: String },

    /// The remote template archive was empty
    #[error("The project template at {url} returned no data.\nTry again with --bare to use the bundled template.")]
    EmptyArchive { url: String },

    /// The template archive could not be unpacked
    #[error("Failed to extract the project template: {0}")]
    ArchiveExtraction(#[source] std::io::Error),

    /// The bundled or local template manifest is unreadable
    #[error("Invalid template manifest: {message}")]
    TemplateManifest { message: String },

    /// A components file could not be read or parsed
    #[error("Invalid components file {}: {message}", .path.display())]
    ComponentFile { path: PathBuf, message: String },

    /// IO error
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

impl ScaffoldError {
    /// Create an IO error with the operation that failed
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a template manifest error
    pub fn manifest(message: impl Into<String>) -> Self {
        Self::TemplateManifest {
            message: message.into(),
        }
    }
}

fn format_problems(problems: &[String]) -> String {
    problems
        .iter()
        .map(|p| format!("  - {}", p))
        .collect::<Vec<_>>()
        .join("\n")
}
