//! Bare template manifest types and parsing

use crate::error::{Result, ScaffoldError};
use serde::{Deserialize, Serialize};

/// Name of the manifest file at the root of a bare template
pub const MANIFEST_FILE: &str = "template.yaml";

/// A file copied from the template into a new project.
///
/// Written in YAML either as a plain path or as a `source`/`dest` pair when
/// the file is renamed on the way, e.g. `gitignore` -> `.gitignore` (npm
/// strips dotfiles named `.gitignore` from published packages).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TemplateFile {
    Plain(String),
    Renamed {
        /// Path relative to the template root
        source: String,
        /// Path in the new project; may contain placeholders
        dest: String,
    },
}

impl TemplateFile {
    pub fn source(&self) -> &str {
        match self {
            TemplateFile::Plain(path) => path,
            TemplateFile::Renamed { source, .. } => source,
        }
    }

    /// Destination path (falls back to source if not renamed)
    pub fn destination(&self) -> &str {
        match self {
            TemplateFile::Plain(path) => path,
            TemplateFile::Renamed { dest, .. } => dest,
        }
    }
}

/// Bare template manifest (`template.yaml`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateManifest {
    /// Display name of the template
    pub name: String,

    /// Description of what the template provides
    #[serde(default)]
    pub description: String,

    /// Oldest CLI version the template works with
    pub version: String,

    /// Explicit list of files to copy
    pub files: Vec<TemplateFile>,
}

impl TemplateManifest {
    pub fn parse(content: &str) -> Result<Self> {
        let manifest: TemplateManifest = serde_yaml::from_str(content)
            .map_err(|e| ScaffoldError::manifest(format!("failed to parse {}: {}", MANIFEST_FILE, e)))?;

        if manifest.files.is_empty() {
            return Err(ScaffoldError::manifest(format!(
                "template '{}' lists no files",
                manifest.name
            )));
        }
        if let Some(bad) = manifest
            .files
            .iter()
            .find(|f| !is_relative_inside(f.source()) || !is_relative_inside(f.destination()))
        {
            return Err(ScaffoldError::manifest(format!(
                "template file '{}' must stay inside the template",
                bad.source()
            )));
        }

        Ok(manifest)
    }
}

/// Relative path that never climbs out of its root
fn is_relative_inside(path: &str) -> bool {
    !path.is_empty()
        && !path.starts_with('/')
        && !path.starts_with('\\')
        && !path.split(['/', '\\']).any(|part| part == "..")
}
