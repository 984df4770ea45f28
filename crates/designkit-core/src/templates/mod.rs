//! Template acquisition, copying, and packing
//!
//! This module provides:
//! - The bare template (bundled or from a local directory) and its manifest
//! - Remote archive download with streamed extraction
//! - Copying template files into a project root
//! - Packing a template directory into a publishable archive
//! - Version compatibility checking

pub mod bundled;
pub mod copier;
pub mod fetcher;
pub mod manifest;
pub mod version;

use crate::error::{Result, ScaffoldError};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::path::Path;
use walkdir::WalkDir;

pub use bundled::{BareTemplate, LoadedTemplate};
pub use copier::{copy_template, copy_tree, CopyReport};
pub use fetcher::{ArchiveSource, TemplateFetcher};
pub use manifest::{TemplateFile, TemplateManifest};
pub use version::{check_compatibility, version_pin};

/// Directory every entry of a packed archive lives under
pub const ARCHIVE_WRAPPER: &str = "package";

/// Pack `template_dir` into a gzipped tarball at `out`, wrapping every entry
/// in a `package/` directory. Returns the number of files packed.
pub fn pack_archive(template_dir: &Path, out: &Path) -> Result<usize> {
    if !template_dir.is_dir() {
        return Err(ScaffoldError::manifest(format!(
            "template directory not found: {}",
            template_dir.display()
        )));
    }

    let file_count = WalkDir::new(template_dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .count();

    let file = File::create(out)
        .map_err(|e| ScaffoldError::io(format!("Failed to create {}", out.display()), e))?;
    let mut builder = tar::Builder::new(GzEncoder::new(file, Compression::default()));
    builder
        .append_dir_all(ARCHIVE_WRAPPER, template_dir)
        .map_err(|e| ScaffoldError::io(format!("Failed to pack {}", template_dir.display()), e))?;
    builder
        .into_inner()
        .and_then(|encoder| encoder.finish())
        .map_err(|e| ScaffoldError::io(format!("Failed to write {}", out.display()), e))?;

    Ok(file_count)
}
