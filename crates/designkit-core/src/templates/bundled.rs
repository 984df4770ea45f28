//! The bare template: compiled into the binary, or read from a local directory

use super::manifest::{TemplateManifest, MANIFEST_FILE};
use crate::error::{Result, ScaffoldError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;

/// Files of the bundled bare template, keyed by their path in the template
const BUNDLED_FILES: &[(&str, &str)] = &[
    (
        MANIFEST_FILE,
        include_str!("../../templates/bare/template.yaml"),
    ),
    (
        "package.json",
        include_str!("../../templates/bare/package.json"),
    ),
    ("README.md", include_str!("../../templates/bare/README.md")),
    (
        "tsconfig.json",
        include_str!("../../templates/bare/tsconfig.json"),
    ),
    (
        "components.yaml",
        include_str!("../../templates/bare/components.yaml"),
    ),
    (
        "src/index.ts",
        include_str!("../../templates/bare/src/index.ts"),
    ),
    (
        "src/component.ts",
        include_str!("../../templates/bare/src/component.ts"),
    ),
    ("gitignore", include_str!("../../templates/bare/gitignore")),
];

/// Where the bare template comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BareTemplate {
    Bundled,
    Local(PathBuf),
}

/// A bare template held in memory
#[derive(Debug, Clone)]
pub struct LoadedTemplate {
    pub manifest: TemplateManifest,
    files: HashMap<String, Vec<u8>>,
}

impl LoadedTemplate {
    /// Contents of a template file by its source path
    pub fn file(&self, source: &str) -> Result<&[u8]> {
        self.files.get(source).map(Vec::as_slice).ok_or_else(|| {
            ScaffoldError::manifest(format!(
                "file '{}' is listed in {} but missing from template '{}'",
                source, MANIFEST_FILE, self.manifest.name
            ))
        })
    }
}

impl BareTemplate {
    /// The compiled-in template, or a local directory when one is given
    pub fn from_dir(dir: Option<PathBuf>) -> Self {
        match dir {
            Some(path) => BareTemplate::Local(path),
            None => BareTemplate::Bundled,
        }
    }

    /// Read the manifest and every file it lists
    pub async fn load(&self) -> Result<LoadedTemplate> {
        match self {
            BareTemplate::Bundled => Self::load_bundled(),
            BareTemplate::Local(dir) => Self::load_local(dir).await,
        }
    }

    fn load_bundled() -> Result<LoadedTemplate> {
        let files: HashMap<String, Vec<u8>> = BUNDLED_FILES
            .iter()
            .map(|(path, content)| (path.to_string(), content.as_bytes().to_vec()))
            .collect();

        let manifest_content = files
            .get(MANIFEST_FILE)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
            .ok_or_else(|| ScaffoldError::manifest("bundled template has no manifest"))?;
        let manifest = TemplateManifest::parse(&manifest_content)?;

        let template = LoadedTemplate { manifest, files };
        for file in &template.manifest.files {
            template.file(file.source())?;
        }
        Ok(template)
    }

    async fn load_local(dir: &Path) -> Result<LoadedTemplate> {
        let manifest_path = dir.join(MANIFEST_FILE);
        let manifest_content = fs::read_to_string(&manifest_path).await.map_err(|e| {
            ScaffoldError::io(format!("Failed to read {}", manifest_path.display()), e)
        })?;
        let manifest = TemplateManifest::parse(&manifest_content)?;

        let mut files = HashMap::new();
        for file in &manifest.files {
            let path = dir.join(file.source());
            let content = fs::read(&path)
                .await
                .map_err(|e| ScaffoldError::io(format!("Failed to read {}", path.display()), e))?;
            files.insert(file.source().to_string(), content);
        }

        Ok(LoadedTemplate { manifest, files })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bundled_template_is_complete() {
        let template = BareTemplate::Bundled.load().await.unwrap();
        assert_eq!(template.manifest.name, "bare");
        for file in &template.manifest.files {
            assert!(template.file(file.source()).is_ok(), "{}", file.source());
        }
        let package = String::from_utf8_lossy(template.file("package.json").unwrap());
        assert!(package.contains("{% packageName %}"));
    }

    #[tokio::test]
    async fn test_local_template_missing_file() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(MANIFEST_FILE),
            "name: local\nversion: 0.1.0\nfiles:\n  - missing.txt\n",
        )
        .unwrap();

        let err = BareTemplate::Local(dir.path().to_path_buf())
            .load()
            .await
            .unwrap_err();
        assert!(err.to_string().contains("missing.txt"));
    }
}
