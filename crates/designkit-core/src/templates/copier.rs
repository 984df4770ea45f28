//! Writing template files into a project root
//!
//! Files are created, never overwritten. A bare template is written into an
//! empty staging directory, where an existing destination is an error; a
//! staged tree is then copied into the project root, where an existing file
//! is kept and reported instead.

use super::bundled::LoadedTemplate;
use crate::error::{Result, ScaffoldError};
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::debug;
use walkdir::WalkDir;

/// Copy every file a bare template lists into `target_dir`.
///
/// Destination paths are used as written, placeholders included; the token
/// pass renames them afterwards. Fails if a destination already exists.
pub async fn copy_template(template: &LoadedTemplate, target_dir: &Path) -> Result<Vec<String>> {
    fs::create_dir_all(target_dir)
        .await
        .map_err(|e| ScaffoldError::io("Failed to create target directory", e))?;

    let mut copied_files = Vec::new();

    for file in &template.manifest.files {
        let content = template.file(file.source())?;
        let target_path = target_dir.join(file.destination());
        if !write_new(&target_path, content).await? {
            return Err(ScaffoldError::io(
                format!("Failed to write file: {}", target_path.display()),
                std::io::Error::from(std::io::ErrorKind::AlreadyExists),
            ));
        }
        copied_files.push(file.destination().to_string());
    }

    Ok(copied_files)
}

/// Files written by [`copy_tree`], and files left alone because the
/// destination already existed. Paths are relative with `/` separators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CopyReport {
    pub written: Vec<String>,
    pub kept: Vec<String>,
}

/// Copy a staged directory tree into `target_dir`
pub async fn copy_tree(source_dir: &Path, target_dir: &Path) -> Result<CopyReport> {
    let mut report = CopyReport::default();

    for entry in WalkDir::new(source_dir).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| {
            ScaffoldError::io(format!("Failed to walk {}", source_dir.display()), e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(source_dir)
            .map_err(|e| ScaffoldError::manifest(e.to_string()))?;
        let target_path = target_dir.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target_path).await.map_err(|e| {
                ScaffoldError::io(format!("Failed to create directory: {}", target_path.display()), e)
            })?;
        } else if entry.file_type().is_file() {
            let content = fs::read(entry.path()).await.map_err(|e| {
                ScaffoldError::io(format!("Failed to read {}", entry.path().display()), e)
            })?;
            let relative = relative.to_string_lossy().replace('\\', "/");
            if write_new(&target_path, &content).await? {
                report.written.push(relative);
            } else {
                debug!("Keeping existing {}", target_path.display());
                report.kept.push(relative);
            }
        }
    }

    Ok(report)
}

/// Create `target_path` with `content`. Returns `false`, writing nothing,
/// when the path already exists.
async fn write_new(target_path: &Path, content: &[u8]) -> Result<bool> {
    if let Some(parent) = target_path.parent() {
        fs::create_dir_all(parent).await.map_err(|e| {
            ScaffoldError::io(format!("Failed to create directory: {}", parent.display()), e)
        })?;
    }

    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(target_path)
        .await
    {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => {
            return Err(ScaffoldError::io(
                format!("Failed to write file: {}", target_path.display()),
                e,
            ))
        }
    };
    file.write_all(content)
        .await
        .map_err(|e| ScaffoldError::io(format!("Failed to write file: {}", target_path.display()), e))?;
    file.flush()
        .await
        .map_err(|e| ScaffoldError::io(format!("Failed to write file: {}", target_path.display()), e))?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates::bundled::BareTemplate;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_copy_bundled_template_applies_renames() {
        let dir = TempDir::new().unwrap();
        let template = BareTemplate::Bundled.load().await.unwrap();

        let copied = copy_template(&template, dir.path()).await.unwrap();

        assert!(copied.contains(&".gitignore".to_string()));
        assert!(dir.path().join(".gitignore").exists());
        assert!(!dir.path().join("gitignore").exists());
        assert!(dir
            .path()
            .join("src/components/{% componentName %}.ts")
            .exists());
    }

    #[tokio::test]
    async fn test_copy_tree_keeps_structure() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        std::fs::create_dir_all(src.path().join("a/b")).unwrap();
        std::fs::write(src.path().join("a/b/c.txt"), "deep").unwrap();
        std::fs::write(src.path().join("top.txt"), "top").unwrap();

        let report = copy_tree(src.path(), dst.path()).await.unwrap();

        assert_eq!(report.written, vec!["a/b/c.txt".to_string(), "top.txt".to_string()]);
        assert!(report.kept.is_empty());
        assert_eq!(
            std::fs::read_to_string(dst.path().join("a/b/c.txt")).unwrap(),
            "deep"
        );
    }

    #[tokio::test]
    async fn test_copy_tree_keeps_existing_files() {
        let src = TempDir::new().unwrap();
        let dst = TempDir::new().unwrap();
        std::fs::write(src.path().join("keep.txt"), "template").unwrap();
        std::fs::write(src.path().join("new.txt"), "template").unwrap();
        std::fs::write(dst.path().join("keep.txt"), "mine").unwrap();

        let report = copy_tree(src.path(), dst.path()).await.unwrap();

        assert_eq!(report.written, vec!["new.txt".to_string()]);
        assert_eq!(report.kept, vec!["keep.txt".to_string()]);
        assert_eq!(
            std::fs::read_to_string(dst.path().join("keep.txt")).unwrap(),
            "mine"
        );
    }

    #[tokio::test]
    async fn test_copy_template_refuses_existing_destination() {
        let dir = TempDir::new().unwrap();
        let template = BareTemplate::Bundled.load().await.unwrap();
        std::fs::write(dir.path().join("package.json"), "mine").unwrap();

        assert!(copy_template(&template, dir.path()).await.is_err());
        assert_eq!(
            std::fs::read_to_string(dir.path().join("package.json")).unwrap(),
            "mine"
        );
    }
}
