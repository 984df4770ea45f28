//! Project request and root directory validation

use crate::error::{Result, ScaffoldError};
use crate::naming::{base_name, validate_package_name};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The file that marks a directory as an existing JavaScript project
pub const PROJECT_DESCRIPTOR: &str = "package.json";

/// Entries that may already sit in a new project's directory. They are left
/// untouched; a template file with the same path is not written.
const HARMLESS_ENTRIES: &[&str] = &[
    ".DS_Store",
    ".git",
    ".gitattributes",
    ".github",
    ".idea",
    ".vscode",
    "LICENSE",
    "README.md",
    "Thumbs.db",
    "docs",
];

/// Log file prefixes left behind by earlier failed installs
const HARMLESS_LOG_PREFIXES: &[&str] = &["npm-debug.log", "yarn-error.log", "yarn-debug.log"];

/// A request to create one project
#[derive(Debug, Clone)]
pub struct ProjectRequest {
    /// Full package name, possibly scoped (`@scope/name`)
    pub package_name: String,

    /// Use the bundled template instead of downloading one
    pub bare: bool,

    /// Directory the project directory is created in
    pub working_directory: PathBuf,

    /// Local bare template directory overriding the bundled one
    pub template_dir: Option<PathBuf>,

    /// Skip the dependency install step
    pub skip_install: bool,

    /// Skip git repository initialization
    pub skip_git: bool,
}

impl ProjectRequest {
    pub fn new(package_name: impl Into<String>, working_directory: impl Into<PathBuf>) -> Self {
        Self {
            package_name: package_name.into(),
            bare: false,
            working_directory: working_directory.into(),
            template_dir: None,
            skip_install: false,
            skip_git: false,
        }
    }

    pub fn bare(mut self, bare: bool) -> Self {
        self.bare = bare;
        self
    }

    pub fn template_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.template_dir = dir;
        self
    }

    pub fn skip_install(mut self, skip: bool) -> Self {
        self.skip_install = skip;
        self
    }

    pub fn skip_git(mut self, skip: bool) -> Self {
        self.skip_git = skip;
        self
    }

    /// Check the package name, failing with every naming problem found
    pub fn validate(&self) -> Result<()> {
        validate_package_name(&self.package_name)
    }

    /// Where the project is created: `<working_directory>/<base name>`
    pub fn root(&self) -> PathBuf {
        self.working_directory.join(base_name(&self.package_name))
    }
}

/// Make sure `root` is a directory a new project can be written into.
///
/// Creates the directory when absent. Fails when a non-directory occupies the
/// path or the directory holds anything outside the harmless allow-list,
/// including a project descriptor. Nothing existing is modified.
pub fn prepare_root(root: &Path) -> Result<()> {
    if root.exists() && !root.is_dir() {
        return Err(ScaffoldError::RootNotADirectory {
            path: root.to_path_buf(),
        });
    }

    fs::create_dir_all(root)
        .map_err(|e| ScaffoldError::io(format!("Failed to create {}", root.display()), e))?;

    let conflicts = conflicting_entries(root)?;
    if !conflicts.is_empty() {
        return Err(ScaffoldError::RootConflict {
            path: root.to_path_buf(),
            conflicts,
        });
    }

    debug!("Project root ready at {}", root.display());
    Ok(())
}

/// Names of entries in `root` that could clash with generated files
fn conflicting_entries(root: &Path) -> Result<Vec<String>> {
    let entries = fs::read_dir(root)
        .map_err(|e| ScaffoldError::io(format!("Failed to read {}", root.display()), e))?;

    let mut conflicts = Vec::new();
    for entry in entries {
        let entry =
            entry.map_err(|e| ScaffoldError::io(format!("Failed to read {}", root.display()), e))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if !is_harmless(&name) {
            let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
            conflicts.push(if is_dir { format!("{}/", name) } else { name });
        }
    }

    // The descriptor is the conflict users care about; list it first.
    conflicts.sort_by_key(|name| (name != PROJECT_DESCRIPTOR, name.clone()));
    Ok(conflicts)
}

fn is_harmless(name: &str) -> bool {
    HARMLESS_ENTRIES.contains(&name)
        || name.ends_with(".iml")
        || HARMLESS_LOG_PREFIXES
            .iter()
            .any(|prefix| name.starts_with(prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_root_uses_base_name() {
        let request = ProjectRequest::new("@acme/widgets", "/work");
        assert_eq!(request.root(), PathBuf::from("/work/widgets"));
    }

    #[test]
    fn test_prepare_root_creates_missing_directory() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("fresh");
        prepare_root(&root).unwrap();
        assert!(root.is_dir());
    }

    #[test]
    fn test_prepare_root_accepts_harmless_entries() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::create_dir(dir.path().join(".vscode")).unwrap();
        fs::write(dir.path().join("project.iml"), "").unwrap();
        fs::write(dir.path().join("npm-debug.log.123"), "").unwrap();
        assert!(prepare_root(dir.path()).is_ok());
    }

    #[test]
    fn test_every_listed_entry_is_harmless() {
        for name in HARMLESS_ENTRIES {
            let dir = TempDir::new().unwrap();
            fs::write(dir.path().join(name), "").unwrap();
            assert!(prepare_root(dir.path()).is_ok(), "{} should be harmless", name);
        }

        for name in ["docs", ".github", ".idea"] {
            let dir = TempDir::new().unwrap();
            fs::create_dir(dir.path().join(name)).unwrap();
            assert!(prepare_root(dir.path()).is_ok(), "{}/ should be harmless", name);
        }

        for name in ["yarn-error.log", "yarn-debug.log.1", "app.iml"] {
            assert!(is_harmless(name), "{} should be harmless", name);
        }
    }

    #[test]
    fn test_unlisted_dotfiles_conflict() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(".npmignore"), "").unwrap();
        fs::write(dir.path().join(".travis.yml"), "").unwrap();

        match prepare_root(dir.path()).unwrap_err() {
            ScaffoldError::RootConflict { conflicts, .. } => {
                assert_eq!(conflicts, vec![".npmignore".to_string(), ".travis.yml".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_prepare_root_rejects_descriptor() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("package.json"), "{\"name\":\"mine\"}").unwrap();
        fs::create_dir(dir.path().join("src")).unwrap();

        match prepare_root(dir.path()).unwrap_err() {
            ScaffoldError::RootConflict { conflicts, .. } => {
                assert_eq!(conflicts, vec!["package.json".to_string(), "src/".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(
            fs::read_to_string(dir.path().join("package.json")).unwrap(),
            "{\"name\":\"mine\"}"
        );
    }

    #[test]
    fn test_prepare_root_rejects_file_in_place() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("taken");
        fs::write(&root, "not a directory").unwrap();
        assert!(matches!(
            prepare_root(&root),
            Err(ScaffoldError::RootNotADirectory { .. })
        ));
    }
}
