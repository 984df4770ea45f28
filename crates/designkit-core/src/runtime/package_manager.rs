//! Package manager probing and dependency installation
//!
//! Yarn is preferred. npm is the fallback, but only once it has been shown to
//! run in the directory we start it from: `npm config list` reports the
//! working directory it sees, and on some misconfigured shells that differs
//! from ours.

use super::env::HostEnvironment;
use crate::error::{Result, ScaffoldError};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Line prefix npm uses for its working directory in `npm config list`
const NPM_CWD_PREFIX: &str = "; cwd = ";

/// Supported package managers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PackageManager {
    Yarn,
    Npm,
}

impl PackageManager {
    /// Executable name
    pub fn program(&self) -> &'static str {
        match self {
            PackageManager::Yarn => "yarn",
            PackageManager::Npm => "npm",
        }
    }

    /// Arguments that install a project's dependencies
    pub fn install_args(&self) -> &'static [&'static str] {
        &["install"]
    }

    /// The install command as a user would type it
    pub fn install_command(&self) -> String {
        format!("{} {}", self.program(), self.install_args().join(" "))
    }

    /// Command that runs a package script
    pub fn run_command(&self, script: &str) -> String {
        match self {
            PackageManager::Yarn => format!("yarn {}", script),
            PackageManager::Npm => format!("npm run {}", script),
        }
    }
}

impl fmt::Display for PackageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program())
    }
}

/// Result of probing one package manager
#[derive(Debug, Clone)]
pub struct ManagerInfo {
    pub manager: PackageManager,
    pub version: Option<String>,
}

/// Pick the package manager to use for a project created from `working_dir`.
///
/// Fails before anything is written when neither manager can be trusted.
pub fn probe<E: HostEnvironment>(env: &E, working_dir: &Path) -> Result<ManagerInfo> {
    if let Some(version) = env.version(PackageManager::Yarn.program(), working_dir) {
        info!("Using yarn {}", version);
        return Ok(ManagerInfo {
            manager: PackageManager::Yarn,
            version: Some(version),
        });
    }

    debug!("yarn not found, falling back to npm");
    let version = env
        .version(PackageManager::Npm.program(), working_dir)
        .ok_or(ScaffoldError::PackageManagerUnavailable)?;

    check_npm_cwd(env, working_dir)?;

    info!("Using npm {}", version);
    Ok(ManagerInfo {
        manager: PackageManager::Npm,
        version: Some(version),
    })
}

/// Confirm npm sees `dir` as its working directory.
///
/// A config dump without a cwd line comes from an npm too old to report it
/// and is accepted.
pub fn check_npm_cwd<E: HostEnvironment>(env: &E, dir: &Path) -> Result<()> {
    let output = match env.output("npm", &["config", "list"], dir) {
        Ok(out) if out.success => out,
        Ok(out) => {
            debug!("npm config list failed: {}", out.stderr.trim());
            return Ok(());
        }
        Err(e) => {
            debug!("npm config list could not run: {}", e);
            return Ok(());
        }
    };

    let Some(reported) = parse_npm_cwd(&output.stdout) else {
        return Ok(());
    };

    if same_path(&reported, dir) {
        Ok(())
    } else {
        Err(ScaffoldError::NpmCwdMismatch {
            expected: dir.to_path_buf(),
            reported,
        })
    }
}

/// Extract the working directory from an `npm config list` dump
pub fn parse_npm_cwd(config_dump: &str) -> Option<PathBuf> {
    config_dump
        .lines()
        .find_map(|line| line.strip_prefix(NPM_CWD_PREFIX))
        .map(|cwd| PathBuf::from(cwd.trim()))
}

fn same_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

/// Install dependencies in `root`, returning a remediation hint on failure
pub async fn install<E: HostEnvironment>(
    env: &E,
    manager: PackageManager,
    root: &Path,
) -> std::result::Result<(), String> {
    info!("Installing dependencies with {} in {}", manager, root.display());

    env.stream(manager.program(), manager.install_args(), root)
        .await
        .map_err(|e| {
            format!(
                "Dependency installation failed: {}\nThe project was still created. Install dependencies manually:\n  cd {}\n  {}",
                e,
                root.display(),
                manager.install_command()
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_npm_cwd() {
        let dump = "; \"user\" config from /home/me/.npmrc\n\n\
                    ; node bin location = /usr/bin/node\n\
                    ; cwd = /home/me/projects\n\
                    ; HOME = /home/me\n";
        assert_eq!(parse_npm_cwd(dump), Some(PathBuf::from("/home/me/projects")));
    }

    #[test]
    fn test_parse_npm_cwd_missing() {
        assert_eq!(parse_npm_cwd("; node version = v8.0.0\n"), None);
    }

    #[test]
    fn test_install_command_strings() {
        assert_eq!(PackageManager::Yarn.install_command(), "yarn install");
        assert_eq!(PackageManager::Npm.install_command(), "npm install");
        assert_eq!(PackageManager::Npm.run_command("start"), "npm run start");
        assert_eq!(PackageManager::Yarn.run_command("start"), "yarn start");
    }

    #[test]
    fn test_same_path_matches_identical_paths() {
        let dir = std::env::temp_dir();
        assert!(same_path(&dir, &dir));
        assert!(!same_path(
            Path::new("/definitely/not/here"),
            Path::new("/also/not/here")
        ));
    }
}
