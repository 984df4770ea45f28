//! Version comparison and pinning for templates

use anyhow::Result;
use semver::Version;

/// Compare CLI version against the version a template expects
/// Returns a warning message if the CLI is older than the template expects
pub fn check_compatibility(
    cli_version: &str,
    template_version: &str,
    upgrade_command: &str,
) -> Option<String> {
    let cli_ver = parse_version(cli_version).ok()?;
    let template_ver = parse_version(template_version).ok()?;

    if cli_ver < template_ver {
        Some(format!(
            "Warning: This template was designed for CLI version {} or newer.\n\
             You are running version {}.\n\
             Consider updating: {}",
            template_version, cli_version, upgrade_command
        ))
    } else {
        None
    }
}

/// Parse version string, handling various formats
pub fn parse_version(version_str: &str) -> Result<Version> {
    // Remove leading 'v' if present
    let cleaned = version_str.strip_prefix('v').unwrap_or(version_str);
    Version::parse(cleaned).map_err(|e| anyhow::anyhow!("Invalid version '{}': {}", version_str, e))
}

/// Dependency range that generated projects use for designkit packages.
///
/// Pinned to the CLI's minor release (`0.4.2` -> `^0.4.0`); an unparseable
/// version is passed through unchanged.
pub fn version_pin(cli_version: &str) -> String {
    match parse_version(cli_version) {
        Ok(v) if !v.pre.is_empty() => format!("{}", v),
        Ok(v) => format!("^{}.{}.0", v.major, v.minor),
        Err(_) => cli_version.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_older_than_template() {
        let warning = check_compatibility("0.1.0", "0.2.0", "cargo install designkit-tools --force");
        assert!(warning.is_some());
        assert!(warning.unwrap().contains("0.2.0"));
    }

    #[test]
    fn test_cli_same_as_template() {
        let warning = check_compatibility("0.1.0", "0.1.0", "cargo install designkit-tools --force");
        assert!(warning.is_none());
    }

    #[test]
    fn test_cli_newer_than_template() {
        let warning = check_compatibility("0.2.0", "v0.1.0", "cargo install designkit-tools --force");
        assert!(warning.is_none());
    }

    #[test]
    fn test_invalid_versions() {
        // Should return None (no warning) for invalid versions
        let warning = check_compatibility("invalid", "0.1.0", "cargo install designkit-tools --force");
        assert!(warning.is_none());
    }

    #[test]
    fn test_version_pin() {
        assert_eq!(version_pin("0.4.2"), "^0.4.0");
        assert_eq!(version_pin("v1.12.7"), "^1.12.0");
        assert_eq!(version_pin("2.0.0-beta.1"), "2.0.0-beta.1");
        assert_eq!(version_pin("next"), "next");
    }
}
