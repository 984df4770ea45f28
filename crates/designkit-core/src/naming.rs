//! Package name validation
//!
//! Follows npm's rules for names of new packages. Problems are split into
//! errors (never valid) and warnings (valid for old packages only); a new
//! project must have neither.

use crate::error::{Result, ScaffoldError};

/// Longest package name the registry accepts
const MAX_NAME_LENGTH: usize = 214;

/// Names npm refuses outright
const BLACKLIST: &[&str] = &["node_modules", "favicon.ico"];

/// Node.js core modules; a package shadowing one of these is unusable
const CORE_MODULES: &[&str] = &[
    "assert",
    "async_hooks",
    "buffer",
    "child_process",
    "cluster",
    "console",
    "constants",
    "crypto",
    "dgram",
    "diagnostics_channel",
    "dns",
    "domain",
    "events",
    "fs",
    "http",
    "http2",
    "https",
    "inspector",
    "module",
    "net",
    "os",
    "path",
    "perf_hooks",
    "process",
    "punycode",
    "querystring",
    "readline",
    "repl",
    "stream",
    "string_decoder",
    "sys",
    "timers",
    "tls",
    "trace_events",
    "tty",
    "url",
    "util",
    "v8",
    "vm",
    "wasi",
    "worker_threads",
    "zlib",
];

/// Packages every generated project depends on; a project cannot share their name
pub const RESERVED_DEPENDENCIES: &[&str] = &[
    "@designkit/core",
    "@designkit/cli",
    "@designkit/tokens",
    "@designkit/components",
];

/// Outcome of checking a name against npm's rules
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameValidation {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl NameValidation {
    /// Valid for a package published today
    pub fn valid_for_new_packages(&self) -> bool {
        self.errors.is_empty() && self.warnings.is_empty()
    }

    /// Every problem, errors first
    pub fn problems(&self) -> Vec<String> {
        self.errors
            .iter()
            .chain(self.warnings.iter())
            .cloned()
            .collect()
    }
}

/// Check a name against npm's package naming rules
pub fn check_package_name(name: &str) -> NameValidation {
    let mut result = NameValidation::default();

    if name.is_empty() {
        result
            .errors
            .push("name length must be greater than zero".to_string());
        return result;
    }

    if name.starts_with('.') {
        result.errors.push("name cannot start with a period".to_string());
    }
    if name.starts_with('_') {
        result
            .errors
            .push("name cannot start with an underscore".to_string());
    }
    if name.trim() != name {
        result
            .errors
            .push("name cannot contain leading or trailing spaces".to_string());
    }

    let lower = name.to_lowercase();
    if BLACKLIST.contains(&lower.as_str()) {
        result.errors.push(format!("{} is a blacklisted name", name));
    }

    if CORE_MODULES.contains(&lower.as_str()) {
        result.warnings.push(format!("{} is a core module name", name));
    }
    if name.chars().count() > MAX_NAME_LENGTH {
        result.warnings.push(format!(
            "name can no longer contain more than {} characters",
            MAX_NAME_LENGTH
        ));
    }
    if lower != name {
        result
            .warnings
            .push("name can no longer contain capital letters".to_string());
    }
    if base_name(name)
        .chars()
        .any(|c| matches!(c, '~' | '\'' | '!' | '(' | ')' | '*'))
    {
        result
            .warnings
            .push("name can no longer contain special characters (\"~'!()*\")".to_string());
    }

    if !is_url_friendly(name) {
        result
            .errors
            .push("name can only contain URL-friendly characters".to_string());
    }

    if let Some((scope, package)) = split_scope(name) {
        if scope == "." || scope == ".." {
            result
                .errors
                .push("scope cannot be a relative path segment".to_string());
        }
        if package.is_empty() {
            result
                .errors
                .push("package name after the scope cannot be empty".to_string());
        }
        if package.starts_with('.') {
            result
                .errors
                .push("package name after the scope cannot start with a period".to_string());
        }
        if package.starts_with('_') {
            result
                .errors
                .push("package name after the scope cannot start with an underscore".to_string());
        }
    }

    result
}

/// Every problem with `name` as the name of a new project: npm's rules plus
/// the names of packages every generated project depends on.
pub fn package_name_problems(name: &str) -> Vec<String> {
    let mut validation = check_package_name(name);

    if RESERVED_DEPENDENCIES.contains(&name) {
        validation.errors.push(format!(
            "{} is a dependency of every generated project",
            name
        ));
    }

    validation.problems()
}

/// Validate a name for a new project, failing with every problem found
pub fn validate_package_name(name: &str) -> Result<()> {
    let problems = package_name_problems(name);
    if problems.is_empty() {
        Ok(())
    } else {
        Err(ScaffoldError::InvalidPackageName {
            name: name.to_string(),
            problems,
        })
    }
}

/// Directory and token base for a package name (`@scope/app` -> `app`)
pub fn base_name(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// A name is URL-friendly when it needs no percent-encoding, except for an
/// optional `@scope/` prefix whose parts are URL-friendly on their own.
fn is_url_friendly(name: &str) -> bool {
    if is_uri_component(name) {
        return true;
    }
    match split_scope(name) {
        Some((scope, pkg)) => {
            !scope.is_empty()
                && !pkg.is_empty()
                && is_uri_component(scope)
                && is_uri_component(pkg)
        }
        None => false,
    }
}

/// `@scope/pkg` -> `("scope", "pkg")`
fn split_scope(name: &str) -> Option<(&str, &str)> {
    name.strip_prefix('@').and_then(|rest| rest.split_once('/'))
}

/// Characters `encodeURIComponent` leaves untouched
fn is_uri_component(s: &str) -> bool {
    s.chars().all(|c| {
        c.is_ascii_alphanumeric()
            || matches!(c, '-' | '_' | '.' | '!' | '~' | '*' | '\'' | '(' | ')')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_names_are_valid() {
        assert!(validate_package_name("my-cool-app").is_ok());
        assert!(validate_package_name("app2").is_ok());
        assert!(validate_package_name("some.thing_else").is_ok());
    }

    #[test]
    fn test_scoped_names_are_valid() {
        assert!(validate_package_name("@acme/widgets").is_ok());
        assert_eq!(base_name("@acme/widgets"), "widgets");
        assert_eq!(base_name("widgets"), "widgets");
    }

    #[test]
    fn test_illegal_characters_rejected() {
        let result = check_package_name("my app");
        assert!(result
            .errors
            .contains(&"name can only contain URL-friendly characters".to_string()));

        assert!(validate_package_name("a/b/c").is_err());
        assert!(validate_package_name("@/app").is_err());
    }

    #[test]
    fn test_reserved_names_rejected() {
        assert!(validate_package_name("node_modules").is_err());
        assert!(validate_package_name("favicon.ico").is_err());
        assert!(validate_package_name("http").is_err());
        assert!(validate_package_name("@designkit/core").is_err());
    }

    #[test]
    fn test_scoped_package_part_follows_leading_rules() {
        assert!(validate_package_name("@scope/.").is_err());
        assert!(validate_package_name("@scope/..").is_err());
        assert!(validate_package_name("@scope/.hidden").is_err());
        assert!(validate_package_name("@scope/_private").is_err());
        assert!(validate_package_name("@scope/").is_err());
        assert!(validate_package_name("@./app").is_err());
        assert!(validate_package_name("@../app").is_err());

        let result = check_package_name("@scope/..");
        assert!(result.errors.contains(
            &"package name after the scope cannot start with a period".to_string()
        ));
    }

    #[test]
    fn test_reserved_names_are_listed_as_problems() {
        let problems = package_name_problems("@designkit/tokens");
        assert_eq!(
            problems,
            vec!["@designkit/tokens is a dependency of every generated project".to_string()]
        );
        assert!(package_name_problems("my-cool-app").is_empty());
    }

    #[test]
    fn test_all_problems_reported_together() {
        let err = validate_package_name("_My App").unwrap_err();
        match err {
            ScaffoldError::InvalidPackageName { problems, .. } => {
                assert!(problems.contains(&"name cannot start with an underscore".to_string()));
                assert!(problems.contains(&"name can no longer contain capital letters".to_string()));
                assert!(problems
                    .contains(&"name can only contain URL-friendly characters".to_string()));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_and_padded_names() {
        assert_eq!(
            check_package_name("").errors,
            vec!["name length must be greater than zero".to_string()]
        );
        assert!(check_package_name(" app")
            .errors
            .contains(&"name cannot contain leading or trailing spaces".to_string()));
    }

    #[test]
    fn test_special_characters_warn() {
        let result = check_package_name("wow!");
        assert!(result.errors.is_empty());
        assert_eq!(result.warnings.len(), 1);
        assert!(!result.valid_for_new_packages());
    }

    #[test]
    fn test_overlong_name_warns() {
        let name = "a".repeat(215);
        let result = check_package_name(&name);
        assert!(!result.valid_for_new_packages());
        assert!(check_package_name(&"a".repeat(214)).valid_for_new_packages());
    }
}
