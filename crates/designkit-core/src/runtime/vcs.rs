//! Best-effort git repository initialization

use super::env::HostEnvironment;
use std::path::Path;
use tracing::debug;

/// Initialize a git repository in `root`.
///
/// Returns `true` when a new repository was created. Missing git, an
/// enclosing work tree, or a failed `git init` all return `false` without
/// surfacing an error.
pub fn try_git_init<E: HostEnvironment>(env: &E, root: &Path) -> bool {
    if !env.is_available("git", root) {
        debug!("git not available, skipping repository init");
        return false;
    }

    if let Ok(out) = env.output("git", &["rev-parse", "--is-inside-work-tree"], root) {
        if out.success && out.stdout.trim() == "true" {
            debug!("{} is already inside a git work tree", root.display());
            return false;
        }
    }

    match env.output("git", &["init"], root) {
        Ok(out) if out.success => true,
        Ok(out) => {
            debug!("git init failed: {}", out.stderr.trim());
            false
        }
        Err(e) => {
            debug!("git init could not run: {}", e);
            false
        }
    }
}
