//! Placeholder tokens and their substitution
//!
//! Template files refer to the project name through placeholders such as
//! `{% name.pascal %}`. A [`TokenSet`] maps each placeholder key to the
//! matching case conversion of the project's base name and rewrites file
//! contents and file names in place.

use crate::error::{Result, ScaffoldError};
use crate::naming::base_name;
use heck::{
    ToKebabCase, ToLowerCamelCase, ToPascalCase, ToShoutySnakeCase, ToSnakeCase, ToTitleCase,
    ToTrainCase,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Default opening delimiter
pub const DEFAULT_OPEN: &str = "{%";
/// Default closing delimiter
pub const DEFAULT_CLOSE: &str = "%}";

/// Case conversions of a project's base name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameCases {
    pub camel: String,
    pub pascal: String,
    pub kebab: String,
    pub snake: String,
    pub constant: String,
    pub header: String,
    pub dot: String,
    pub title: String,
    pub lower: String,
    pub no_case: String,
}

impl NameCases {
    pub fn new(name: &str) -> Self {
        let snake = name.to_snake_case();
        Self {
            camel: name.to_lower_camel_case(),
            pascal: name.to_pascal_case(),
            kebab: name.to_kebab_case(),
            constant: name.to_shouty_snake_case(),
            header: name.to_train_case(),
            dot: snake.replace('_', "."),
            title: name.to_title_case(),
            lower: name.to_lowercase(),
            no_case: snake.replace('_', " "),
            snake,
        }
    }

    /// Placeholder key and value for every conversion
    fn entries(&self) -> [(&'static str, &str); 10] {
        [
            ("name.camel", self.camel.as_str()),
            ("name.pascal", self.pascal.as_str()),
            ("name.kebab", self.kebab.as_str()),
            ("name.snake", self.snake.as_str()),
            ("name.constant", self.constant.as_str()),
            ("name.header", self.header.as_str()),
            ("name.dot", self.dot.as_str()),
            ("name.title", self.title.as_str()),
            ("name.lower", self.lower.as_str()),
            ("name.nocase", self.no_case.as_str()),
        ]
    }
}

/// What a pass over a tree changed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstitutionSummary {
    pub files_rewritten: usize,
    pub paths_renamed: usize,
}

/// Placeholder values plus the delimiters that mark them
#[derive(Debug, Clone)]
pub struct TokenSet {
    open: String,
    close: String,
    values: BTreeMap<String, String>,
}

impl TokenSet {
    /// An empty set using the default delimiters
    pub fn new() -> Self {
        Self {
            open: DEFAULT_OPEN.to_string(),
            close: DEFAULT_CLOSE.to_string(),
            values: BTreeMap::new(),
        }
    }

    /// The small set the bundled bare template understands
    pub fn bare(package_name: &str, version_pin: &str) -> Self {
        let cases = NameCases::new(base_name(package_name));
        Self::new()
            .with("packageName", package_name)
            .with("version", version_pin)
            .with("componentName", &cases.pascal)
    }

    /// Every case conversion of the base name, plus the bare tokens
    pub fn full(package_name: &str, version_pin: &str) -> Self {
        let cases = NameCases::new(base_name(package_name));
        let mut set = Self::bare(package_name, version_pin);
        for (key, value) in cases.entries() {
            set.values.insert(key.to_string(), value.to_string());
        }
        set
    }

    /// Add or replace one placeholder
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }

    /// Use custom delimiters
    pub fn with_delimiters(mut self, open: &str, close: &str) -> Self {
        self.open = open.to_string();
        self.close = close.to_string();
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Replace every known placeholder in `input`. Unknown placeholders and
    /// unterminated delimiters are kept verbatim.
    pub fn render(&self, input: &str) -> String {
        let mut out = String::with_capacity(input.len());
        let mut rest = input;

        while let Some(start) = rest.find(&self.open) {
            out.push_str(&rest[..start]);
            let after_open = &rest[start + self.open.len()..];

            let Some(end) = after_open.find(&self.close) else {
                out.push_str(&rest[start..]);
                return out;
            };

            let key = after_open[..end].trim();
            match self.values.get(key) {
                Some(value) => out.push_str(value),
                None => out.push_str(&rest[start..start + self.open.len() + end + self.close.len()]),
            }
            rest = &after_open[end + self.close.len()..];
        }

        out.push_str(rest);
        out
    }

    /// Whether `input` holds a placeholder this set would replace
    pub fn matches(&self, input: &str) -> bool {
        input.contains(&self.open) && self.render(input) != input
    }

    /// Rewrite placeholders in every file under `root`, then in file and
    /// directory names. Non-UTF-8 files are skipped. Run this on a staged
    /// template only: every file under `root` is rewritten.
    pub fn apply_to_tree(&self, root: &Path) -> Result<SubstitutionSummary> {
        let mut summary = SubstitutionSummary::default();

        // Children come before their parent so renaming a directory never
        // invalidates a path still waiting to be visited.
        let entries: Vec<_> = WalkDir::new(root)
            .min_depth(1)
            .contents_first(true)
            .into_iter()
            .collect::<std::result::Result<_, _>>()
            .map_err(|e: walkdir::Error| {
                ScaffoldError::io(format!("Failed to walk {}", root.display()), e.into())
            })?;

        for entry in entries {
            let path = entry.path();

            if entry.file_type().is_file() && self.rewrite_file(path)? {
                summary.files_rewritten += 1;
            }

            let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if self.matches(file_name) {
                let rendered = self.render(file_name);
                if !is_single_component(&rendered) {
                    return Err(ScaffoldError::manifest(format!(
                        "file name '{}' renders to '{}', which is not a valid file name",
                        file_name, rendered
                    )));
                }
                let renamed = path.with_file_name(rendered);
                debug!("Renaming {} -> {}", path.display(), renamed.display());
                fs::rename(path, &renamed).map_err(|e| {
                    ScaffoldError::io(format!("Failed to rename {}", path.display()), e)
                })?;
                summary.paths_renamed += 1;
            }
        }

        Ok(summary)
    }

    fn rewrite_file(&self, path: &Path) -> Result<bool> {
        let bytes = fs::read(path)
            .map_err(|e| ScaffoldError::io(format!("Failed to read {}", path.display()), e))?;
        let Ok(content) = String::from_utf8(bytes) else {
            return Ok(false);
        };

        let rendered = self.render(&content);
        if rendered == content {
            return Ok(false);
        }

        fs::write(path, rendered)
            .map_err(|e| ScaffoldError::io(format!("Failed to write {}", path.display()), e))?;
        Ok(true)
    }
}

/// A rendered name must not introduce path separators or relative segments
fn is_single_component(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

impl Default for TokenSet {
    fn default() -> Self {
        Self::new()
    }
}
