//! Compile targets and component definitions
//!
//! A project declares its components in `components.yaml` as plain data.
//! Target handlers turn that component map into output for one platform;
//! the only handler shipped here logs what it was asked to do.

use crate::error::{Result, ScaffoldError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// File listing a project's components
pub const COMPONENTS_FILE: &str = "components.yaml";

/// Value type of a component property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    String,
    Number,
    Boolean,
    Color,
    Image,
}

/// One declared property of a component
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyDefinition {
    pub name: String,
    pub kind: PropertyKind,
    #[serde(default)]
    pub default: Option<String>,
}

/// A component and its properties
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<PropertyDefinition>,
}

#[derive(Debug, Deserialize)]
struct ComponentsFile {
    #[serde(default)]
    components: Vec<ComponentDefinition>,
}

/// Components keyed by name
pub type ComponentMap = BTreeMap<String, ComponentDefinition>;

/// Load `components.yaml` from a project root
pub fn load_components(root: &Path) -> Result<ComponentMap> {
    let path = root.join(COMPONENTS_FILE);
    let content = std::fs::read_to_string(&path)
        .map_err(|e| ScaffoldError::io(format!("Failed to read {}", path.display()), e))?;
    parse_components(&content).map_err(|message| ScaffoldError::ComponentFile { path, message })
}

fn parse_components(content: &str) -> std::result::Result<ComponentMap, String> {
    let file: ComponentsFile = serde_yaml::from_str(content).map_err(|e| e.to_string())?;

    let mut map = ComponentMap::new();
    for component in file.components {
        if let Some(previous) = map.insert(component.name.clone(), component) {
            return Err(format!("component '{}' is declared twice", previous.name));
        }
    }
    Ok(map)
}

/// A platform the component map can be compiled for
pub trait TargetHandler {
    fn name(&self) -> &'static str;

    /// Produce output for `component_names` under `destination`
    fn compile(
        &self,
        root: &Path,
        destination: &Path,
        component_names: &[String],
        component_map: &ComponentMap,
    ) -> Result<()> {
        info!(
            target_name = self.name(),
            root = %root.display(),
            destination = %destination.display(),
            components = ?component_names,
            declared = component_map.len(),
            "compile requested"
        );
        Ok(())
    }
}

/// Handler that only logs its arguments
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingTarget;

impl TargetHandler for LoggingTarget {
    fn name(&self) -> &'static str {
        "log"
    }
}

/// Handlers selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum TargetKind {
    #[default]
    Log,
}

impl TargetKind {
    pub fn handler(&self) -> Box<dyn TargetHandler> {
        match self {
            TargetKind::Log => Box::new(LoggingTarget),
        }
    }
}

/// Compile every component declared in `root` with `handler`.
/// Returns the names of the compiled components.
pub fn compile_project(
    root: &Path,
    destination: &Path,
    handler: &dyn TargetHandler,
) -> Result<Vec<String>> {
    let component_map = load_components(root)?;
    let names: Vec<String> = component_map.keys().cloned().collect();
    handler.compile(root, destination, &names, &component_map)?;
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use tempfile::TempDir;

    #[derive(Default)]
    struct RecordingTarget {
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl TargetHandler for RecordingTarget {
        fn name(&self) -> &'static str {
            "recording"
        }

        fn compile(
            &self,
            _root: &Path,
            _destination: &Path,
            component_names: &[String],
            _component_map: &ComponentMap,
        ) -> Result<()> {
            self.calls.borrow_mut().push(component_names.to_vec());
            Ok(())
        }
    }

    const SAMPLE: &str = r#"
components:
  - name: Button
    properties:
      - name: label
        kind: string
        default: Click
      - name: tint
        kind: color
  - name: Avatar
    properties:
      - name: src
        kind: image
"#;

    #[test]
    fn test_parse_components() {
        let map = parse_components(SAMPLE).unwrap();
        assert_eq!(map.len(), 2);
        let button = &map["Button"];
        assert_eq!(button.properties[0].kind, PropertyKind::String);
        assert_eq!(button.properties[0].default.as_deref(), Some("Click"));
        assert_eq!(button.properties[1].default, None);
    }

    #[test]
    fn test_duplicate_component_rejected() {
        let err = parse_components("components:\n  - name: A\n  - name: A\n").unwrap_err();
        assert!(err.contains("declared twice"));
    }

    #[test]
    fn test_compile_project_passes_sorted_names() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(COMPONENTS_FILE), SAMPLE).unwrap();

        let handler = RecordingTarget::default();
        let names = compile_project(dir.path(), &dir.path().join("out"), &handler).unwrap();

        assert_eq!(names, vec!["Avatar".to_string(), "Button".to_string()]);
        assert_eq!(handler.calls.borrow().len(), 1);
    }

    #[test]
    fn test_logging_target_is_a_no_op() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(COMPONENTS_FILE), SAMPLE).unwrap();

        let names = compile_project(dir.path(), &dir.path().join("out"), &LoggingTarget).unwrap();
        assert_eq!(names.len(), 2);
        assert!(!dir.path().join("out").exists());
    }

    #[test]
    fn test_missing_components_file() {
        let dir = TempDir::new().unwrap();
        assert!(load_components(dir.path()).is_err());
    }
}
