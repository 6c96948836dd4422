//! Project configuration loaded from `pyproject.toml`.
//!
//! ```toml
//! [tool.briefcase]
//! project_name = "Demo"
//! bundle = "com.example"
//! version = "1.0"
//! requires = ["attrs"]
//!
//! [tool.briefcase.app.demo]
//! formal_name = "Demo"
//! sources = ["src/demo"]
//! requires = ["requests"]
//!
//! [tool.briefcase.app.demo.macOS]
//! requires = ["rubicon-objc"]
//! ```
//!
//! Project keys are inherited by every app, then the app table, then the
//! platform table, then the output-format table are layered on top. List
//! keys concatenate across layers; every other key is replaced.

use super::AppDescriptor;
use crate::error::{BriefcaseError, ConfigError, Result};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use toml::{Table, Value};

/// Name of the project configuration file.
pub const PROJECT_FILE: &str = "pyproject.toml";

const LIST_KEYS: [&str; 2] = ["requires", "sources"];
const REQUIRED_KEYS: [&str; 3] = ["formal_name", "bundle", "version"];

/// Every app declared by a project, keyed (and ordered) by name.
#[derive(Debug, Clone, Default)]
pub struct ProjectConfig {
    /// Apps in ascending name order
    pub apps: BTreeMap<String, AppDescriptor>,
}

impl ProjectConfig {
    /// Load `pyproject.toml` from `base_path` with no platform overlay.
    pub fn load(base_path: &Path) -> Result<Self> {
        Self::load_for(base_path, None, None)
    }

    /// Load `pyproject.toml` from `base_path`, layering the given platform
    /// and output-format sections over each app.
    pub fn load_for(base_path: &Path, platform: Option<&str>, output_format: Option<&str>) -> Result<Self> {
        let path = base_path.join(PROJECT_FILE);
        let contents = std::fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::MissingFile { path: path.clone() }.into(),
            _ => BriefcaseError::Io(e),
        })?;
        Self::parse(&contents, &path, platform, output_format)
    }

    /// Parse configuration text; `path` is only used in error messages.
    pub fn parse(
        contents: &str,
        path: &Path,
        platform: Option<&str>,
        output_format: Option<&str>,
    ) -> Result<Self> {
        let document: Table = contents.parse().map_err(|e: toml::de::Error| ConfigError::Malformed {
            path: path.to_path_buf(),
            reason: e.message().to_string(),
        })?;

        let briefcase = document
            .get("tool")
            .and_then(|tool| tool.get("briefcase"))
            .and_then(Value::as_table)
            .ok_or_else(|| ConfigError::MissingKey {
                path: path.to_path_buf(),
                key: "tool.briefcase".to_string(),
            })?;

        let app_tables = briefcase
            .get("app")
            .and_then(Value::as_table)
            .filter(|apps| !apps.is_empty())
            .ok_or_else(|| ConfigError::MissingKey {
                path: path.to_path_buf(),
                key: "tool.briefcase.app".to_string(),
            })?;

        let mut apps = BTreeMap::new();
        for (name, app_value) in app_tables {
            let app_table = app_value.as_table().ok_or_else(|| ConfigError::InvalidValue {
                path: path.to_path_buf(),
                key: format!("tool.briefcase.app.{}", name),
                reason: "expected a table".to_string(),
            })?;

            let mut merged = Table::new();
            merge_layer(&mut merged, briefcase);
            merge_layer(&mut merged, app_table);
            if let Some(platform) = platform
                && let Some(platform_table) = app_table.get(platform).and_then(Value::as_table)
            {
                merge_layer(&mut merged, platform_table);
                if let Some(format) = output_format
                    && let Some(format_table) = platform_table.get(format).and_then(Value::as_table)
                {
                    merge_layer(&mut merged, format_table);
                }
            }
            merged.insert("name".to_string(), Value::String(name.clone()));

            apps.insert(name.clone(), build_app(name, merged, path)?);
        }

        log::debug!("Loaded {} app(s) from {}", apps.len(), path.display());
        Ok(Self { apps })
    }

    /// Look up one app by name.
    pub fn app(&self, name: &str) -> Option<&AppDescriptor> {
        self.apps.get(name)
    }
}

/// Overlay the scalar and list keys of `layer` onto `merged`.
///
/// Nested tables are platform or format sections and are layered separately,
/// except `document_type`, whose entries are merged by extension.
fn merge_layer(merged: &mut Table, layer: &Table) {
    for (key, value) in layer {
        match value {
            Value::Table(doctypes) if key == "document_type" => {
                let entry = merged
                    .entry(key.clone())
                    .or_insert_with(|| Value::Table(Table::new()));
                if let Value::Table(existing) = entry {
                    for (ext, doctype) in doctypes {
                        existing.insert(ext.clone(), doctype.clone());
                    }
                }
            }
            Value::Table(_) => {}
            Value::Array(items) if LIST_KEYS.contains(&key.as_str()) => {
                match merged.get_mut(key) {
                    Some(Value::Array(existing)) => existing.extend(items.iter().cloned()),
                    _ => {
                        merged.insert(key.clone(), value.clone());
                    }
                }
            }
            _ => {
                merged.insert(key.clone(), value.clone());
            }
        }
    }
}

fn build_app(name: &str, merged: Table, path: &Path) -> Result<AppDescriptor> {
    for key in REQUIRED_KEYS {
        if !merged.contains_key(key) {
            return Err(ConfigError::MissingKey {
                path: path.to_path_buf(),
                key: format!("tool.briefcase.app.{}.{}", name, key),
            }
            .into());
        }
    }

    Value::Table(merged).try_into().map_err(|e: toml::de::Error| {
        ConfigError::InvalidValue {
            path: PathBuf::from(path),
            key: format!("tool.briefcase.app.{}", name),
            reason: e.message().to_string(),
        }
        .into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PYPROJECT: &str = r#"
[tool.briefcase]
project_name = "Demo Project"
bundle = "com.example"
version = "1.0"
author = "Jane Developer"
requires = ["attrs"]

[tool.briefcase.app.zeta]
formal_name = "Zeta"
description = "Last app"
sources = ["src/zeta"]

[tool.briefcase.app.demo]
formal_name = "Demo"
description = "A demo app"
sources = ["src/demo"]
requires = ["requests"]
icon = "resources/demo"

[tool.briefcase.app.demo.document_type.dmo]
icon = "resources/dmo"
description = "Demo document"

[tool.briefcase.app.demo.macOS]
requires = ["rubicon-objc"]
support_package = "/tmp/support.tar.gz"

[tool.briefcase.app.demo.macOS.app]
version = "1.0.1"
"#;

    fn parse(platform: Option<&str>, format: Option<&str>) -> ProjectConfig {
        ProjectConfig::parse(PYPROJECT, Path::new("pyproject.toml"), platform, format)
            .expect("valid config")
    }

    #[test]
    fn test_apps_are_sorted_by_name() {
        let config = parse(None, None);
        let names: Vec<_> = config.apps.keys().cloned().collect();
        assert_eq!(names, vec!["demo", "zeta"]);
    }

    #[test]
    fn test_project_keys_are_inherited() {
        let config = parse(None, None);
        let zeta = config.app("zeta").expect("zeta");
        assert_eq!(zeta.bundle, "com.example");
        assert_eq!(zeta.version, "1.0");
        assert_eq!(zeta.author.as_deref(), Some("Jane Developer"));
        assert_eq!(zeta.requires, vec!["attrs"]);
        assert_eq!(zeta.icon, None);
    }

    #[test]
    fn test_list_keys_concatenate_across_layers() {
        let config = parse(Some("macOS"), Some("app"));
        let demo = config.app("demo").expect("demo");
        assert_eq!(demo.requires, vec!["attrs", "requests", "rubicon-objc"]);
        assert_eq!(demo.sources, vec!["src/demo"]);
        assert_eq!(demo.version, "1.0.1");
        assert_eq!(demo.support_package.as_deref(), Some("/tmp/support.tar.gz"));
    }

    #[test]
    fn test_platform_sections_ignored_without_platform() {
        let config = parse(None, None);
        let demo = config.app("demo").expect("demo");
        assert_eq!(demo.requires, vec!["attrs", "requests"]);
        assert_eq!(demo.support_package, None);
        assert_eq!(demo.version, "1.0");
    }

    #[test]
    fn test_document_types_are_loaded() {
        let config = parse(None, None);
        let demo = config.app("demo").expect("demo");
        assert_eq!(demo.document_type_icon("dmo"), Some("resources/dmo"));
        assert_eq!(demo.module_name(), "demo");
    }

    #[test]
    fn test_missing_briefcase_section() {
        let err = ProjectConfig::parse("[tool.other]\nx = 1\n", Path::new("pyproject.toml"), None, None)
            .expect_err("should fail");
        assert!(matches!(
            err,
            BriefcaseError::Config(ConfigError::MissingKey { ref key, .. }) if key == "tool.briefcase"
        ));
    }

    #[test]
    fn test_missing_required_key() {
        let text = "[tool.briefcase]\nversion = \"1.0\"\n[tool.briefcase.app.x]\nformal_name = \"X\"\n";
        let err = ProjectConfig::parse(text, Path::new("pyproject.toml"), None, None)
            .expect_err("should fail");
        assert!(matches!(
            err,
            BriefcaseError::Config(ConfigError::MissingKey { ref key, .. }) if key == "tool.briefcase.app.x.bundle"
        ));
    }

    #[test]
    fn test_malformed_toml() {
        let err = ProjectConfig::parse("[tool.briefcase", Path::new("pyproject.toml"), None, None)
            .expect_err("should fail");
        assert!(matches!(err, BriefcaseError::Config(ConfigError::Malformed { .. })));
    }

    #[test]
    fn test_load_missing_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let err = ProjectConfig::load(tmp.path()).expect_err("should fail");
        assert!(matches!(err, BriefcaseError::Config(ConfigError::MissingFile { .. })));
    }

    #[test]
    fn test_unreadable_file_is_not_reported_missing() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(tmp.path().join(PROJECT_FILE)).expect("mkdir");
        let err = ProjectConfig::load(tmp.path()).expect_err("should fail");
        assert!(matches!(err, BriefcaseError::Io(_)));
    }
}
