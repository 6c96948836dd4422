//! Per-application configuration.

use crate::template::TemplateContext;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Settings for one document type the app can open.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentType {
    /// Icon base name, relative to the project directory, without size or extension
    #[serde(default)]
    pub icon: Option<String>,
    /// Human readable description of the document type
    #[serde(default)]
    pub description: Option<String>,
    /// URL describing the document type
    #[serde(default)]
    pub url: Option<String>,
}

/// Immutable description of one application in a project.
///
/// Built once from `pyproject.toml` before the pipeline runs. Its identity is
/// its `name`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppDescriptor {
    /// Machine-friendly app name
    pub name: String,
    /// Human-friendly app name; also the bundle directory name
    pub formal_name: String,
    /// Reverse-domain bundle prefix, e.g. `com.example`
    pub bundle: String,
    /// App version string
    pub version: String,
    /// Importable module name; derived from `name` when not configured
    #[serde(default)]
    pub module_name: Option<String>,
    /// App author
    #[serde(default)]
    pub author: Option<String>,
    /// Author contact address
    #[serde(default)]
    pub author_email: Option<String>,
    /// Project home page
    #[serde(default)]
    pub url: Option<String>,
    /// One-line summary
    #[serde(default)]
    pub description: Option<String>,
    /// Source paths, relative to the project directory
    #[serde(default)]
    pub sources: Vec<String>,
    /// Requirement strings handed to the package installer
    #[serde(default)]
    pub requires: Vec<String>,
    /// Explicit template (directory or repository URL)
    #[serde(default)]
    pub template: Option<String>,
    /// Explicit support package (local path or URL)
    #[serde(default)]
    pub support_package: Option<String>,
    /// Icon base name
    #[serde(default)]
    pub icon: Option<String>,
    /// Splash image base name
    #[serde(default)]
    pub splash: Option<String>,
    /// Document types keyed by file extension
    #[serde(default, rename = "document_type")]
    pub document_types: BTreeMap<String, DocumentType>,
}

impl AppDescriptor {
    /// Minimal descriptor; every optional setting is left unset.
    pub fn new(
        name: impl Into<String>,
        formal_name: impl Into<String>,
        bundle: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            formal_name: formal_name.into(),
            bundle: bundle.into(),
            version: version.into(),
            module_name: None,
            author: None,
            author_email: None,
            url: None,
            description: None,
            sources: Vec::new(),
            requires: Vec::new(),
            template: None,
            support_package: None,
            icon: None,
            splash: None,
            document_types: BTreeMap::new(),
        }
    }

    /// Module name: explicit setting, else `name` with dashes as underscores.
    pub fn module_name(&self) -> String {
        self.module_name
            .clone()
            .unwrap_or_else(|| self.name.replace('-', "_"))
    }

    /// Icon base name for documents with the given extension.
    pub fn document_type_icon(&self, extension: &str) -> Option<&str> {
        self.document_types
            .get(extension)
            .and_then(|doctype| doctype.icon.as_deref())
    }

    /// Every field flattened into a template context, with `module_name` resolved.
    pub fn template_context(&self) -> TemplateContext {
        let mut context = match serde_json::to_value(self) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => TemplateContext::new(),
        };
        context.insert(
            "module_name".to_string(),
            serde_json::Value::String(self.module_name()),
        );
        context
    }
}
