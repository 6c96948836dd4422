//! Template-declared bundle layout.
//!
//! Every expanded template carries a `briefcase.toml` at the bundle root
//! whose `[paths]` table tells the pipeline where things go:
//!
//! ```toml
//! [paths]
//! support_path = "Demo.app/Contents/Resources/support"
//! app_packages_path = "Demo.app/Contents/Resources/app_packages"
//! app_path = "Demo.app/Contents/Resources/app"
//! icon = "Demo.app/Contents/Resources/Demo.icns"
//!
//! [paths.splash]
//! 640 = "Demo.app/splash-640.png"
//! 1280 = "Demo.app/splash-1280.png"
//!
//! [paths.document_type_icon]
//! dmo = "Demo.app/Contents/Resources/dmo.icns"
//! ```
//!
//! Image roles may be a single path or a table keyed by size; both shapes are
//! normalized into [`Targets`] when the file is loaded.

use crate::bundler::Bundler;
use crate::bundler::builder::lock;
use crate::config::AppDescriptor;
use crate::error::{BriefcaseError, ConfigError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Name of the layout manifest inside an expanded bundle.
pub const PATH_INDEX_FILE: &str = "briefcase.toml";

/// Image targets keyed by size; `None` means "no particular size".
pub type Targets = BTreeMap<Option<String>, String>;

/// Either shape an image role may take in the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TargetSpec {
    /// One target of unspecified size
    Unsized(String),
    /// Targets keyed by size
    Sized(BTreeMap<String, String>),
}

impl TargetSpec {
    /// Normalize into a size-keyed mapping.
    pub fn into_targets(self) -> Targets {
        match self {
            TargetSpec::Unsized(path) => BTreeMap::from([(None, path)]),
            TargetSpec::Sized(map) => map
                .into_iter()
                .map(|(size, path)| (Some(size), path))
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Manifest {
    paths: RawPaths,
}

#[derive(Debug, Deserialize)]
struct RawPaths {
    support_path: Option<String>,
    app_packages_path: Option<String>,
    app_path: Option<String>,
    icon: Option<TargetSpec>,
    splash: Option<TargetSpec>,
    #[serde(default)]
    document_type_icon: BTreeMap<String, TargetSpec>,
}

/// Normalized bundle layout for one app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathIndex {
    manifest: PathBuf,
    support_path: Option<String>,
    app_packages_path: Option<String>,
    app_path: Option<String>,
    /// Application icon targets
    pub icon: Targets,
    /// Splash image targets
    pub splash: Targets,
    /// Document type icon targets keyed by extension
    pub document_type_icon: BTreeMap<String, Targets>,
}

impl PathIndex {
    /// Read `briefcase.toml` from the root of `bundle_path`.
    pub fn load(bundle_path: &Path) -> Result<Self> {
        let manifest = bundle_path.join(PATH_INDEX_FILE);
        let contents = std::fs::read_to_string(&manifest).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::MissingFile {
                path: manifest.clone(),
            }
            .into(),
            _ => BriefcaseError::Io(e),
        })?;
        Self::parse(&contents, &manifest)
    }

    /// Parse manifest text; `manifest` is only used in error messages.
    pub fn parse(contents: &str, manifest: &Path) -> Result<Self> {
        let parsed: Manifest = toml::from_str(contents).map_err(|e| ConfigError::Malformed {
            path: manifest.to_path_buf(),
            reason: e.message().to_string(),
        })?;
        let paths = parsed.paths;

        Ok(Self {
            manifest: manifest.to_path_buf(),
            support_path: paths.support_path,
            app_packages_path: paths.app_packages_path,
            app_path: paths.app_path,
            icon: paths.icon.map(TargetSpec::into_targets).unwrap_or_default(),
            splash: paths.splash.map(TargetSpec::into_targets).unwrap_or_default(),
            document_type_icon: paths
                .document_type_icon
                .into_iter()
                .map(|(ext, spec)| (ext, spec.into_targets()))
                .collect(),
        })
    }

    fn required<'a>(&self, value: &'a Option<String>, key: &str) -> Result<&'a str> {
        value.as_deref().ok_or_else(|| {
            ConfigError::MissingKey {
                path: self.manifest.clone(),
                key: format!("paths.{}", key),
            }
            .into()
        })
    }

    /// Relative directory receiving the support package
    pub fn support_path(&self) -> Result<&str> {
        self.required(&self.support_path, "support_path")
    }

    /// Relative directory receiving third-party packages
    pub fn app_packages_path(&self) -> Result<&str> {
        self.required(&self.app_packages_path, "app_packages_path")
    }

    /// Relative directory receiving app code
    pub fn app_path(&self) -> Result<&str> {
        self.required(&self.app_path, "app_path")
    }
}

impl Bundler {
    /// Layout of the expanded bundle for `app`.
    ///
    /// The manifest is read on first use and cached for the session.
    pub fn path_index(&self, app: &AppDescriptor) -> Result<Arc<PathIndex>> {
        if let Some(index) = lock(&self.path_indexes).get(&app.name) {
            return Ok(index.clone());
        }

        let index = Arc::new(PathIndex::load(&self.bundle_path(app))?);
        log::debug!("Loaded path index for {}", app.name);
        lock(&self.path_indexes).insert(app.name.clone(), index.clone());
        Ok(index)
    }

    /// Absolute support package directory for `app`
    pub fn support_path(&self, app: &AppDescriptor) -> Result<PathBuf> {
        Ok(self.bundle_path(app).join(self.path_index(app)?.support_path()?))
    }

    /// Absolute third-party package directory for `app`
    pub fn app_packages_path(&self, app: &AppDescriptor) -> Result<PathBuf> {
        Ok(self
            .bundle_path(app)
            .join(self.path_index(app)?.app_packages_path()?))
    }

    /// Absolute app code directory for `app`
    pub fn app_path(&self, app: &AppDescriptor) -> Result<PathBuf> {
        Ok(self.bundle_path(app).join(self.path_index(app)?.app_path()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BriefcaseError;

    fn parse(text: &str) -> PathIndex {
        PathIndex::parse(text, Path::new("briefcase.toml")).expect("valid manifest")
    }

    #[test]
    fn test_single_string_is_unsized_target() {
        let index = parse(
            r#"
[paths]
app_path = "app"
icon = "icon.icns"
splash = "splash.png"

[paths.document_type_icon]
dmo = "dmo.icns"
"#,
        );
        assert_eq!(index.icon, BTreeMap::from([(None, "icon.icns".to_string())]));
        assert_eq!(index.splash, BTreeMap::from([(None, "splash.png".to_string())]));
        assert_eq!(
            index.document_type_icon["dmo"],
            BTreeMap::from([(None, "dmo.icns".to_string())])
        );
    }

    #[test]
    fn test_sized_tables_are_kept() {
        let index = parse(
            r#"
[paths]
app_path = "app"

[paths.icon]
16 = "icon-16.png"
"512" = "icon-512.png"

[paths.document_type_icon.dmo]
32 = "dmo-32.png"
"#,
        );
        assert_eq!(
            index.icon,
            BTreeMap::from([
                (Some("16".to_string()), "icon-16.png".to_string()),
                (Some("512".to_string()), "icon-512.png".to_string()),
            ])
        );
        assert_eq!(
            index.document_type_icon["dmo"],
            BTreeMap::from([(Some("32".to_string()), "dmo-32.png".to_string())])
        );
    }

    #[test]
    fn test_absent_image_roles_are_empty() {
        let index = parse("[paths]\napp_path = \"app\"\n");
        assert!(index.icon.is_empty());
        assert!(index.splash.is_empty());
        assert!(index.document_type_icon.is_empty());
        assert_eq!(index.app_path().expect("app_path"), "app");
    }

    #[test]
    fn test_missing_directory_role_is_reported_on_request() {
        let index = parse("[paths]\napp_path = \"app\"\n");
        let err = index.support_path().expect_err("missing");
        assert!(matches!(
            err,
            BriefcaseError::Config(ConfigError::MissingKey { ref key, .. }) if key == "paths.support_path"
        ));
    }

    #[test]
    fn test_missing_paths_table_is_malformed() {
        let err = PathIndex::parse("[other]\nx = 1\n", Path::new("briefcase.toml"))
            .expect_err("malformed");
        assert!(matches!(err, BriefcaseError::Config(ConfigError::Malformed { .. })));
    }

    #[test]
    fn test_load_missing_manifest() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let err = PathIndex::load(tmp.path()).expect_err("missing");
        assert!(matches!(err, BriefcaseError::Config(ConfigError::MissingFile { .. })));
    }

    #[test]
    fn test_unreadable_manifest_is_an_io_error() {
        let tmp = tempfile::tempdir().expect("tempdir");
        std::fs::create_dir(tmp.path().join(PATH_INDEX_FILE)).expect("mkdir");
        let err = PathIndex::load(tmp.path()).expect_err("unreadable");
        assert!(matches!(err, BriefcaseError::Io(_)));
    }
}
