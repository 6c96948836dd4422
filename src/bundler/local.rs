//! Preparing an app to run in place, from its source tree.

use crate::bundler::Bundler;
use crate::bundler::app_code::write_dist_info;
use crate::config::AppDescriptor;
use crate::error::{BriefcaseError, CliError, ConfigError, Result};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::PathBuf;

/// Outcome of preparing an app for an in-place run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPreparation {
    /// Dist-info directory next to the app module
    pub dist_info_path: PathBuf,
    /// Whether dependencies were (re)installed on this run
    pub dependencies_installed: bool,
    /// `PYTHONPATH` value that exposes every source directory
    pub python_path: OsString,
}

/// Pick the app to run: the only one, or the one named by `selected`.
pub fn select_local_app<'a>(
    apps: &'a BTreeMap<String, AppDescriptor>,
    selected: Option<&str>,
) -> Result<&'a AppDescriptor> {
    if apps.len() == 1
        && let Some(app) = apps.values().next()
    {
        return Ok(app);
    }
    match selected {
        Some(name) => apps.get(name).ok_or_else(|| {
            CliError::InvalidArguments {
                reason: format!("Project doesn't define an application named '{}'", name),
            }
            .into()
        }),
        None => Err(CliError::InvalidArguments {
            reason: "Project specifies more than one application; \
                     use --app to specify which one to start."
                .to_string(),
        }
        .into()),
    }
}

impl Bundler {
    /// Directory of the app's module inside its source tree: the source
    /// named after the module, else the first source.
    pub fn app_module_path(&self, app: &AppDescriptor) -> Result<PathBuf> {
        let module_name = app.module_name();
        let source = app
            .sources
            .iter()
            .find(|src| {
                PathBuf::from(src)
                    .file_name()
                    .is_some_and(|name| name.to_string_lossy() == module_name)
            })
            .or_else(|| app.sources.first())
            .ok_or_else(|| {
                BriefcaseError::from(ConfigError::MissingKey {
                    path: self.settings.base_path.join(crate::config::PROJECT_FILE),
                    key: format!("tool.briefcase.app.{}.sources", app.name),
                })
            })?;
        Ok(self.settings.base_path.join(source))
    }

    /// `PYTHONPATH` covering the parent directory of every source.
    pub fn local_python_path(&self, app: &AppDescriptor) -> Result<OsString> {
        let dirs: Vec<PathBuf> = app
            .sources
            .iter()
            .map(|src| {
                self.settings
                    .base_path
                    .join(src)
                    .parent()
                    .map(PathBuf::from)
                    .unwrap_or_else(|| self.settings.base_path.clone())
            })
            .collect();
        std::env::join_paths(dirs).map_err(|e| {
            ConfigError::InvalidValue {
                path: self.settings.base_path.join(crate::config::PROJECT_FILE),
                key: format!("tool.briefcase.app.{}.sources", app.name),
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Install dependencies into the ambient environment and write the
    /// dist-info record next to the app module, unless that record already
    /// exists and no update was requested.
    pub async fn prepare_local(&self, app: &AppDescriptor, update_dependencies: bool) -> Result<LocalPreparation> {
        let module_path = self.app_module_path(app)?;
        let parent = module_path
            .parent()
            .map(PathBuf::from)
            .unwrap_or_else(|| self.settings.base_path.clone());
        let dist_info_path = parent.join(format!("{}.dist-info", app.module_name()));

        let dependencies_installed = update_dependencies || !dist_info_path.exists();
        if dependencies_installed {
            self.runtime
                .section(&format!("[{}] Installing dependencies...", app.name));
            self.install_ambient_dependencies(app).await?;
            write_dist_info(app, &dist_info_path).await?;
        } else {
            log::debug!("{} exists; skipping dependency install", dist_info_path.display());
        }

        Ok(LocalPreparation {
            dist_info_path,
            dependencies_installed,
            python_path: self.local_python_path(app)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn apps(names: &[&str]) -> BTreeMap<String, AppDescriptor> {
        names
            .iter()
            .map(|name| {
                (
                    name.to_string(),
                    AppDescriptor::new(*name, name.to_uppercase(), "com.example", "1.0"),
                )
            })
            .collect()
    }

    #[test]
    fn test_single_app_is_selected_by_default() {
        let apps = apps(&["demo"]);
        assert_eq!(select_local_app(&apps, None).expect("app").name, "demo");
        assert_eq!(select_local_app(&apps, Some("other")).expect("app").name, "demo");
    }

    #[test]
    fn test_multiple_apps_need_a_name() {
        let apps = apps(&["alpha", "beta"]);
        assert_eq!(select_local_app(&apps, Some("beta")).expect("app").name, "beta");
        assert!(matches!(
            select_local_app(&apps, None),
            Err(BriefcaseError::Cli(CliError::InvalidArguments { .. }))
        ));
        assert!(matches!(
            select_local_app(&apps, Some("gamma")),
            Err(BriefcaseError::Cli(CliError::InvalidArguments { .. }))
        ));
    }
}
