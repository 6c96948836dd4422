//! App source installation and installed-package metadata.

use crate::bundler::utils::fs;
use crate::bundler::{Bundler, Context, ErrorExt};
use crate::config::AppDescriptor;
use crate::error::{BriefcaseError, Result};
use std::path::{Path, PathBuf};

/// Contents of the `INSTALLER` record.
pub const INSTALLER_RECORD: &str = "briefcase\n";

/// Name of the dist-info directory for `app`.
pub fn dist_info_name(app: &AppDescriptor) -> String {
    format!("{}-{}.dist-info", app.module_name(), app.version)
}

/// Render the `METADATA` record for `app`.
pub fn metadata_record(app: &AppDescriptor) -> String {
    let mut record = format!(
        "Metadata-Version: 2.1\nName: {}\nFormal-Name: {}\nBundle: {}\nVersion: {}\n",
        app.name, app.formal_name, app.bundle, app.version
    );
    let optional = [
        ("Home-page", &app.url),
        ("Author", &app.author),
        ("Author-email", &app.author_email),
    ];
    for (field, value) in optional {
        if let Some(value) = value.as_deref().filter(|s| !s.is_empty()) {
            record.push_str(&format!("{}: {}\n", field, value));
        }
    }
    record.push_str(&format!(
        "Summary: {}\n",
        app.description.as_deref().unwrap_or_default()
    ));
    record
}

/// Write `INSTALLER` and `METADATA` into `dist_info_path`, replacing any
/// previous contents of those files.
pub async fn write_dist_info(app: &AppDescriptor, dist_info_path: &Path) -> crate::bundler::Result<()> {
    fs::create_dir_all(dist_info_path, false).await?;

    let installer = dist_info_path.join("INSTALLER");
    tokio::fs::write(&installer, INSTALLER_RECORD)
        .await
        .fs_context("writing installer record", &installer)?;

    let metadata = dist_info_path.join("METADATA");
    tokio::fs::write(&metadata, metadata_record(app))
        .await
        .fs_context("writing metadata record", &metadata)?;
    Ok(())
}

impl Bundler {
    /// Copy one declared source into `app_path`, replacing any earlier copy.
    async fn install_source(&self, src: &str, app_path: &Path) -> Result<()> {
        let original = self.settings.base_path.join(src);
        let name = original
            .file_name()
            .map(PathBuf::from)
            .ok_or_else(|| BriefcaseError::MissingAppSources { src: src.to_string() })?;
        let target = app_path.join(name);

        fs::remove_path(&target).await?;

        if !original.exists() {
            return Err(BriefcaseError::MissingAppSources { src: src.to_string() });
        }
        if original.is_dir() {
            fs::copy_dir(&original, &target)
                .await
                .with_context(|| format!("failed to copy {} into the bundle", src))?;
        } else {
            fs::copy_file(&original, &target)
                .await
                .with_context(|| format!("failed to copy {} into the bundle", src))?;
        }
        Ok(())
    }

    /// Copy the app's sources into the bundle and write its dist-info record.
    pub async fn install_app_code(&self, app: &AppDescriptor) -> Result<()> {
        let app_path = self.app_path(app)?;

        if app.sources.is_empty() {
            self.runtime
                .println(&format!("No sources defined for {}.", app.name));
        }
        for src in &app.sources {
            self.runtime.println(&format!("Installing {}...", src));
            self.install_source(src, &app_path).await?;
        }

        write_dist_info(app, &app_path.join(dist_info_name(app))).await?;
        Ok(())
    }
}
