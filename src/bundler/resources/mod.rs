//! Brand image installation.
//!
//! The path index says which images a template wants (application icon,
//! splash image, document type icons), at which sizes, and where. The app
//! names a base path for each role, e.g. `resources/demo`; the source for a
//! 512px `.png` target is then `resources/demo-512.png`, and for an unsized
//! `.icns` target `resources/demo.icns`. Anything missing keeps the
//! template's default image.

use crate::bundler::{Bundler, Context};
use crate::bundler::utils::fs;
use crate::config::AppDescriptor;
use crate::error::Result;
use std::path::Path;

/// Source file name for `base` at `size`, with the target's extension.
pub fn source_filename(base: &str, size: Option<&str>, target: &Path) -> String {
    let ext = target
        .extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default();
    match size {
        Some(size) => format!("{}-{}{}", base, size, ext),
        None => format!("{}{}", base, ext),
    }
}

/// Role description used in progress messages.
pub fn full_role(role: &str, size: Option<&str>) -> String {
    match size {
        Some(size) => format!("{}px {}", size, role),
        None => role.to_string(),
    }
}

impl Bundler {
    /// Copy the image for `role` at `size` from `source` to `target`.
    ///
    /// Returns whether an image was installed. A missing base name or source
    /// file leaves the target alone.
    pub async fn install_image(
        &self,
        role: &str,
        size: Option<&str>,
        source: Option<&str>,
        target: &Path,
    ) -> Result<bool> {
        let Some(base) = source else {
            return Ok(false);
        };

        let filename = source_filename(base, size, target);
        let role = full_role(role, size);
        let full_source = self.settings.base_path.join(&filename);

        if !full_source.is_file() {
            self.runtime.println(&format!(
                "Unable to find {} for {}; using default",
                filename, role
            ));
            return Ok(false);
        }

        self.runtime
            .println(&format!("Installing {} as {}...", filename, role));
        fs::copy_file(&full_source, target)
            .await
            .with_context(|| format!("failed to install {} as {}", filename, role))?;
        Ok(true)
    }

    /// Install every icon, splash image and document type icon the template asks for.
    pub async fn install_app_resources(&self, app: &AppDescriptor) -> Result<()> {
        let index = self.path_index(app)?;
        let bundle_path = self.bundle_path(app);

        for (size, target) in &index.icon {
            self.install_image(
                "application icon",
                size.as_deref(),
                app.icon.as_deref(),
                &bundle_path.join(target),
            )
            .await?;
        }

        for (size, target) in &index.splash {
            self.install_image(
                "splash image",
                size.as_deref(),
                app.splash.as_deref(),
                &bundle_path.join(target),
            )
            .await?;
        }

        for (extension, targets) in &index.document_type_icon {
            let role = format!("icon for .{} documents", extension);
            for (size, target) in targets {
                self.install_image(
                    &role,
                    size.as_deref(),
                    app.document_type_icon(extension),
                    &bundle_path.join(target),
                )
                .await?;
            }
        }

        Ok(())
    }
}
