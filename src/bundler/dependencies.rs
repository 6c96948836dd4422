//! Third-party dependency installation.

use crate::bundler::Bundler;
use crate::config::AppDescriptor;
use crate::error::{BriefcaseError, Result};
use crate::installer::InstallTarget;

impl Bundler {
    async fn run_installer(&self, app: &AppDescriptor, target: InstallTarget<'_>) -> Result<()> {
        let status = self
            .collaborators
            .installer
            .install(&app.requires, target, true)
            .await?;
        if !status.success() {
            log::debug!("Package installer exited with {:?}", status.code);
            return Err(BriefcaseError::DependencyInstallError);
        }
        Ok(())
    }

    /// Install the app's dependencies into the bundle's app-packages path.
    pub async fn install_app_dependencies(&self, app: &AppDescriptor) -> Result<()> {
        if app.requires.is_empty() {
            self.runtime.println("No application dependencies.");
            return Ok(());
        }
        let app_packages_path = self.app_packages_path(app)?;
        self.run_installer(app, InstallTarget::Directory(&app_packages_path))
            .await
    }

    /// Install the app's dependencies into the interpreter's own environment.
    pub async fn install_ambient_dependencies(&self, app: &AppDescriptor) -> Result<()> {
        if app.requires.is_empty() {
            self.runtime.println("No application dependencies.");
            return Ok(());
        }
        self.run_installer(app, InstallTarget::Ambient).await
    }
}
