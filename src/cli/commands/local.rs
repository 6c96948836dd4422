//! Local command implementation.

use crate::bundler::{Bundler, Collaborators, select_local_app};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::config::{ProjectConfig, Settings, host_platform};
use crate::error::Result;
use path_absolutize::Absolutize;

/// Execute local command
pub(super) async fn execute_local(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Local {
        app,
        update_dependencies,
    } = &args.command
    else {
        unreachable!("execute_local called with non-Local command");
    };

    let base_path = args.project.absolutize()?.into_owned();
    let settings = Settings::detect(base_path, Some(host_platform().to_string()), None, None).await?;
    let project = ProjectConfig::load_for(&settings.base_path, Some(&settings.platform), None)?;
    let selected = select_local_app(&project.apps, app.as_deref())?;

    let collaborators = Collaborators::standard(&settings, true);
    let bundler = Bundler::new(settings, collaborators, config.clone());
    let prepared = bundler.prepare_local(selected, *update_dependencies).await?;

    if !prepared.dependencies_installed {
        config.verbose_println(&format!(
            "Dependencies already installed ({} exists)",
            prepared.dist_info_path.display()
        ));
    }
    config.success_println(&format!("[{}] Ready to run in place.", selected.name));
    config.indent(&format!(
        "PYTHONPATH={}",
        prepared.python_path.to_string_lossy()
    ));
    config.indent(&format!(
        "{} -m {}",
        bundler.settings().python.display(),
        selected.module_name()
    ));

    Ok(0)
}
