//! Create command implementation.

use crate::bundler::{BundleState, Bundler, Collaborators};
use crate::cli::{Args, Command, RuntimeConfig};
use crate::config::{ProjectConfig, Settings};
use crate::error::Result;
use path_absolutize::Absolutize;

/// Execute create command
pub(super) async fn execute_create(args: &Args, config: &RuntimeConfig) -> Result<i32> {
    let Command::Create {
        app,
        platform,
        format,
        python_version,
        no_input,
    } = &args.command
    else {
        unreachable!("execute_create called with non-Create command");
    };

    let base_path = args.project.absolutize()?.into_owned();
    let settings = Settings::detect(
        base_path,
        platform.clone(),
        format.clone(),
        python_version.clone(),
    )
    .await?;
    config.verbose_println(&format!(
        "Creating {} {} bundles for Python {} in {}",
        settings.platform,
        settings.output_format,
        settings.python_version_tag,
        settings.base_path.display()
    ));

    let project = ProjectConfig::load_for(
        &settings.base_path,
        Some(&settings.platform),
        Some(&settings.output_format),
    )?;

    let collaborators = Collaborators::standard(&settings, *no_input);
    let bundler = Bundler::new(settings, collaborators, config.clone());
    let states = bundler.run(&project.apps, app.as_deref()).await?;

    let aborted: Vec<&str> = states
        .iter()
        .filter(|(_, state)| **state == BundleState::Aborted)
        .map(|(name, _)| name.as_str())
        .collect();
    if !aborted.is_empty() {
        config.verbose_println(&format!("Left untouched: {}", aborted.join(", ")));
    }

    Ok(0)
}
