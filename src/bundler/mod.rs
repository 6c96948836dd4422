//! Application bundle assembly.
//!
//! Turns an [`AppDescriptor`](crate::config::AppDescriptor) into an on-disk
//! bundle for one platform and output format:
//!
//! 1. expand the platform template into `<base>/<platform>/<formal name>`
//! 2. unpack the runtime support package
//! 3. install third-party dependencies
//! 4. copy the app's sources and write its dist-info record
//! 5. install icons and splash images
//!
//! Where things go inside the bundle is decided by the template itself,
//! through the `briefcase.toml` [`PathIndex`].
//!
//! # Example
//!
//! ```no_run
//! use briefcase_bundler::bundler::{Bundler, Collaborators};
//! use briefcase_bundler::cli::RuntimeConfig;
//! use briefcase_bundler::config::{ProjectConfig, Settings};
//!
//! # async fn example() -> briefcase_bundler::Result<()> {
//! let settings = Settings::detect(".", None, None, None).await?;
//! let project = ProjectConfig::load_for(
//!     &settings.base_path,
//!     Some(&settings.platform),
//!     Some(&settings.output_format),
//! )?;
//! let collaborators = Collaborators::standard(&settings, false);
//! let bundler = Bundler::new(settings, collaborators, RuntimeConfig::new());
//! bundler.run(&project.apps, None).await?;
//! # Ok(())
//! # }
//! ```

mod app_code;
mod builder;
mod dependencies;
pub mod error;
mod generate;
mod local;
mod path_index;
mod resources;
mod support;
pub mod utils;

pub use app_code::{INSTALLER_RECORD, dist_info_name, metadata_record, write_dist_info};
pub use builder::{BundleState, Bundler, Collaborators};
pub use error::{Context, Error, ErrorExt, Result};
pub use generate::{TEMPLATE_REMOTE, TemplateStrategy};
pub use local::{LocalPreparation, select_local_app};
pub use path_index::{PATH_INDEX_FILE, PathIndex, TargetSpec, Targets};
pub use resources::{full_role, source_filename};
pub use support::{SUPPORT_BUCKET, SUPPORT_REGION, build_number, select_latest};
