//! Bundle orchestration.
//!
//! [`Bundler`] is the per-invocation session. It owns the runtime settings,
//! the collaborators every stage talks to, and the memo caches (path index
//! per app, support package URL per platform and version). Each stage lives
//! in its own module as an `impl Bundler` block; this module sequences them.
//!
//! ```text
//! NotStarted -> TemplateExpanded -> SupportInstalled -> DependenciesInstalled
//!            -> CodeInstalled -> ResourcesInstalled
//!      \-> Aborted (existing bundle, overwrite declined)
//! ```

use crate::bundler::path_index::PathIndex;
use crate::bundler::utils::archive::{ArchiveExtractor, StandardExtractor};
use crate::bundler::utils::http::{Downloader, HttpDownloader};
use crate::cli::{FixedAnswer, Prompt, RuntimeConfig, StdinPrompt, is_affirmative};
use crate::config::{AppDescriptor, Settings};
use crate::error::{BriefcaseError, CliError, Result};
use crate::git::{GitCli, VersionControl};
use crate::installer::{PackageInstaller, PipInstaller};
use crate::storage::{ObjectLister, S3Lister};
use crate::template::{CookiecutterExpander, TemplateExpander};
use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

/// How far bundle creation got for one app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum BundleState {
    /// Nothing done yet
    NotStarted,
    /// Template expanded into the bundle directory
    TemplateExpanded,
    /// Support package unpacked
    SupportInstalled,
    /// Third-party packages installed
    DependenciesInstalled,
    /// App sources and dist-info installed
    CodeInstalled,
    /// Icons and splash images installed; the bundle is complete
    ResourcesInstalled,
    /// The bundle already existed and the user declined to overwrite it
    Aborted,
}

/// External services the pipeline depends on.
#[derive(Clone)]
pub struct Collaborators {
    /// Version control for the template cache
    pub vcs: Arc<dyn VersionControl>,
    /// Template expansion engine
    pub expander: Arc<dyn TemplateExpander>,
    /// Support package catalog listing
    pub lister: Arc<dyn ObjectLister>,
    /// Support package downloads
    pub downloader: Arc<dyn Downloader>,
    /// Support package extraction
    pub extractor: Arc<dyn ArchiveExtractor>,
    /// Third-party package installation
    pub installer: Arc<dyn PackageInstaller>,
    /// Overwrite confirmation
    pub prompt: Arc<dyn Prompt>,
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}

impl Collaborators {
    /// The concrete implementations shipped with the binary.
    ///
    /// With `no_input`, every confirmation is declined.
    pub fn standard(settings: &Settings, no_input: bool) -> Self {
        let vcs: Arc<dyn VersionControl> = Arc::new(GitCli::new());
        let prompt: Arc<dyn Prompt> = if no_input {
            Arc::new(FixedAnswer::decline())
        } else {
            Arc::new(StdinPrompt)
        };
        Self {
            expander: Arc::new(CookiecutterExpander::new(
                vcs.clone(),
                settings.template_cache.clone(),
            )),
            vcs,
            lister: Arc::new(S3Lister::new()),
            downloader: Arc::new(HttpDownloader::new()),
            extractor: Arc::new(StandardExtractor),
            installer: Arc::new(PipInstaller::new(settings.python.clone())),
            prompt,
        }
    }
}

/// Per-invocation bundle creation session.
#[derive(Debug)]
pub struct Bundler {
    pub(crate) settings: Settings,
    pub(crate) collaborators: Collaborators,
    pub(crate) runtime: RuntimeConfig,
    pub(crate) path_indexes: Mutex<HashMap<String, Arc<PathIndex>>>,
    pub(crate) support_urls: Mutex<HashMap<(String, String), String>>,
}

/// Lock a cache, recovering the data if a previous holder panicked.
pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Bundler {
    /// Create a session with empty caches.
    pub fn new(settings: Settings, collaborators: Collaborators, runtime: RuntimeConfig) -> Self {
        Self {
            settings,
            collaborators,
            runtime,
            path_indexes: Mutex::new(HashMap::new()),
            support_urls: Mutex::new(HashMap::new()),
        }
    }

    /// Runtime settings for this session
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// User-facing output
    pub fn runtime(&self) -> &RuntimeConfig {
        &self.runtime
    }

    /// `<base>/<platform>/<formal name>`, the root of everything owned by `app`.
    pub fn bundle_path(&self, app: &AppDescriptor) -> PathBuf {
        self.settings.platform_path().join(&app.formal_name)
    }

    /// Create the bundle for one app, asking before replacing an existing one.
    pub async fn create_app(&self, app: &AppDescriptor) -> Result<BundleState> {
        let bundle_path = self.bundle_path(app);
        if bundle_path.exists() {
            self.runtime.println("");
            let question = format!("Application {} already exists; overwrite (y/N)? ", app.name);
            let answer = self.collaborators.prompt.confirm(&question)?;
            if !is_affirmative(&answer) {
                self.runtime
                    .println(&format!("Aborting creation of app {}", app.name));
                return Ok(BundleState::Aborted);
            }
            self.runtime
                .section(&format!("[{}] Removing old application bundle...", app.name));
            crate::bundler::utils::fs::remove_dir_all(&bundle_path).await?;
        }

        let mut state = BundleState::NotStarted;
        log::debug!("{}: {:?}", app.name, state);

        self.runtime
            .section(&format!("[{}] Generating application template...", app.name));
        self.generate_app_template(app).await?;
        state = BundleState::TemplateExpanded;
        log::debug!("{}: {:?}", app.name, state);

        self.runtime
            .section(&format!("[{}] Installing support package...", app.name));
        self.install_app_support_package(app).await?;
        state = BundleState::SupportInstalled;
        log::debug!("{}: {:?}", app.name, state);

        self.runtime
            .section(&format!("[{}] Installing dependencies...", app.name));
        self.install_app_dependencies(app).await?;
        state = BundleState::DependenciesInstalled;
        log::debug!("{}: {:?}", app.name, state);

        self.runtime
            .section(&format!("[{}] Installing application code...", app.name));
        self.install_app_code(app).await?;
        state = BundleState::CodeInstalled;
        log::debug!("{}: {:?}", app.name, state);

        self.runtime
            .section(&format!("[{}] Installing application resources...", app.name));
        self.install_app_resources(app).await?;
        state = BundleState::ResourcesInstalled;
        log::debug!("{}: {:?}", app.name, state);

        self.runtime
            .success_println(&format!("[{}] Application created.", app.name));
        Ok(state)
    }

    /// Create bundles for `apps` in ascending name order.
    ///
    /// The first failure stops the run; apps after it are not attempted.
    pub async fn create_all(
        &self,
        apps: &BTreeMap<String, AppDescriptor>,
    ) -> Result<BTreeMap<String, BundleState>> {
        let mut states = BTreeMap::new();
        for (name, app) in apps {
            let state = self.create_app(app).await?;
            states.insert(name.clone(), state);
        }
        Ok(states)
    }

    /// Create the named app, or every app when `selected` is `None`.
    pub async fn run(
        &self,
        apps: &BTreeMap<String, AppDescriptor>,
        selected: Option<&str>,
    ) -> Result<BTreeMap<String, BundleState>> {
        match selected {
            Some(name) => {
                let app = apps.get(name).ok_or_else(|| {
                    BriefcaseError::from(CliError::InvalidArguments {
                        reason: format!("Unknown application '{}'", name),
                    })
                })?;
                let state = self.create_app(app).await?;
                Ok(BTreeMap::from([(name.to_string(), state)]))
            }
            None => self.create_all(apps).await,
        }
    }
}
