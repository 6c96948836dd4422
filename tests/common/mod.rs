//! Shared fixtures and fake collaborators for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use briefcase_bundler::bundler::utils::archive::StandardExtractor;
use briefcase_bundler::bundler::utils::http::Downloader;
use briefcase_bundler::bundler::{Bundler, Collaborators};
use briefcase_bundler::cli::{FixedAnswer, OutputCapture, OutputManager, Prompt, RuntimeConfig};
use briefcase_bundler::config::{AppDescriptor, Settings};
use briefcase_bundler::git::{CloneError, CommitInfo, OpenOutcome, TemplateRepository, VersionControl};
use briefcase_bundler::installer::{InstallStatus, InstallTarget, PackageInstaller};
use briefcase_bundler::storage::{ObjectLister, ObjectSummary};
use briefcase_bundler::template::{
    CookiecutterExpander, ExpandError, ExpandRequest, TemplateExpander,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Nothing listens on the discard port, so connections are refused.
pub const REFUSED_URL: &str = "http://127.0.0.1:9/";

pub const BRIEFCASE_TOML: &str = r#"[paths]
support_path = "support"
app_packages_path = "app_packages"
app_path = "app"
icon = "res/icon.png"

[paths.splash]
640 = "res/splash-640.png"

[paths.document_type_icon]
dmo = "res/dmo.icns"
"#;

/// Write a minimal local template into `root`.
pub fn write_template(root: &Path) {
    let project = root.join("{{ cookiecutter.formal_name }}");
    std::fs::create_dir_all(&project).expect("mkdir template");
    std::fs::write(
        root.join("cookiecutter.json"),
        r#"{"formal_name": "App", "app_name": "app", "module_name": "app"}"#,
    )
    .expect("write cookiecutter.json");
    std::fs::write(project.join("briefcase.toml"), BRIEFCASE_TOML).expect("write briefcase.toml");
    std::fs::write(
        project.join("README.txt"),
        "{{ cookiecutter.formal_name }} ({{ cookiecutter.module_name }}) {{ cookiecutter.year }}",
    )
    .expect("write README");
}

/// Write a gzipped tarball containing `files` (relative path, contents).
pub fn write_tar_gz(path: &Path, files: &[(&str, &str)]) {
    let file = std::fs::File::create(path).expect("create archive");
    let encoder = flate2::write::GzEncoder::new(file, flate2::Compression::default());
    let mut builder = tar::Builder::new(encoder);
    for (name, contents) in files {
        let mut header = tar::Header::new_gnu();
        header.set_size(contents.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, contents.as_bytes())
            .expect("append");
    }
    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish gzip");
}

/// Records installer calls; "installs" each requirement as a package directory.
#[derive(Debug, Default)]
pub struct FakeInstaller {
    pub exit_code: i32,
    pub calls: Mutex<Vec<(Vec<String>, Option<PathBuf>, bool)>>,
}

impl FakeInstaller {
    pub fn failing() -> Self {
        Self {
            exit_code: 1,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<(Vec<String>, Option<PathBuf>, bool)> {
        self.calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl PackageInstaller for FakeInstaller {
    async fn install(
        &self,
        requirements: &[String],
        target: InstallTarget<'_>,
        upgrade: bool,
    ) -> briefcase_bundler::bundler::Result<InstallStatus> {
        let dir = match target {
            InstallTarget::Directory(dir) => Some(dir.to_path_buf()),
            InstallTarget::Ambient => None,
        };
        if let Some(dir) = &dir
            && self.exit_code == 0
        {
            for req in requirements {
                let package = dir.join(req);
                std::fs::create_dir_all(&package)?;
                std::fs::write(package.join("__init__.py"), "")?;
            }
        }
        self.calls
            .lock()
            .expect("lock")
            .push((requirements.to_vec(), dir, upgrade));
        Ok(InstallStatus {
            code: Some(self.exit_code),
        })
    }
}

/// Serves a fixed listing, possibly split over several pages.
#[derive(Debug, Default)]
pub struct FakeLister {
    pub pages: Vec<Vec<String>>,
    pub calls: AtomicUsize,
    pub unreachable: bool,
}

impl FakeLister {
    pub fn with_pages(pages: Vec<Vec<&str>>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|page| page.into_iter().map(str::to_string).collect())
                .collect(),
            calls: AtomicUsize::new(0),
            unreachable: false,
        }
    }

    /// A catalog whose endpoint refuses connections.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ObjectLister for FakeLister {
    async fn list(
        &self,
        _bucket: &str,
        _region: &str,
        prefix: &str,
    ) -> briefcase_bundler::bundler::Result<Vec<ObjectSummary>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable {
            let response = reqwest::get(REFUSED_URL).await?;
            return Err(briefcase_bundler::bundler::Error::GenericError(format!(
                "unexpected response {}",
                response.status()
            )));
        }
        Ok(self
            .pages
            .iter()
            .flatten()
            .map(|key| ObjectSummary {
                key: format!("{}{}", prefix, key),
                size: None,
                last_modified: None,
            })
            .collect())
    }
}

/// "Downloads" by copying a local archive into the cache directory.
#[derive(Debug)]
pub struct FakeDownloader {
    pub archive: PathBuf,
    pub urls: Mutex<Vec<String>>,
}

impl FakeDownloader {
    pub fn serving(archive: &Path) -> Self {
        Self {
            archive: archive.to_path_buf(),
            urls: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Downloader for FakeDownloader {
    async fn download(&self, url: &str, cache_dir: &Path) -> briefcase_bundler::bundler::Result<PathBuf> {
        self.urls.lock().expect("lock").push(url.to_string());
        let name = url.rsplit('/').next().unwrap_or("download");
        std::fs::create_dir_all(cache_dir)?;
        let dest = cache_dir.join(name);
        std::fs::copy(&self.archive, &dest)?;
        Ok(dest)
    }
}

/// A template cache checkout with scripted behavior.
#[derive(Debug, Clone, Default)]
pub struct FakeRepoScript {
    pub fetch_fails: bool,
    pub refs: HashMap<String, CommitInfo>,
    pub checkouts: Arc<Mutex<Vec<String>>>,
    pub fetches: Arc<AtomicUsize>,
}

struct FakeRepo {
    path: PathBuf,
    script: FakeRepoScript,
}

#[async_trait]
impl TemplateRepository for FakeRepo {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn fetch(&self, remote: &str) -> briefcase_bundler::Result<()> {
        self.script.fetches.fetch_add(1, Ordering::SeqCst);
        if self.script.fetch_fails {
            return Err(briefcase_bundler::error::GitError::RemoteOperationFailed {
                operation: format!("fetch {}", remote),
                reason: "Could not resolve host: github.com".to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn resolve_ref(&self, _remote: &str, name: &str) -> briefcase_bundler::Result<Option<CommitInfo>> {
        Ok(self.script.refs.get(name).cloned())
    }

    async fn checkout(&self, commit: &CommitInfo) -> briefcase_bundler::Result<()> {
        self.script
            .checkouts
            .lock()
            .expect("lock")
            .push(commit.hash.clone());
        Ok(())
    }
}

/// What [`FakeVcs::open`] reports.
#[derive(Debug, Clone)]
pub enum FakeCache {
    Missing,
    NotARepository,
    Checkout(FakeRepoScript),
}

#[derive(Debug)]
pub struct FakeVcs {
    pub cache: FakeCache,
}

#[async_trait]
impl VersionControl for FakeVcs {
    async fn open(&self, path: &Path) -> OpenOutcome {
        match &self.cache {
            FakeCache::Missing => OpenOutcome::NotFound,
            FakeCache::NotARepository => OpenOutcome::NotARepository,
            FakeCache::Checkout(script) => OpenOutcome::Repository(Box::new(FakeRepo {
                path: path.to_path_buf(),
                script: script.clone(),
            })),
        }
    }

    async fn clone_repo(&self, url: &str, _dest: &Path, _branch: Option<&str>) -> Result<(), CloneError> {
        Err(CloneError::Transport(format!("offline: {}", url)))
    }
}

/// Records expansion requests and fails with a scripted error.
#[derive(Debug)]
pub struct FailingExpander {
    pub error: fn() -> ExpandError,
    pub requests: Mutex<Vec<(String, Option<String>, bool)>>,
}

impl FailingExpander {
    pub fn new(error: fn() -> ExpandError) -> Self {
        Self {
            error,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl TemplateExpander for FailingExpander {
    async fn expand(&self, request: ExpandRequest<'_>) -> Result<PathBuf, ExpandError> {
        self.requests.lock().expect("lock").push((
            request.source.to_string(),
            request.checkout.map(str::to_string),
            request.no_input,
        ));
        Err((self.error)())
    }
}

pub fn commit(hash: &str) -> CommitInfo {
    CommitInfo {
        reference: "refs/remotes/origin/3.10".to_string(),
        hash: hash.to_string(),
        short_hash: hash.chars().take(7).collect(),
        timestamp: chrono::DateTime::from_timestamp(1_633_046_400, 0),
    }
}

/// A scratch project with a local template, app sources and a support archive.
pub struct Project {
    pub tmp: tempfile::TempDir,
    pub base: PathBuf,
    pub home: PathBuf,
    pub settings: Settings,
}

impl Project {
    pub fn new() -> Self {
        let tmp = tempfile::tempdir().expect("tempdir");
        let base = tmp.path().join("project");
        let home = tmp.path().join("home");
        std::fs::create_dir_all(&base).expect("mkdir project");
        std::fs::create_dir_all(&home).expect("mkdir home");

        write_template(&base.join("template"));

        let src = base.join("src").join("demo");
        std::fs::create_dir_all(&src).expect("mkdir src");
        std::fs::write(src.join("__init__.py"), "").expect("write");
        std::fs::write(src.join("__main__.py"), "print('hello')\n").expect("write");

        write_tar_gz(
            &base.join("support.tar.gz"),
            &[("python-stdlib/os.py", "# os\n"), ("VERSIONS", "3.10\n")],
        );

        let settings = Settings::new(&base, "macOS", "app", "3.10", "python3", &home);
        Self {
            tmp,
            base,
            home,
            settings,
        }
    }

    /// App `demo` 1.0 using the local template and support archive.
    pub fn demo_app(&self) -> AppDescriptor {
        let mut app = AppDescriptor::new("demo", "Demo", "com.example", "1.0");
        app.description = Some("A demo app".into());
        app.sources = vec!["src/demo".into()];
        app.requires = vec!["requests".into()];
        app.template = Some(self.base.join("template").to_string_lossy().to_string());
        app.support_package = Some("support.tar.gz".into());
        app
    }

    pub fn bundle_path(&self, app: &AppDescriptor) -> PathBuf {
        self.base.join("macOS").join(&app.formal_name)
    }
}

/// Collaborators wired for offline tests.
pub struct Fakes {
    pub vcs: Arc<FakeVcs>,
    pub expander: Arc<dyn TemplateExpander>,
    pub lister: Arc<FakeLister>,
    pub downloader: Arc<FakeDownloader>,
    pub live_downloader: Option<Arc<dyn Downloader>>,
    pub installer: Arc<FakeInstaller>,
    pub prompt: Arc<dyn Prompt>,
}

impl Fakes {
    pub fn new(project: &Project) -> Self {
        let vcs = Arc::new(FakeVcs {
            cache: FakeCache::Missing,
        });
        Self {
            expander: Arc::new(CookiecutterExpander::new(
                vcs.clone(),
                project.settings.template_cache.clone(),
            )),
            vcs,
            lister: Arc::new(FakeLister::default()),
            downloader: Arc::new(FakeDownloader::serving(&project.base.join("support.tar.gz"))),
            live_downloader: None,
            installer: Arc::new(FakeInstaller::default()),
            prompt: Arc::new(FixedAnswer::decline()),
        }
    }

    pub fn with_vcs(mut self, cache: FakeCache, settings: &Settings) -> Self {
        let vcs = Arc::new(FakeVcs { cache });
        self.expander = Arc::new(CookiecutterExpander::new(
            vcs.clone(),
            settings.template_cache.clone(),
        ));
        self.vcs = vcs;
        self
    }

    pub fn answering(mut self, answer: &str) -> Self {
        self.prompt = Arc::new(FixedAnswer(answer.to_string()));
        self
    }

    pub fn bundler(&self, settings: &Settings) -> (Bundler, OutputCapture) {
        let (output, capture) = OutputManager::captured();
        let collaborators = Collaborators {
            vcs: self.vcs.clone(),
            expander: self.expander.clone(),
            lister: self.lister.clone(),
            downloader: match &self.live_downloader {
                Some(downloader) => downloader.clone(),
                None => self.downloader.clone() as Arc<dyn Downloader>,
            },
            extractor: Arc::new(StandardExtractor),
            installer: self.installer.clone(),
            prompt: self.prompt.clone(),
        };
        (
            Bundler::new(settings.clone(), collaborators, RuntimeConfig::with_output(output)),
            capture,
        )
    }
}
