//! Runtime settings for one invocation.

use crate::error::{BriefcaseError, ConfigError, Result};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Runtime version tag used when the interpreter cannot be queried.
pub const DEFAULT_PYTHON_VERSION_TAG: &str = "3.8";

/// Environment variable naming the Python interpreter to use.
pub const PYTHON_ENV: &str = "BRIEFCASE_PYTHON";

static PYTHON_PATH: LazyLock<Option<PathBuf>> = LazyLock::new(|| {
    let path = which::which("python3").ok();
    log::debug!("python3 located at {:?}", path);
    path
});

/// Everything the pipeline needs to know about where and how to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Project directory holding `pyproject.toml` and app sources
    pub base_path: PathBuf,
    /// Target platform, e.g. `macOS`
    pub platform: String,
    /// Output format, e.g. `app`
    pub output_format: String,
    /// Runtime version tag, e.g. `3.10`
    pub python_version_tag: String,
    /// Interpreter used to run the package installer
    pub python: PathBuf,
    /// Root of cached template clones
    pub template_cache: PathBuf,
    /// Directory receiving downloaded support packages
    pub support_cache: PathBuf,
}

impl Settings {
    /// Settings with caches rooted under `home`.
    pub fn new(
        base_path: impl Into<PathBuf>,
        platform: impl Into<String>,
        output_format: impl Into<String>,
        python_version_tag: impl Into<String>,
        python: impl Into<PathBuf>,
        home: &Path,
    ) -> Self {
        Self {
            base_path: base_path.into(),
            platform: platform.into(),
            output_format: output_format.into(),
            python_version_tag: python_version_tag.into(),
            python: python.into(),
            template_cache: home.join(".cookiecutters"),
            support_cache: home.join(".briefcase").join("support"),
        }
    }

    /// Settings for the current machine, filling in anything not supplied.
    pub async fn detect(
        base_path: impl Into<PathBuf>,
        platform: Option<String>,
        output_format: Option<String>,
        python_version_tag: Option<String>,
    ) -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            BriefcaseError::from(ConfigError::MissingKey {
                path: PathBuf::from("$HOME"),
                key: "home directory".to_string(),
            })
        })?;
        let python = python_executable();
        let platform = platform.unwrap_or_else(|| host_platform().to_string());
        let output_format = output_format.unwrap_or_else(|| default_output_format(&platform).to_string());
        let python_version_tag = match python_version_tag {
            Some(tag) => tag,
            None => detect_python_version_tag(&python).await,
        };

        Ok(Self::new(
            base_path,
            platform,
            output_format,
            python_version_tag,
            python,
            &home,
        ))
    }

    /// `<base>/<platform>`, the parent of every bundle for this platform.
    pub fn platform_path(&self) -> PathBuf {
        self.base_path.join(&self.platform)
    }
}

/// Interpreter from `BRIEFCASE_PYTHON`, else `python3` on `PATH`.
pub fn python_executable() -> PathBuf {
    if let Some(python) = std::env::var_os(PYTHON_ENV) {
        return PathBuf::from(python);
    }
    PYTHON_PATH
        .clone()
        .unwrap_or_else(|| PathBuf::from("python3"))
}

/// Platform name for the machine we are running on.
pub fn host_platform() -> &'static str {
    match std::env::consts::OS {
        "macos" => "macOS",
        "windows" => "windows",
        _ => "linux",
    }
}

/// Output format used when none is requested.
pub fn default_output_format(platform: &str) -> &'static str {
    match platform {
        "macOS" => "app",
        "windows" => "msi",
        "iOS" => "xcode",
        "android" => "gradle",
        _ => "appimage",
    }
}

/// Ask the interpreter for its `major.minor` version.
pub async fn detect_python_version_tag(python: &Path) -> String {
    let output = tokio::process::Command::new(python)
        .arg("-c")
        .arg("import sys; print(f'{sys.version_info.major}.{sys.version_info.minor}')")
        .output()
        .await;

    match output {
        Ok(output) if output.status.success() => {
            let tag = String::from_utf8_lossy(&output.stdout).trim().to_string();
            if tag.is_empty() {
                DEFAULT_PYTHON_VERSION_TAG.to_string()
            } else {
                tag
            }
        }
        Ok(output) => {
            log::debug!("{} exited with {}", python.display(), output.status);
            DEFAULT_PYTHON_VERSION_TAG.to_string()
        }
        Err(e) => {
            log::debug!("Unable to run {}: {}", python.display(), e);
            DEFAULT_PYTHON_VERSION_TAG.to_string()
        }
    }
}
