//! Third-party package installation.
//!
//! Requirement strings are handed to the installer exactly as declared;
//! ordering, duplicates and version resolution are the installer's business.

use crate::bundler::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};

/// Where packages are installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallTarget<'a> {
    /// An isolated directory inside the bundle
    Directory(&'a Path),
    /// The environment of the interpreter itself
    Ambient,
}

/// Exit status reported by an installer run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstallStatus {
    /// Process exit code; `None` when terminated by a signal
    pub code: Option<i32>,
}

impl InstallStatus {
    /// Whether the installer exited with status zero
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

/// Installs package requirements.
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    /// Install `requirements` into `target`.
    ///
    /// Only a failure to launch the installer is an `Err`; a failed install
    /// is reported through the returned status.
    async fn install(
        &self,
        requirements: &[String],
        target: InstallTarget<'_>,
        upgrade: bool,
    ) -> Result<InstallStatus>;
}

/// Runs `<python> -m pip install`.
#[derive(Debug, Clone)]
pub struct PipInstaller {
    python: PathBuf,
}

impl PipInstaller {
    /// Use the given interpreter
    pub fn new(python: impl Into<PathBuf>) -> Self {
        Self {
            python: python.into(),
        }
    }

    /// Build the pip argument list (everything after the interpreter).
    pub fn arguments(requirements: &[String], target: InstallTarget<'_>, upgrade: bool) -> Vec<String> {
        let mut args = vec!["-m".to_string(), "pip".to_string(), "install".to_string()];
        if upgrade {
            args.push("--upgrade".to_string());
        }
        if let InstallTarget::Directory(dir) = target {
            args.push(format!("--target={}", dir.display()));
        }
        args.extend(requirements.iter().cloned());
        args
    }
}

#[async_trait]
impl PackageInstaller for PipInstaller {
    async fn install(
        &self,
        requirements: &[String],
        target: InstallTarget<'_>,
        upgrade: bool,
    ) -> Result<InstallStatus> {
        let args = Self::arguments(requirements, target, upgrade);
        log::info!("Running {} {}", self.python.display(), args.join(" "));

        let status = tokio::process::Command::new(&self.python)
            .args(&args)
            .status()
            .await
            .map_err(|error| Error::CommandFailed {
                command: format!("{} -m pip install", self.python.display()),
                error,
            })?;

        Ok(InstallStatus {
            code: status.code(),
        })
    }
}
