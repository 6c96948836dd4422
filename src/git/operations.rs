//! Version-control operations needed to maintain the template cache.
//!
//! The pipeline only ever sees these traits. [`super::GitCli`] is the
//! production implementation; tests substitute in-memory fakes.

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::path::Path;
use thiserror::Error;

/// Outcome of opening a path as a checkout.
pub enum OpenOutcome {
    /// The path is a usable checkout
    Repository(Box<dyn TemplateRepository>),
    /// The path exists but is not a checkout
    NotARepository,
    /// The path does not exist
    NotFound,
}

impl std::fmt::Debug for OpenOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpenOutcome::Repository(repo) => {
                f.debug_tuple("Repository").field(&repo.path()).finish()
            }
            OpenOutcome::NotARepository => f.write_str("NotARepository"),
            OpenOutcome::NotFound => f.write_str("NotFound"),
        }
    }
}

/// Entry point for version-control access.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Open `path` as a checkout.
    async fn open(&self, path: &Path) -> OpenOutcome;

    /// Clone `url` into `dest`, checking out `branch` when given.
    async fn clone_repo(
        &self,
        url: &str,
        dest: &Path,
        branch: Option<&str>,
    ) -> std::result::Result<(), CloneError>;
}

/// An opened checkout.
#[async_trait]
pub trait TemplateRepository: Send + Sync {
    /// Working directory of the checkout
    fn path(&self) -> &Path;

    /// Fetch updates from `remote`.
    async fn fetch(&self, remote: &str) -> Result<()>;

    /// Look up branch `name` on `remote`; `None` if no such branch exists.
    async fn resolve_ref(&self, remote: &str, name: &str) -> Result<Option<CommitInfo>>;

    /// Check out the given commit.
    async fn checkout(&self, commit: &CommitInfo) -> Result<()>;
}

/// A resolved commit on a remote branch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitInfo {
    /// Fully qualified reference, e.g. `refs/remotes/origin/3.10`
    pub reference: String,
    /// Full commit hash
    pub hash: String,
    /// Abbreviated commit hash
    pub short_hash: String,
    /// Commit timestamp, when it could be read
    pub timestamp: Option<DateTime<Utc>>,
}

/// Distinguishable clone failures.
#[derive(Debug, Error)]
pub enum CloneError {
    /// Network, TLS or other transport failure
    #[error("transport failure: {0}")]
    Transport(String),

    /// The URL does not name a repository
    #[error("repository not found: {0}")]
    RepositoryNotFound(String),

    /// The repository has no such branch
    #[error("branch '{0}' not found")]
    BranchNotFound(String),
}
