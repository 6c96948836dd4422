//! Git backend for template caches.
//!
//! Repository inspection (opening, resolving remote branches, reading commit
//! metadata) goes through `gix`. Operations that mutate the worktree or talk
//! to the network run the `git` executable.

use crate::error::{GitError, Result};
use crate::git::{CloneError, CommitInfo, OpenOutcome, TemplateRepository, VersionControl};
use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::Output;

/// Git operations using gix for reads and the git CLI for writes
#[derive(Debug, Clone)]
pub struct GitCli {
    git: Option<PathBuf>,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    /// Locate the git executable on PATH
    pub fn new() -> Self {
        let git = match which::which("git") {
            Ok(path) => {
                log::debug!("Found git at: {}", path.display());
                Some(path)
            }
            Err(e) => {
                log::debug!("git not found in PATH: {}", e);
                None
            }
        };
        Self { git }
    }

    fn git(&self) -> Result<&Path> {
        self.git.as_deref().ok_or(GitError::GitNotFound.into())
    }
}

async fn run_git<I, S>(git: &Path, args: I) -> std::io::Result<Output>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    tokio::process::Command::new(git)
        .args(args)
        .env("GIT_TERMINAL_PROMPT", "0")
        .output()
        .await
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}

/// Classify `git clone` stderr into the failure categories callers act on.
fn classify_clone_failure(stderr: &str, branch: Option<&str>) -> CloneError {
    let lower = stderr.to_ascii_lowercase();
    if let Some(branch) = branch
        && lower.contains("remote branch")
        && lower.contains("not found")
    {
        return CloneError::BranchNotFound(branch.to_string());
    }
    if lower.contains("repository not found")
        || lower.contains("does not appear to be a git repository")
        || lower.contains("does not exist")
    {
        return CloneError::RepositoryNotFound(stderr.to_string());
    }
    CloneError::Transport(stderr.to_string())
}

#[async_trait]
impl VersionControl for GitCli {
    async fn open(&self, path: &Path) -> OpenOutcome {
        if !path.exists() {
            return OpenOutcome::NotFound;
        }
        let Ok(git) = self.git() else {
            return OpenOutcome::NotARepository;
        };

        let probe = path.to_path_buf();
        let opened = tokio::task::spawn_blocking(move || gix::open(&probe).map(|_| ())).await;
        match opened {
            Ok(Ok(())) => OpenOutcome::Repository(Box::new(GitRepository {
                path: path.to_path_buf(),
                git: git.to_path_buf(),
            })),
            Ok(Err(e)) => {
                log::debug!("{} is not a git repository: {}", path.display(), e);
                OpenOutcome::NotARepository
            }
            Err(e) => {
                log::warn!("Repository probe task failed: {}", e);
                OpenOutcome::NotARepository
            }
        }
    }

    async fn clone_repo(
        &self,
        url: &str,
        dest: &Path,
        branch: Option<&str>,
    ) -> std::result::Result<(), CloneError> {
        let git = self
            .git()
            .map_err(|e| CloneError::Transport(e.to_string()))?;

        let mut args: Vec<&OsStr> = vec![OsStr::new("clone"), OsStr::new("--quiet")];
        if let Some(branch) = branch {
            args.push(OsStr::new("--branch"));
            args.push(OsStr::new(branch));
        }
        args.push(OsStr::new(url));
        args.push(dest.as_os_str());

        log::info!("Cloning {} into {}", url, dest.display());
        let output = run_git(git, args)
            .await
            .map_err(|e| CloneError::Transport(e.to_string()))?;
        if output.status.success() {
            Ok(())
        } else {
            Err(classify_clone_failure(&stderr_of(&output), branch))
        }
    }
}

/// A checkout on disk
#[derive(Debug)]
pub struct GitRepository {
    path: PathBuf,
    git: PathBuf,
}

#[async_trait]
impl TemplateRepository for GitRepository {
    fn path(&self) -> &Path {
        &self.path
    }

    async fn fetch(&self, remote: &str) -> Result<()> {
        let output = run_git(
            &self.git,
            [
                OsStr::new("-C"),
                self.path.as_os_str(),
                OsStr::new("fetch"),
                OsStr::new("--quiet"),
                OsStr::new(remote),
            ],
        )
        .await
        .map_err(|e| GitError::RemoteOperationFailed {
            operation: "fetch".to_string(),
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(GitError::RemoteOperationFailed {
                operation: "fetch".to_string(),
                reason: stderr_of(&output),
            }
            .into());
        }
        Ok(())
    }

    async fn resolve_ref(&self, remote: &str, name: &str) -> Result<Option<CommitInfo>> {
        let path = self.path.clone();
        let reference = format!("refs/remotes/{}/{}", remote, name);

        tokio::task::spawn_blocking(move || {
            let lookup_failed = |e: &dyn std::fmt::Display| GitError::ReferenceFailed {
                reason: format!("{}: {}", reference, e),
            };

            let repo = gix::open(&path).map_err(|e| lookup_failed(&e))?;
            if repo
                .try_find_reference(reference.as_str())
                .map_err(|e| lookup_failed(&e))?
                .is_none()
            {
                return Ok(None);
            }

            let id = repo
                .rev_parse_single(reference.as_str())
                .map_err(|e| lookup_failed(&e))?
                .detach();
            let commit = repo.find_commit(id).map_err(|e| lookup_failed(&e))?;

            let hash = commit.id().to_string();
            let short_hash = commit
                .id()
                .shorten()
                .map(|prefix| prefix.to_string())
                .unwrap_or_else(|_| hash.clone());
            // Signature time is "<seconds> <timezone>"
            let timestamp = commit.committer().ok().and_then(|committer| {
                committer
                    .time
                    .split_whitespace()
                    .next()
                    .and_then(|s| s.parse::<i64>().ok())
                    .and_then(|secs| chrono::DateTime::from_timestamp(secs, 0))
            });

            Ok(Some(CommitInfo {
                reference,
                hash,
                short_hash,
                timestamp,
            }))
        })
        .await
        .map_err(|e| GitError::ReferenceFailed {
            reason: format!("Task join error: {}", e),
        })?
    }

    async fn checkout(&self, commit: &CommitInfo) -> Result<()> {
        let output = run_git(
            &self.git,
            [
                OsStr::new("-C"),
                self.path.as_os_str(),
                OsStr::new("checkout"),
                OsStr::new("--quiet"),
                OsStr::new("--detach"),
                OsStr::new(&commit.hash),
            ],
        )
        .await
        .map_err(|e| GitError::ReferenceFailed {
            reason: e.to_string(),
        })?;

        if !output.status.success() {
            return Err(GitError::ReferenceFailed {
                reason: format!("checkout of {} failed: {}", commit.reference, stderr_of(&output)),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_missing_branch() {
        let err = classify_clone_failure(
            "warning: Could not find remote branch 3.12 to clone.\nfatal: Remote branch 3.12 not found in upstream origin",
            Some("3.12"),
        );
        assert!(matches!(err, CloneError::BranchNotFound(b) if b == "3.12"));
    }

    #[test]
    fn test_classify_missing_repository() {
        let err = classify_clone_failure(
            "remote: Repository not found.\nfatal: repository 'https://github.com/x/y.git/' not found",
            Some("3.10"),
        );
        assert!(matches!(err, CloneError::RepositoryNotFound(_)));
    }

    #[test]
    fn test_classify_transport_failure() {
        let err = classify_clone_failure(
            "fatal: unable to access 'https://github.com/x/y.git/': Could not resolve host: github.com",
            Some("3.10"),
        );
        assert!(matches!(err, CloneError::Transport(_)));
    }

    #[tokio::test]
    async fn test_open_missing_path_is_not_found() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let outcome = GitCli::new().open(&tmp.path().join("missing")).await;
        assert!(matches!(outcome, OpenOutcome::NotFound));
    }

    #[tokio::test]
    async fn test_open_plain_directory_is_not_a_repository() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let outcome = GitCli::new().open(tmp.path()).await;
        assert!(matches!(outcome, OpenOutcome::NotARepository));
    }
}
