//! Git access for template caches.
//!
//! The template materializer opens cached template checkouts, refreshes them
//! from `origin`, and checks out the branch matching the runtime version. The
//! template expander clones templates that are not cached yet.

mod git_adapter;
mod operations;

pub use git_adapter::{GitCli, GitRepository};
pub use operations::{CloneError, CommitInfo, OpenOutcome, TemplateRepository, VersionControl};
