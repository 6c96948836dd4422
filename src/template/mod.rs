//! Template expansion.
//!
//! A template is a parameterized file tree. Expanding it writes a rendered
//! copy into an output directory using a flat key/value context. The
//! pipeline depends only on [`TemplateExpander`]; [`CookiecutterExpander`]
//! is the implementation shipped with the binary.

mod cookiecutter;

pub use cookiecutter::CookiecutterExpander;

use async_trait::async_trait;
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;

/// Flat key/value context handed to the expander.
pub type TemplateContext = serde_json::Map<String, serde_json::Value>;

/// Name of the file that marks a directory as a template.
pub const TEMPLATE_MANIFEST: &str = "cookiecutter.json";

/// Parameters for one expansion.
#[derive(Debug, Clone)]
pub struct ExpandRequest<'a> {
    /// Local template directory or repository URL
    pub source: &'a str,
    /// Directory that receives the rendered tree
    pub output_dir: &'a Path,
    /// Branch to check out when `source` is a repository
    pub checkout: Option<&'a str>,
    /// Never prompt; take every value from the context or its default
    pub no_input: bool,
    /// Values overriding the template defaults
    pub context: &'a TemplateContext,
}

/// Distinguishable expansion failures.
#[derive(Debug, Error)]
pub enum ExpandError {
    /// The template repository could not be cloned (offline, TLS, ...)
    #[error("unable to clone template: {0}")]
    Transport(String),

    /// The source is not a template, or does not exist
    #[error("{0} is not a valid template")]
    InvalidTemplate(String),

    /// The repository has no branch named by the requested checkout
    #[error("template has no branch '{0}'")]
    RefNotFound(String),

    /// Rendering or writing the tree failed
    #[error("template rendering failed: {0}")]
    Render(#[from] crate::bundler::Error),
}

/// Expands a template into an output directory.
#[async_trait]
pub trait TemplateExpander: Send + Sync {
    /// Expand `request.source` into `request.output_dir`, returning the
    /// path of the rendered top-level directory.
    async fn expand(&self, request: ExpandRequest<'_>) -> Result<PathBuf, ExpandError>;
}

static REPO_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(((git|hg)\+)?(git|ssh|file|https?):(//)?|\w+@[\w.]+)")
        .expect("repository URL regex is valid")
});

/// Whether `template` refers to a remote repository rather than a directory.
pub fn is_repo_url(template: &str) -> bool {
    REPO_URL_RE.is_match(template)
}

/// Cache directory name for a repository URL: the last path segment with
/// any `.git` suffix removed.
pub fn cache_name(template: &str) -> String {
    let tail = template
        .trim_end_matches('/')
        .rsplit('/')
        .next()
        .unwrap_or(template);
    tail.split(".git").next().unwrap_or(tail).to_string()
}

/// Cache path for a repository URL under `cache_root`.
pub fn cache_path(cache_root: &Path, template: &str) -> PathBuf {
    cache_root.join(cache_name(template))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_url_detection() {
        assert!(is_repo_url(
            "https://github.com/beeware/briefcase-macOS-app-template.git"
        ));
        assert!(is_repo_url("git@github.com:beeware/briefcase-template.git"));
        assert!(is_repo_url("git+https://example.com/t.git"));
        assert!(is_repo_url("file:///srv/templates/t"));
        assert!(!is_repo_url("/home/user/templates/t"));
        assert!(!is_repo_url("templates/local"));
    }

    #[test]
    fn test_cache_name_strips_git_suffix() {
        assert_eq!(
            cache_name("https://github.com/beeware/briefcase-macOS-app-template.git"),
            "briefcase-macOS-app-template"
        );
        assert_eq!(
            cache_name("https://github.com/beeware/briefcase-macOS-app-template/"),
            "briefcase-macOS-app-template"
        );
        assert_eq!(cache_name("git@github.com:org/thing.git"), "thing");
    }

    #[test]
    fn test_cache_path_joins_root() {
        assert_eq!(
            cache_path(Path::new("/home/u/.cookiecutters"), "https://x.org/a/tpl.git"),
            PathBuf::from("/home/u/.cookiecutters/tpl")
        );
    }
}
