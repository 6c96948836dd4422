//! Error types for bundle creation.
//!
//! Every pipeline stage returns [`BriefcaseError`]. Faults are terminal for the
//! app being processed; the two degraded paths (stale template cache, missing
//! brand asset) never produce an error at all.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for briefcase operations
pub type Result<T> = std::result::Result<T, BriefcaseError>;

/// Main error type for all briefcase operations
#[derive(Error, Debug)]
pub enum BriefcaseError {
    /// Template resolution and expansion errors
    #[error("{0}")]
    Template(#[from] TemplateError),

    /// Support package resolution and unpacking errors
    #[error("{0}")]
    SupportPackage(#[from] SupportPackageError),

    /// Project configuration and path index errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// Git operation errors
    #[error("Git error: {0}")]
    Git(#[from] GitError),

    /// Transport failure while talking to a remote
    #[error("Unable to {operation}; is your computer offline?")]
    NetworkFailure {
        /// What was being attempted, e.g. "clone template repository"
        operation: String,
    },

    /// Package installer exited unsuccessfully
    #[error(
        "Unable to install dependencies. This may be because one of your \
         dependencies is invalid, or because pip was unable to connect \
         to the PyPI server."
    )]
    DependencyInstallError,

    /// A declared application source does not exist
    #[error("Application source '{src}' does not exist.")]
    MissingAppSources {
        /// Source path as declared in the project configuration
        src: String,
    },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Low-level bundler errors (filesystem, archives, HTTP)
    #[error("Bundler error: {0}")]
    Bundler(#[from] crate::bundler::Error),
}

impl BriefcaseError {
    /// Normalize any transport failure into a network fault for `operation`.
    pub fn network(operation: impl Into<String>) -> Self {
        BriefcaseError::NetworkFailure {
            operation: operation.into(),
        }
    }
}

/// Template errors
#[derive(Error, Debug)]
pub enum TemplateError {
    /// The template has no branch for the requested runtime version
    #[error("Template does not support Python version {version_tag}")]
    UnsupportedPythonVersion {
        /// Runtime version tag, e.g. "3.10"
        version_tag: String,
    },

    /// The template could not be found or is not a template
    #[error(
        "Unable to clone application template; is the template path '{template}' correct?"
    )]
    InvalidRepository {
        /// Template reference as configured
        template: String,
    },
}

/// Support package errors
#[derive(Error, Debug)]
pub enum SupportPackageError {
    /// No catalog entry matches the platform and version
    #[error("Unable to locate a support package for Python {python_version} on {platform}")]
    NotFound {
        /// Target platform
        platform: String,
        /// Runtime version tag
        python_version: String,
    },

    /// The fetched or referenced file is not an archive we can unpack
    #[error("Unable to unpack support package '{filename}'")]
    Invalid {
        /// File name of the support package
        filename: String,
    },

    /// A catalog key does not follow `<name>.b<build>.<ext>.<ext>`
    #[error("Support package catalog key '{key}' does not carry a build number")]
    MalformedCatalogKey {
        /// Offending object key
        key: String,
    },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A configuration file is missing
    #[error("Unable to find {path}")]
    MissingFile {
        /// Path that was expected to exist
        path: PathBuf,
    },

    /// A configuration file could not be parsed
    #[error("Unable to parse {path}: {reason}")]
    Malformed {
        /// Offending file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// A required key is absent
    #[error("{path} does not define '{key}'")]
    MissingKey {
        /// File (or section) being read
        path: PathBuf,
        /// Missing key
        key: String,
    },

    /// A key has a value of the wrong shape
    #[error("Invalid value for '{key}' in {path}: {reason}")]
    InvalidValue {
        /// File being read
        path: PathBuf,
        /// Offending key
        key: String,
        /// What was wrong
        reason: String,
    },
}

/// Git operation errors
#[derive(Error, Debug)]
pub enum GitError {
    /// The git executable could not be found
    #[error("git executable not found in PATH")]
    GitNotFound,

    /// Remote operation failed
    #[error("Git remote operation failed: {operation} - {reason}")]
    RemoteOperationFailed {
        /// Operation that failed
        operation: String,
        /// Reason for the error
        reason: String,
    },

    /// Reference lookup or checkout failed
    #[error("Git reference operation failed: {reason}")]
    ReferenceFailed {
        /// Reason for the error
        reason: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },
}

impl BriefcaseError {
    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            BriefcaseError::NetworkFailure { .. } => vec![
                "Check your internet connection".to_string(),
            ],
            BriefcaseError::Template(TemplateError::UnsupportedPythonVersion { version_tag }) => {
                vec![
                    format!("Use a template that provides a '{}' branch", version_tag),
                    "Pass --python-version to select a supported version".to_string(),
                ]
            }
            BriefcaseError::Template(TemplateError::InvalidRepository { .. }) => vec![
                "Check the 'template' setting in pyproject.toml".to_string(),
                "A template directory must contain cookiecutter.json".to_string(),
            ],
            BriefcaseError::SupportPackage(SupportPackageError::NotFound { .. }) => vec![
                "Set 'support_package' in pyproject.toml to a local archive or URL".to_string(),
            ],
            BriefcaseError::MissingAppSources { src } => vec![format!(
                "Create '{}' or remove it from the 'sources' list",
                src
            )],
            BriefcaseError::DependencyInstallError => vec![
                "Review the installer output above for the failing requirement".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable by simply re-running
    pub fn is_recoverable(&self) -> bool {
        matches!(self, BriefcaseError::NetworkFailure { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_network_faults_are_recoverable() {
        let offline = BriefcaseError::network("list support packages");
        assert!(offline.is_recoverable());
        assert_eq!(
            offline.to_string(),
            "Unable to list support packages; is your computer offline?"
        );

        assert!(!BriefcaseError::DependencyInstallError.is_recoverable());
        assert!(
            !BriefcaseError::from(TemplateError::UnsupportedPythonVersion {
                version_tag: "3.10".into(),
            })
            .is_recoverable()
        );
        assert!(
            !BriefcaseError::MissingAppSources { src: "src/demo".into() }.is_recoverable()
        );
    }

    #[test]
    fn test_network_faults_suggest_retrying() {
        let suggestions = BriefcaseError::network("clone template repository").recovery_suggestions();
        assert!(suggestions.iter().any(|s| s.contains("internet connection")));
    }
}
