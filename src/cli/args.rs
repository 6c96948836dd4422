//! Command line argument parsing and validation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Assemble native application bundles from platform templates
#[derive(Parser, Debug)]
#[command(
    name = "briefcase",
    version,
    about = "Assemble native application bundles from platform templates",
    long_about = "Create platform bundles for the apps declared in pyproject.toml.

Usage:
  briefcase create
  briefcase create --app demo --platform macOS --format app
  briefcase local --update-dependencies"
)]
pub struct Args {
    /// Command to execute
    #[command(subcommand)]
    pub command: Command,

    /// Project directory containing pyproject.toml
    #[arg(long, global = true, value_name = "DIR", default_value = ".")]
    pub project: PathBuf,

    /// Show debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Create application bundles
    Create {
        /// Only create the named app
        #[arg(short, long, value_name = "NAME")]
        app: Option<String>,

        /// Target platform (defaults to the host platform)
        #[arg(long)]
        platform: Option<String>,

        /// Output format (defaults to the platform's usual format)
        #[arg(long)]
        format: Option<String>,

        /// Python version tag, e.g. 3.10 (defaults to the interpreter's version)
        #[arg(long, value_name = "TAG")]
        python_version: Option<String>,

        /// Never prompt; existing bundles are left alone
        #[arg(long)]
        no_input: bool,
    },

    /// Prepare an app to run from its source tree
    Local {
        /// The app to prepare
        #[arg(short, long, value_name = "NAME")]
        app: Option<String>,

        /// Reinstall dependencies even if they were installed before
        #[arg(short = 'd', long)]
        update_dependencies: bool,
    },
}

impl Command {
    /// Command name for messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Create { .. } => "create",
            Command::Local { .. } => "local",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency
    pub fn validate(&self) -> Result<(), String> {
        if let Command::Create {
            python_version: Some(tag),
            ..
        } = &self.command
        {
            let valid = tag
                .split_once('.')
                .is_some_and(|(major, minor)| {
                    !major.is_empty()
                        && !minor.is_empty()
                        && major.chars().all(|c| c.is_ascii_digit())
                        && minor.chars().all(|c| c.is_ascii_digit())
                });
            if !valid {
                return Err(format!(
                    "Python version tag must look like 3.10, got '{}'",
                    tag
                ));
            }
        }
        if !self.project.is_dir() {
            return Err(format!(
                "Project directory {} does not exist",
                self.project.display()
            ));
        }
        Ok(())
    }
}

/// Configuration derived from command line arguments
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Output manager for colored terminal output
    output: super::OutputManager,
}

impl RuntimeConfig {
    /// Create runtime configuration with normal verbosity
    pub fn new() -> Self {
        Self {
            output: super::OutputManager::new(false, false),
        }
    }

    /// Create runtime configuration that prints nothing but errors
    pub fn quiet() -> Self {
        Self {
            output: super::OutputManager::new(false, true),
        }
    }

    /// Create runtime configuration around an existing output manager
    pub fn with_output(output: super::OutputManager) -> Self {
        Self { output }
    }

    /// Get a reference to the output manager
    pub fn output(&self) -> &super::OutputManager {
        &self.output
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<&Args> for RuntimeConfig {
    fn from(args: &Args) -> Self {
        Self {
            output: super::OutputManager::new(args.verbose, args.quiet),
        }
    }
}

impl RuntimeConfig {
    /// Print message
    pub fn println(&self, message: &str) {
        let _ = self.output.println(message);
    }

    /// Print verbose message
    pub fn verbose_println(&self, message: &str) {
        let _ = self.output.verbose(message);
    }

    /// Print a stage header
    pub fn section(&self, title: &str) {
        let _ = self.output.section(title);
    }

    /// Print error message (always shown)
    pub fn error_println(&self, message: &str) {
        self.output.error(message);
    }

    /// Print warning message
    pub fn warning_println(&self, message: &str) {
        let _ = self.output.warn(message);
    }

    /// Print success message
    pub fn success_println(&self, message: &str) {
        let _ = self.output.success(message);
    }

    /// Print indented text
    pub fn indent(&self, message: &str) {
        let _ = self.output.indent(message);
    }

    /// Check if verbose output is enabled
    pub fn is_verbose(&self) -> bool {
        self.output.is_verbose()
    }

    /// Check if only errors are printed
    pub fn is_quiet(&self) -> bool {
        self.output.is_quiet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create() {
        let args = Args::try_parse_from([
            "briefcase",
            "create",
            "-a",
            "demo",
            "--platform",
            "macOS",
            "--format",
            "app",
            "--python-version",
            "3.10",
            "--no-input",
        ])
        .expect("valid args");
        assert_eq!(
            args.command,
            Command::Create {
                app: Some("demo".into()),
                platform: Some("macOS".into()),
                format: Some("app".into()),
                python_version: Some("3.10".into()),
                no_input: true,
            }
        );
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_parse_local() {
        let args = Args::try_parse_from(["briefcase", "local", "-d"]).expect("valid args");
        assert_eq!(
            args.command,
            Command::Local {
                app: None,
                update_dependencies: true,
            }
        );
        assert_eq!(args.command.name(), "local");
    }

    #[test]
    fn test_invalid_python_version_tag() {
        let args = Args::try_parse_from(["briefcase", "create", "--python-version", "three"])
            .expect("parses");
        assert!(args.validate().is_err());
    }

    #[test]
    fn test_missing_subcommand_is_rejected() {
        assert!(Args::try_parse_from(["briefcase"]).is_err());
    }
}
