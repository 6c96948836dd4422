//! # Briefcase Bundler
//!
//! Assembles native application bundles for Python apps from versioned
//! platform templates.
//!
//! ## Features
//!
//! - **Template-driven layout**: the expanded template declares where support
//!   files, dependencies, code and images belong (`briefcase.toml`)
//! - **Offline tolerant**: cached template clones are used when the network
//!   is unavailable
//! - **Support packages**: the newest prebuilt runtime is picked from a
//!   public catalog, or an app-specific override is used
//! - **In-place runs**: `briefcase local` prepares an app to run from source
//!
//! ## Usage
//!
//! ```bash
//! briefcase create                      # every app, host platform
//! briefcase create -a demo --platform macOS --format app
//! briefcase local --update-dependencies
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod bundler;
pub mod cli;
pub mod config;
pub mod error;
pub mod git;
pub mod installer;
pub mod storage;
pub mod template;

// Re-export main types for public API
pub use bundler::{BundleState, Bundler, Collaborators, PathIndex};
pub use cli::Args;
pub use config::{AppDescriptor, ProjectConfig, Settings};
pub use error::{BriefcaseError, Result};
