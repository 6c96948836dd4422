//! Project and runtime configuration.

mod app;
mod project;
mod settings;

pub use app::{AppDescriptor, DocumentType};
pub use project::{PROJECT_FILE, ProjectConfig};
pub use settings::{
    DEFAULT_PYTHON_VERSION_TAG, PYTHON_ENV, Settings, default_output_format,
    detect_python_version_tag, host_platform, python_executable,
};
