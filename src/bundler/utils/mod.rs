//! Filesystem, archive and HTTP helpers shared by the pipeline stages.

pub mod archive;
pub mod fs;
pub mod http;
