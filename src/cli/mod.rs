//! Command line interface for briefcase.
//!
//! Parses arguments, runs the selected command and turns failures into an
//! exit code with recovery suggestions.

mod args;
pub mod commands;
mod output;
mod prompt;

pub use args::{Args, Command, RuntimeConfig};
pub use commands::execute_command;
pub use output::{OutputCapture, OutputManager};
pub use prompt::{FixedAnswer, Prompt, StdinPrompt, is_affirmative};

use crate::error::Result;

/// Main CLI entry point
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}

/// Parse arguments without executing (for testing)
pub fn parse_args() -> Args {
    Args::parse_args()
}

/// Validate arguments without executing (for testing)
pub fn validate_args(args: &Args) -> std::result::Result<(), String> {
    args.validate()
}

/// Create runtime configuration from arguments
pub fn create_runtime_config(args: &Args) -> RuntimeConfig {
    RuntimeConfig::from(args)
}
