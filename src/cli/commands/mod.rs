//! Command execution.
//!
//! Each command loads the project, builds a [`Bundler`](crate::bundler::Bundler)
//! session and reports failures with recovery suggestions.

mod create;
mod local;

use crate::cli::{Args, Command, RuntimeConfig};
use crate::error::Result;

use create::execute_create;
use local::execute_local;

/// Execute the main command based on parsed arguments
pub async fn execute_command(args: Args) -> Result<i32> {
    // Validate arguments
    if let Err(validation_error) = args.validate() {
        // Create output for validation errors (never quiet)
        let output = super::OutputManager::new(false, false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let config = RuntimeConfig::from(&args);

    let result = match &args.command {
        Command::Create { .. } => execute_create(&args, &config).await,
        Command::Local { .. } => execute_local(&args, &config).await,
    };

    match result {
        Ok(exit_code) => Ok(exit_code),
        Err(e) => {
            config.error_println(&format!(
                "Command '{}' failed: {}",
                args.command.name(),
                e
            ));

            let suggestions = e.recovery_suggestions();
            if !suggestions.is_empty() && !config.is_quiet() {
                config.println("\n💡 Recovery suggestions:");
                for suggestion in suggestions {
                    config.println(&format!("  • {}", suggestion));
                }
                if e.is_recoverable() {
                    config.println("  • Re-run the command once the network is available");
                }
            }

            Ok(1)
        }
    }
}
