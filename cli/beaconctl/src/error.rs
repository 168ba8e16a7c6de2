//! Error handling and display for the CLI.

use beacon_sdk::{ConfigError, DispatchError, FetchError};
use colored::Colorize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("{what} is not configured")]
    NotConfigured {
        what: &'static str,
        vars: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Event rejected: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Remote config fetch failed: {0}")]
    Fetch(#[from] FetchError),
}

/// Print an error in a user-friendly format.
pub fn print_error(err: &anyhow::Error) {
    eprintln!("{} {}", "Error:".red().bold(), err);

    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        match cli_err {
            CliError::NotConfigured { vars, .. } => {
                eprintln!("\n{}", format!("Hint: set {}.", vars).yellow());
            }
            CliError::Dispatch(DispatchError::Status { status, .. })
            | CliError::Fetch(FetchError::Status { status, .. })
                if *status == 401 || *status == 403 =>
            {
                eprintln!(
                    "\n{}",
                    "Hint: check the API key or secret for this project.".yellow()
                );
            }
            CliError::Dispatch(DispatchError::Transport(_)) | CliError::Fetch(FetchError::Transport(_)) => {
                eprintln!(
                    "\n{}",
                    "Hint: check network connectivity and the configured endpoint.".yellow()
                );
            }
            _ => {}
        }
    }
}
