//! Shared CLI plumbing: error type, exit codes and output helpers.

use serde::Serialize;
use thiserror::Error;

use crate::config::Config;
use crate::services::DraftStore;

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    /// Success.
    Success = 0,
    /// I/O, network or upstream failure.
    IoError = 1,
    /// Bad arguments or invalid input.
    ValidationError = 2,
}

/// A failed CLI command.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CliError {
    /// Human-readable message.
    pub message: String,
    /// Exit code for the process.
    pub exit_code: ExitCode,
}

impl CliError {
    /// Runtime failure (exit code 1).
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: ExitCode::IoError,
        }
    }

    /// Invalid input (exit code 2).
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: ExitCode::ValidationError,
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        Self::io(format!("{err:#}"))
    }
}

/// Result type for CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// Loads the operator configuration, reporting parse errors as validation
/// failures.
pub fn load_config() -> CliResult<Config> {
    Config::load().map_err(|e| CliError::validation(format!("Failed to load configuration: {e:#}")))
}

/// Opens the draft store in the config directory.
pub fn draft_store() -> CliResult<DraftStore> {
    Ok(DraftStore::new(Config::draft_file_path()?))
}

/// Prints a value as pretty JSON.
pub fn print_json<T: Serialize>(value: &T) -> CliResult<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| CliError::io(format!("Failed to serialize output to JSON: {e}")))?;
    println!("{json}");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::io("x").exit_code as i32, 1);
        assert_eq!(CliError::validation("x").exit_code as i32, 2);
    }

    #[test]
    fn test_from_anyhow_keeps_context_chain() {
        let err: CliError = anyhow::anyhow!("root cause").context("Failed to read draft").into();
        assert_eq!(err.exit_code, ExitCode::IoError);
        assert_eq!(err.message, "Failed to read draft: root cause");
    }
}
