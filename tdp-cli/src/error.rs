//! CLI error types and result alias.

use miette::Diagnostic;
use tdp_migrate::PatchError;
use tdp_sqlite::SqliteError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(tdp::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(tdp::config))]
    Config(String),

    /// Patch engine error
    #[error(transparent)]
    #[diagnostic(code(tdp::patch))]
    Patch(#[from] PatchError),

    /// Database error
    #[error("Database error: {0}")]
    #[diagnostic(code(tdp::database))]
    Database(String),

    /// Command error
    #[error("Command error: {0}")]
    #[diagnostic(code(tdp::command))]
    Command(String),
}

impl CliError {
    /// Process exit code for this error.
    ///
    /// Drift between patch files and database exits with 2, anything else
    /// with 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Patch(e) if e.is_consistency_violation() => 2,
            _ => 1,
        }
    }
}

impl From<SqliteError> for CliError {
    fn from(err: SqliteError) -> Self {
        match err {
            SqliteError::Config(msg) => CliError::Config(msg),
            other => CliError::Database(other.to_string()),
        }
    }
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(format!("Failed to parse TOML: {}", err))
    }
}

impl From<toml::ser::Error> for CliError {
    fn from(err: toml::ser::Error) -> Self {
        CliError::Config(format!("Failed to serialize TOML: {}", err))
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::Command(format!("Failed to serialize JSON: {}", err))
    }
}
