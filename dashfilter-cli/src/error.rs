//! CLI error types and result alias.

use dashfilter_query::FilterError;
use dashfilter_schema::SchemaError;
use miette::Diagnostic;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(dashfilter::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(dashfilter::config))]
    Config(String),

    /// Dataset or config file error
    #[error(transparent)]
    #[diagnostic(transparent)]
    Schema(#[from] SchemaError),

    /// Filter tree could not be read
    #[error("Invalid filters: {0}")]
    #[diagnostic(code(dashfilter::filters))]
    Filters(#[from] serde_json::Error),

    /// Engine error
    #[error("{0}")]
    #[diagnostic(code(dashfilter::engine))]
    Engine(#[from] FilterError),

    /// Validation error
    #[error("Validation error: {0}")]
    #[diagnostic(code(dashfilter::validation))]
    Validation(String),
}

impl CliError {
    /// Message with all available context, for the terminal.
    pub fn display_full(&self) -> String {
        match self {
            Self::Engine(e) => e.display_full(),
            other => other.to_string(),
        }
    }
}
