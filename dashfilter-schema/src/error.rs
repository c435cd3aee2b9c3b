//! Error types for dataset loading and configuration.

// These warnings are false positives - the fields are used by derive macros
#![allow(unused_assignments)]

use miette::Diagnostic;
use thiserror::Error;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors that can occur while loading datasets and configuration.
#[derive(Error, Debug, Diagnostic)]
pub enum SchemaError {
    /// Error reading a file.
    #[error("failed to read file: {path}")]
    #[diagnostic(code(dashfilter::schema::io_error))]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Unsupported file extension.
    #[error("unsupported file format `{path}` (expected .json or .toml)")]
    #[diagnostic(code(dashfilter::schema::unsupported_format))]
    UnsupportedFormat { path: String },

    /// Duplicate column definition.
    #[error("duplicate column `{name}` in dataset `{dataset}`")]
    #[diagnostic(code(dashfilter::schema::duplicate_column))]
    DuplicateColumn { dataset: String, name: String },

    /// Invalid timezone string.
    #[error("invalid timezone `{value}`")]
    #[diagnostic(
        code(dashfilter::schema::invalid_timezone),
        help("use `UTC`, `Z`, or a fixed offset such as `+03:00`")
    )]
    InvalidTimezone { value: String },

    /// Configuration error.
    #[error("configuration error: {message}")]
    #[diagnostic(code(dashfilter::schema::config_error))]
    ConfigError { message: String },

    /// TOML parsing error.
    #[error("failed to parse TOML")]
    #[diagnostic(code(dashfilter::schema::toml_error))]
    TomlError {
        #[source]
        source: toml::de::Error,
    },

    /// JSON parsing error.
    #[error("failed to parse JSON")]
    #[diagnostic(code(dashfilter::schema::json_error))]
    JsonError {
        #[source]
        source: serde_json::Error,
    },
}

impl SchemaError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    /// Create an invalid timezone error.
    pub fn invalid_timezone(value: impl Into<String>) -> Self {
        Self::InvalidTimezone {
            value: value.into(),
        }
    }

    /// Create a duplicate column error.
    pub fn duplicate_column(dataset: impl Into<String>, name: impl Into<String>) -> Self {
        Self::DuplicateColumn {
            dataset: dataset.into(),
            name: name.into(),
        }
    }
}

impl From<toml::de::Error> for SchemaError {
    fn from(source: toml::de::Error) -> Self {
        Self::TomlError { source }
    }
}

impl From<serde_json::Error> for SchemaError {
    fn from(source: serde_json::Error) -> Self {
        Self::JsonError { source }
    }
}
