//! Error types for filter operations with actionable messages.
//!
//! Every error carries an [`ErrorCode`] for programmatic handling plus
//! optional context (the column, operator and operation involved) and
//! suggestions for fixing the filter.
//!
//! # Error Codes
//!
//! Error codes follow a pattern: D{category}{number}
//! - 1xxx: Filter integrity errors (illegal type, illegal argument, missing column)
//! - 2xxx: Collaborator errors (expression evaluator)
//! - 6xxx: Data errors (serialization)
//! - 7xxx: Configuration errors
//! - 9xxx: Internal errors
//!
//! ```rust
//! use dashfilter_query::{ErrorCode, FilterError};
//!
//! let err = FilterError::column_not_found("createdAt");
//! assert_eq!(err.code, ErrorCode::ColumnNotFound);
//! assert_eq!(err.code.code(), "D1003");
//! assert!(!err.is_recoverable());
//! ```

use std::fmt;
use thiserror::Error;

/// Result type for filter operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Error codes for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Filter integrity errors (1xxx)
    /// Operator catalog invoked with an unrecognized column type (D1001).
    IllegalType = 1001,
    /// Unsupported period/unit, or a malformed literal (D1002).
    IllegalArgument = 1002,
    /// Filter references a column absent from the dataset (D1003).
    ColumnNotFound = 1003,

    // Collaborator errors (2xxx)
    /// The expression evaluator failed (D2001).
    EvaluatorFailure = 2001,

    // Data errors (6xxx)
    /// Serialization error (D6002).
    SerializationError = 6002,
    /// Deserialization error (D6003).
    DeserializationError = 6003,

    // Configuration errors (7xxx)
    /// Invalid configuration (D7001).
    InvalidConfiguration = 7001,

    // Internal errors (9xxx)
    /// Internal error (D9001).
    Internal = 9001,
}

impl ErrorCode {
    /// Get the error code string (e.g., "D1001").
    pub fn code(&self) -> String {
        format!("D{}", *self as u16)
    }

    /// Get a short description of the error code.
    pub fn description(&self) -> &'static str {
        match self {
            Self::IllegalType => "Illegal column type",
            Self::IllegalArgument => "Illegal argument",
            Self::ColumnNotFound => "Column not found",
            Self::EvaluatorFailure => "Expression evaluation failed",
            Self::SerializationError => "Serialization error",
            Self::DeserializationError => "Deserialization error",
            Self::InvalidConfiguration => "Invalid configuration",
            Self::Internal => "Internal error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Additional context for an error.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// The operation that was being performed.
    pub operation: Option<String>,
    /// The column involved.
    pub column: Option<String>,
    /// The operator involved.
    pub operator: Option<String>,
    /// Suggestions for fixing the error.
    pub suggestions: Vec<String>,
    /// Help text.
    pub help: Option<String>,
}

/// Errors that can occur while building, converting or compiling filters.
#[derive(Error, Debug)]
pub struct FilterError {
    /// The error code.
    pub code: ErrorCode,
    /// The error message.
    pub message: String,
    /// Additional context.
    pub context: ErrorContext,
    /// The source error (if any).
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)
    }
}

impl FilterError {
    /// Create a new error with the given code and message.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Add context about the operation.
    pub fn with_context(mut self, operation: impl Into<String>) -> Self {
        self.context.operation = Some(operation.into());
        self
    }

    /// Add a suggestion for fixing the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.context.suggestions.push(suggestion.into());
        self
    }

    /// Add help text.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.context.help = Some(help.into());
        self
    }

    /// Set the column.
    pub fn with_column(mut self, column: impl Into<String>) -> Self {
        self.context.column = Some(column.into());
        self
    }

    /// Set the operator.
    pub fn with_operator(mut self, operator: impl Into<String>) -> Self {
        self.context.operator = Some(operator.into());
        self
    }

    /// Set the source error.
    pub fn with_source<E: std::error::Error + Send + Sync + 'static>(mut self, source: E) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    // ============== Constructor Functions ==============

    /// The operator catalog was asked about a column type it does not know.
    pub fn illegal_type(type_name: impl Into<String>) -> Self {
        let type_name = type_name.into();
        Self::new(
            ErrorCode::IllegalType,
            format!("Column type `{}` cannot be filtered", type_name),
        )
        .with_suggestion("Declare the column with a supported type (string, int, date, ...)")
    }

    /// An argument was outside what the operation supports.
    pub fn illegal_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::IllegalArgument, message.into())
    }

    /// A literal could not be parsed into the structured value it stands for.
    pub fn malformed_literal(expected: &str, literal: impl Into<String>) -> Self {
        let literal = literal.into();
        Self::new(
            ErrorCode::IllegalArgument,
            format!("Expected {} but found `{}`", expected, literal),
        )
    }

    /// A filter references a column the dataset does not declare.
    pub fn column_not_found(column: impl Into<String>) -> Self {
        let column = column.into();
        Self::new(
            ErrorCode::ColumnNotFound,
            format!("Column `{}` is not part of the dataset", column),
        )
        .with_column(&column)
        .with_suggestion("Remove the filter or add the column to the dataset definition")
    }

    /// The expression evaluator rejected a manual value.
    pub fn evaluator_failure(expression: impl Into<String>, message: impl Into<String>) -> Self {
        let expression = expression.into();
        Self::new(
            ErrorCode::EvaluatorFailure,
            format!("Failed to evaluate `{}`: {}", expression, message.into()),
        )
        .with_help("The value is withheld; fix the expression before submitting")
    }

    /// Create a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::SerializationError, message.into())
    }

    /// Create a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(
            ErrorCode::DeserializationError,
            format!("Failed to read stored filters: {}", message),
        )
        .with_suggestion("Reset the stored filters for this dash")
    }

    /// Create an invalid configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidConfiguration, message.into())
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        let message = message.into();
        Self::new(ErrorCode::Internal, format!("Internal error: {}", message))
    }

    // ============== Error Checks ==============

    /// Check if this is a missing column error.
    pub fn is_column_not_found(&self) -> bool {
        self.code == ErrorCode::ColumnNotFound
    }

    /// Check if this error can be absorbed without aborting the whole tree.
    ///
    /// Only evaluator failures are recoverable; the rest indicate a filter
    /// that should never have been constructed.
    pub fn is_recoverable(&self) -> bool {
        self.code == ErrorCode::EvaluatorFailure
    }

    // ============== Display Functions ==============

    /// Display the full error with all context and suggestions.
    pub fn display_full(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("Error [{}]: {}\n", self.code.code(), self.message));

        if let Some(ref op) = self.context.operation {
            output.push_str(&format!("  → While: {}\n", op));
        }
        if let Some(ref column) = self.context.column {
            output.push_str(&format!("  → Column: {}\n", column));
        }
        if let Some(ref operator) = self.context.operator {
            output.push_str(&format!("  → Operator: {}\n", operator));
        }

        if !self.context.suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for (i, suggestion) in self.context.suggestions.iter().enumerate() {
                output.push_str(&format!("  {}. {}\n", i + 1, suggestion));
            }
        }

        if let Some(ref help) = self.context.help {
            output.push_str(&format!("\nHelp: {}\n", help));
        }

        output
    }
}

impl From<dashfilter_schema::SchemaError> for FilterError {
    fn from(err: dashfilter_schema::SchemaError) -> Self {
        FilterError::configuration(err.to_string()).with_source(err)
    }
}

/// Helper for creating errors with context.
#[macro_export]
macro_rules! filter_error {
    ($code:expr, $msg:expr) => {
        $crate::error::FilterError::new($code, $msg)
    };
    ($code:expr, $msg:expr, $($key:ident = $value:expr),+ $(,)?) => {{
        let mut err = $crate::error::FilterError::new($code, $msg);
        $(
            err = err.$key($value);
        )+
        err
    }};
}
