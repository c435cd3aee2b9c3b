//! Collaborators for manual values: the expression evaluator and the
//! channel evaluator failures are reported on.

use parking_lot::Mutex;
use thiserror::Error;
use tracing::warn;

use crate::error::FilterError;
use crate::value::FilterValue;

/// Failure reported by an [`Evaluator`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct EvaluatorError {
    /// What went wrong.
    pub message: String,
}

impl EvaluatorError {
    /// Create an evaluator error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Turns a manual expression into a concrete value.
pub trait Evaluator: Send + Sync {
    /// Evaluate `expression`.
    fn evaluate(&self, expression: &str) -> Result<FilterValue, EvaluatorError>;
}

impl<F> Evaluator for F
where
    F: Fn(&str) -> Result<FilterValue, EvaluatorError> + Send + Sync,
{
    fn evaluate(&self, expression: &str) -> Result<FilterValue, EvaluatorError> {
        self(expression)
    }
}

/// Evaluates expressions that are JSON literals (`42`, `"abc"`, `[1, 2]`).
///
/// Anything else is reported as a failure.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonLiteralEvaluator;

impl Evaluator for JsonLiteralEvaluator {
    fn evaluate(&self, expression: &str) -> Result<FilterValue, EvaluatorError> {
        serde_json::from_str::<serde_json::Value>(expression.trim())
            .map(FilterValue::from)
            .map_err(|e| EvaluatorError::new(e.to_string()))
    }
}

/// Receives recoverable errors so they can be shown to the user.
pub trait Notifier: Send + Sync {
    /// Report `error`.
    fn notify(&self, error: &FilterError);
}

/// Logs notifications as warnings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, error: &FilterError) {
        warn!(code = %error.code, column = ?error.context.column, "{}", error.message);
    }
}

/// Keeps notifications for later inspection.
#[derive(Debug, Default)]
pub struct CollectingNotifier {
    messages: Mutex<Vec<String>>,
}

impl CollectingNotifier {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages received so far.
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().clone()
    }

    /// Number of messages received.
    pub fn len(&self) -> usize {
        self.messages.lock().len()
    }

    /// Check if nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }
}

impl Notifier for CollectingNotifier {
    fn notify(&self, error: &FilterError) {
        self.messages.lock().push(error.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_literal_evaluator() {
        let eval = JsonLiteralEvaluator;
        assert_eq!(eval.evaluate("42").unwrap(), FilterValue::Int(42));
        assert_eq!(eval.evaluate(" \"x\" ").unwrap(), FilterValue::from("x"));
        assert!(eval.evaluate("1 +").is_err());
    }

    #[test]
    fn test_closure_evaluator() {
        let eval = |expr: &str| -> Result<FilterValue, EvaluatorError> {
            Ok(FilterValue::from(expr.len() as i64))
        };
        assert_eq!(eval.evaluate("abc").unwrap(), FilterValue::Int(3));
    }

    #[test]
    fn test_collecting_notifier() {
        let notifier = CollectingNotifier::new();
        assert!(notifier.is_empty());
        notifier.notify(&FilterError::evaluator_failure("1 +", "unexpected end"));
        assert_eq!(notifier.len(), 1);
        assert!(notifier.messages()[0].contains("D2001"));
    }
}
