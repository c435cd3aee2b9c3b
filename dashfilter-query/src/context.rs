//! Per-call parameters for compilation and rendering.

use chrono::{DateTime, FixedOffset, Utc};
use dashfilter_schema::{DisplayConfig, DisplayFormats, Timezone};

use crate::evaluator::{Evaluator, Notifier, TracingNotifier};

static TRACING_NOTIFIER: TracingNotifier = TracingNotifier;

/// Everything a compilation needs beyond the dataset and the tree.
///
/// Each call gets its own context; nothing is read from global state.
#[derive(Clone, Copy)]
pub struct FilterContext<'a> {
    /// Timezone zoned datetimes are expressed in.
    pub timezone: Timezone,
    /// Reference instant for relative periods.
    pub now: DateTime<Utc>,
    /// Resolves manual expressions.
    pub evaluator: &'a dyn Evaluator,
    /// Receives evaluator failures.
    pub notifier: &'a dyn Notifier,
}

impl<'a> FilterContext<'a> {
    /// Create a context that reports evaluator failures through `tracing`.
    pub fn new(timezone: Timezone, now: DateTime<Utc>, evaluator: &'a dyn Evaluator) -> Self {
        Self {
            timezone,
            now,
            evaluator,
            notifier: &TRACING_NOTIFIER,
        }
    }

    /// Report evaluator failures elsewhere.
    pub fn with_notifier(mut self, notifier: &'a dyn Notifier) -> Self {
        self.notifier = notifier;
        self
    }

    /// The reference instant in the display timezone.
    pub fn local_now(&self) -> DateTime<FixedOffset> {
        self.timezone.localize(&self.now)
    }
}

impl std::fmt::Debug for FilterContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterContext")
            .field("timezone", &self.timezone)
            .field("now", &self.now)
            .finish_non_exhaustive()
    }
}

/// Display settings for summaries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderOptions {
    /// Timezone zoned datetimes are shown in.
    pub timezone: Timezone,
    /// strftime patterns.
    pub formats: DisplayFormats,
}

impl From<&DisplayConfig> for RenderOptions {
    fn from(config: &DisplayConfig) -> Self {
        Self {
            timezone: config.timezone,
            formats: config.formats(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::JsonLiteralEvaluator;
    use chrono::TimeZone;

    #[test]
    fn test_local_now() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 22, 0, 0).unwrap();
        let ctx = FilterContext::new("+03:00".parse().unwrap(), now, &JsonLiteralEvaluator);
        assert_eq!(ctx.local_now().to_rfc3339(), "2024-01-02T01:00:00+03:00");
    }

    #[test]
    fn test_render_options_from_config() {
        let config = DisplayConfig::default();
        let options = RenderOptions::from(&config);
        assert!(options.timezone.is_utc());
        assert_eq!(options.formats.date, "%d.%m.%Y");
    }
}
