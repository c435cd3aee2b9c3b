//! Logging setup for the engine and the CLI.
//!
//! The engine only emits `tracing` events: `debug!` per converted or compiled
//! block, `trace!` per resolved value, and `warn!` when a manual expression
//! fails. Installing a subscriber is left to binaries through [`init`].
//!
//! | Variable | Values | Default |
//! |---|---|---|
//! | `DASHFILTER_DEBUG` | `1`, `true`, `yes` | off |
//! | `DASHFILTER_LOG_LEVEL` | `trace`, `debug`, `info`, `warn`, `error` | `debug` with `DASHFILTER_DEBUG`, else `warn` |
//! | `DASHFILTER_LOG_FORMAT` | `json`, `pretty`, `compact` | `json` |
//!
//! ```rust,no_run
//! dashfilter_query::logging::init();
//! ```

use std::env;
use std::sync::Once;

use tracing::Level;

const DEBUG_VAR: &str = "DASHFILTER_DEBUG";
const LEVEL_VAR: &str = "DASHFILTER_LOG_LEVEL";
const FORMAT_VAR: &str = "DASHFILTER_LOG_FORMAT";

/// Crates whose events are let through the filter.
const TARGETS: [&str; 4] = [
    "dashfilter",
    "dashfilter_query",
    "dashfilter_schema",
    "dashfilter_cli",
];

static INIT: Once = Once::new();

/// Output format of installed log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per line.
    #[default]
    Json,
    /// Multi-line human readable output.
    Pretty,
    /// Single-line human readable output.
    Compact,
}

impl LogFormat {
    fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Self::Pretty,
            "compact" => Self::Compact,
            _ => Self::Json,
        }
    }
}

/// Logging settings resolved from the environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogSettings {
    /// Maximum level; `None` when logging is off.
    pub level: Option<Level>,
    /// Output format.
    pub format: LogFormat,
}

impl LogSettings {
    /// Read settings from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its value.
    ///
    /// Logging is off unless `DASHFILTER_DEBUG` is truthy or
    /// `DASHFILTER_LOG_LEVEL` is set. An unknown level falls back to the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let debug = lookup(DEBUG_VAR).is_some_and(|v| is_truthy(&v));
        let fallback = if debug { Level::DEBUG } else { Level::WARN };

        let level = match lookup(LEVEL_VAR) {
            Some(raw) => Some(raw.trim().parse().unwrap_or(fallback)),
            None if debug => Some(fallback),
            None => None,
        };

        Self {
            level,
            format: lookup(FORMAT_VAR)
                .map(|f| LogFormat::parse(&f))
                .unwrap_or_default(),
        }
    }

    /// The `EnvFilter` directive covering the dashfilter crates.
    pub fn directive(&self) -> Option<String> {
        let level = self.level?.as_str().to_ascii_lowercase();
        Some(
            TARGETS
                .iter()
                .map(|target| format!("{}={}", target, level))
                .collect::<Vec<_>>()
                .join(","),
        )
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(value.to_ascii_lowercase().as_str(), "1" | "true" | "yes")
}

/// Whether `DASHFILTER_DEBUG` is enabled.
pub fn is_debug_enabled() -> bool {
    env::var(DEBUG_VAR).is_ok_and(|v| is_truthy(&v))
}

/// Install a stderr subscriber from the environment.
///
/// Only the first call has an effect.
pub fn init() {
    init_with(LogSettings::from_env());
}

/// Install a stderr subscriber from explicit settings.
///
/// Only the first call across [`init`] and `init_with` has an effect.
pub fn init_with(settings: LogSettings) {
    INIT.call_once(|| install(settings));
}

#[cfg(feature = "tracing-subscriber")]
fn install(settings: LogSettings) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let Some(directive) = settings.directive() else {
        return;
    };
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output.
    let installed = match settings.format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Pretty => registry
            .with(fmt::layer().pretty().with_writer(std::io::stderr))
            .try_init(),
        LogFormat::Compact => registry
            .with(fmt::layer().compact().with_writer(std::io::stderr))
            .try_init(),
    };

    if installed.is_ok() {
        tracing::debug!(%directive, format = ?settings.format, "Logging initialized");
    }
}

#[cfg(not(feature = "tracing-subscriber"))]
fn install(_settings: LogSettings) {}
