//! Configuration file parsing for `dashfilter.toml`.

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::{self, Write as _};
use std::path::Path;
use std::sync::LazyLock;

use crate::error::{SchemaError, SchemaResult};
use crate::timezone::Timezone;

/// Default config file name.
pub const CONFIG_FILE_NAME: &str = "dashfilter.toml";

/// Main configuration structure for `dashfilter.toml`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FilterConfig {
    /// Display settings.
    #[serde(default)]
    pub display: DisplayConfig,

    /// Session storage settings.
    #[serde(default)]
    pub session: SessionConfig,

    /// Environment-specific overrides.
    #[serde(default)]
    pub environments: HashMap<String, EnvironmentOverride>,
}

impl FilterConfig {
    /// Load configuration from a file path.
    pub fn from_file(path: impl AsRef<Path>) -> SchemaResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| SchemaError::IoError {
            path: path.display().to_string(),
            source: e,
        })?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> SchemaResult<Self> {
        let expanded = expand_env_vars(content);
        let config: Self = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment-specific overrides.
    ///
    /// The merged configuration is validated again.
    pub fn with_environment(mut self, env: &str) -> SchemaResult<Self> {
        if let Some(overrides) = self.environments.remove(env) {
            if let Some(display) = overrides.display {
                if let Some(timezone) = display.timezone {
                    self.display.timezone = timezone;
                }
                if let Some(format) = display.date_format {
                    self.display.date_format = format;
                }
                if let Some(format) = display.time_format {
                    self.display.time_format = format;
                }
                if let Some(format) = display.datetime_format {
                    self.display.datetime_format = format;
                }
            }
            if let Some(session) = overrides.session {
                if let Some(namespace) = session.namespace {
                    self.session.namespace = Some(namespace);
                }
            }
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> SchemaResult<()> {
        for (name, format) in [
            ("date_format", &self.display.date_format),
            ("time_format", &self.display.time_format),
            ("datetime_format", &self.display.datetime_format),
        ] {
            if format.trim().is_empty() {
                return Err(SchemaError::config(format!("display.{} must not be empty", name)));
            }
            if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
                return Err(SchemaError::config(format!(
                    "display.{} `{}` is not a valid strftime pattern",
                    name, format
                )));
            }
        }
        check_fields("date_format", &self.display.date_format, |p| {
            write!(String::new(), "{}", sample_datetime().date_naive().format(p))
        })?;
        check_fields("time_format", &self.display.time_format, |p| {
            write!(String::new(), "{}", sample_datetime().time().format(p))
        })?;
        check_fields("datetime_format", &self.display.datetime_format, |p| {
            write!(String::new(), "{}", sample_datetime().format(p))
        })?;
        if let Some(ns) = &self.session.namespace {
            if ns.is_empty() || ns.contains('.') {
                return Err(SchemaError::config(
                    "session.namespace must be a non-empty key segment without dots",
                ));
            }
        }
        Ok(())
    }
}

fn sample_datetime() -> DateTime<FixedOffset> {
    NaiveDateTime::default().and_utc().fixed_offset()
}

/// Reject a pattern whose fields the value kind cannot supply, such as `%H` for a date.
fn check_fields(
    name: &str,
    pattern: &str,
    format: impl Fn(&str) -> fmt::Result,
) -> SchemaResult<()> {
    format(pattern).map_err(|_| {
        SchemaError::config(format!(
            "display.{} `{}` uses fields a {} value does not have",
            name,
            pattern,
            name.trim_end_matches("_format")
        ))
    })
}

/// Display configuration.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayConfig {
    /// Timezone zoned datetimes are shown and serialized in.
    #[serde(default)]
    pub timezone: Timezone,

    /// strftime pattern for dates in summaries.
    #[serde(default = "default_date_format")]
    pub date_format: String,

    /// strftime pattern for times in summaries.
    #[serde(default = "default_time_format")]
    pub time_format: String,

    /// strftime pattern for datetimes in summaries.
    #[serde(default = "default_datetime_format")]
    pub datetime_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            timezone: Timezone::utc(),
            date_format: default_date_format(),
            time_format: default_time_format(),
            datetime_format: default_datetime_format(),
        }
    }
}

impl DisplayConfig {
    /// Get the summary formats.
    pub fn formats(&self) -> DisplayFormats {
        DisplayFormats {
            date: self.date_format.clone(),
            time: self.time_format.clone(),
            datetime: self.datetime_format.clone(),
        }
    }
}

fn default_date_format() -> String {
    "%d.%m.%Y".to_string()
}

fn default_time_format() -> String {
    "%H:%M:%S".to_string()
}

fn default_datetime_format() -> String {
    "%d.%m.%Y %H:%M:%S".to_string()
}

/// strftime patterns used when temporal values are shown to users.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFormats {
    /// Date pattern.
    pub date: String,
    /// Time pattern.
    pub time: String,
    /// Datetime pattern.
    pub datetime: String,
}

impl Default for DisplayFormats {
    fn default() -> Self {
        DisplayConfig::default().formats()
    }
}

/// Session storage configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SessionConfig {
    /// Optional key prefix for session-scoped filters.
    pub namespace: Option<String>,
}

/// Environment-specific configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentOverride {
    /// Display overrides.
    pub display: Option<DisplayOverride>,

    /// Session overrides.
    pub session: Option<SessionConfig>,
}

/// Display configuration overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DisplayOverride {
    /// Timezone override.
    pub timezone: Option<Timezone>,
    /// Date format override.
    pub date_format: Option<String>,
    /// Time format override.
    pub time_format: Option<String>,
    /// Datetime format override.
    pub datetime_format: Option<String>,
}

static ENV_VAR_PATTERN: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid")
});

/// Expand `${VAR}` references from the process environment.
fn expand_env_vars(content: &str) -> String {
    let mut result = content.to_string();

    for cap in ENV_VAR_PATTERN.captures_iter(content) {
        let var_name = &cap[1];
        let full_match = &cap[0];

        if let Ok(value) = std::env::var(var_name) {
            result = result.replace(full_match, &value);
        }
    }

    result
}
