//! Display timezone handling.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::SchemaError;

static OFFSET_PATTERN: LazyLock<regex_lite::Regex> = LazyLock::new(|| {
    regex_lite::Regex::new(r"^(?:UTC|GMT)?([+-])(\d{1,2})(?::?(\d{2}))?$")
        .expect("offset pattern is valid")
});

/// The timezone zoned datetime values are displayed and serialized in.
///
/// Only fixed UTC offsets are supported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Timezone(FixedOffset);

impl Timezone {
    /// UTC.
    pub fn utc() -> Self {
        Self(FixedOffset::east_opt(0).expect("zero offset is valid"))
    }

    /// Create a timezone from an offset in seconds east of UTC.
    pub fn from_offset_seconds(seconds: i32) -> Option<Self> {
        FixedOffset::east_opt(seconds).map(Self)
    }

    /// Get the underlying offset.
    pub fn offset(&self) -> FixedOffset {
        self.0
    }

    /// Check if this is UTC.
    pub fn is_utc(&self) -> bool {
        self.0.local_minus_utc() == 0
    }

    /// Project an instant into this timezone.
    pub fn localize<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> DateTime<FixedOffset> {
        instant.with_timezone(&self.0)
    }

    /// The current instant in this timezone.
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.localize(&Utc::now())
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self::utc()
    }
}

impl FromStr for Timezone {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if matches!(trimmed.to_ascii_uppercase().as_str(), "UTC" | "Z" | "GMT") {
            return Ok(Self::utc());
        }

        let caps = OFFSET_PATTERN
            .captures(trimmed)
            .ok_or_else(|| SchemaError::invalid_timezone(s))?;
        let hours: i32 = caps[2].parse().map_err(|_| SchemaError::invalid_timezone(s))?;
        let minutes: i32 = caps
            .get(3)
            .map(|m| m.as_str().parse())
            .transpose()
            .map_err(|_| SchemaError::invalid_timezone(s))?
            .unwrap_or(0);
        if hours > 23 || minutes > 59 {
            return Err(SchemaError::invalid_timezone(s));
        }

        let sign = if &caps[1] == "-" { -1 } else { 1 };
        Self::from_offset_seconds(sign * (hours * 3600 + minutes * 60))
            .ok_or_else(|| SchemaError::invalid_timezone(s))
    }
}

impl TryFrom<String> for Timezone {
    type Error = SchemaError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Timezone> for String {
    fn from(tz: Timezone) -> Self {
        tz.to_string()
    }
}

impl fmt::Display for Timezone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_utc() {
            write!(f, "UTC")
        } else {
            write!(f, "{}", self.0)
        }
    }
}
