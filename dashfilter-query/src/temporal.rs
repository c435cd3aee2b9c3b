//! Relative period resolution and temporal value formatting.

use std::fmt::{self, Write as _};

use chrono::{
    DateTime, FixedOffset, Months, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone,
};
use dashfilter_schema::{DisplayFormats, TemporalKind, Timezone};
use serde::{Deserialize, Serialize};

use crate::error::{FilterError, FilterResult};

const ISO_DATE: &str = "%Y-%m-%d";
const ISO_TIME: &str = "%H:%M:%S";
const ISO_DATETIME: &str = "%Y-%m-%dT%H:%M:%S%:z";

/// Whether a range has fixed bounds or is relative to now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Period {
    /// Fixed bounds picked by the user.
    Arbitrary,
    /// The `amount` units up to now.
    Last,
    /// The `amount` units from now.
    Next,
}

impl Period {
    /// Display title.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Arbitrary => "arbitrary",
            Self::Last => "last",
            Self::Next => "next",
        }
    }
}

/// Calendar unit of a relative period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

impl TimeUnit {
    /// Singular display name.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Second => "second",
            Self::Minute => "minute",
            Self::Hour => "hour",
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Fixed-length span for sub-month units; `None` for calendar units.
    fn fixed_span(&self, amount: u32) -> Option<TimeDelta> {
        let amount = i64::from(amount);
        match self {
            Self::Second => TimeDelta::try_seconds(amount),
            Self::Minute => TimeDelta::try_minutes(amount),
            Self::Hour => TimeDelta::try_hours(amount),
            Self::Day => TimeDelta::try_days(amount),
            Self::Week => TimeDelta::try_weeks(amount),
            Self::Month | Self::Year => None,
        }
    }

    fn months(&self, amount: u32) -> Option<Months> {
        match self {
            Self::Month => Some(Months::new(amount)),
            Self::Year => amount.checked_mul(12).map(Months::new),
            _ => None,
        }
    }
}

/// "last 3 months" and friends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RelativePeriod {
    /// `Last` or `Next`; `Arbitrary` never resolves.
    pub period: Period,
    /// Calendar unit.
    pub unit: TimeUnit,
    /// Number of units.
    pub amount: u32,
}

impl RelativePeriod {
    /// Create a relative period.
    pub fn new(period: Period, unit: TimeUnit, amount: u32) -> Self {
        Self {
            period,
            unit,
            amount,
        }
    }

    /// The most recent `amount` units.
    pub fn last(amount: u32, unit: TimeUnit) -> Self {
        Self::new(Period::Last, unit, amount)
    }

    /// The coming `amount` units.
    pub fn next(amount: u32, unit: TimeUnit) -> Self {
        Self::new(Period::Next, unit, amount)
    }

    /// Display title, e.g. `last 3 months`.
    pub fn title(&self) -> String {
        let plural = if self.amount == 1 { "" } else { "s" };
        format!(
            "{} {} {}{}",
            self.period.title(),
            self.amount,
            self.unit.title(),
            plural
        )
    }

    /// Resolve against a reference instant.
    pub fn resolve<Tz: TimeZone>(&self, now: DateTime<Tz>) -> FilterResult<Interval<Tz>> {
        resolve_interval(self.period, self.unit, self.amount, now)
    }
}

impl fmt::Display for RelativePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.title())
    }
}

/// A concrete `[start, end]` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval<Tz: TimeZone> {
    /// Inclusive start.
    pub start: DateTime<Tz>,
    /// Inclusive end.
    pub end: DateTime<Tz>,
}

/// Resolve a relative period against `now`.
///
/// Month and year arithmetic is calendar based and clamps to the last day
/// of shorter months. `Arbitrary` has no relative meaning and is rejected.
pub fn resolve_interval<Tz: TimeZone>(
    period: Period,
    unit: TimeUnit,
    amount: u32,
    now: DateTime<Tz>,
) -> FilterResult<Interval<Tz>> {
    let out_of_range = || {
        FilterError::illegal_argument(format!(
            "{} {} {:?} is out of range",
            period.title(),
            amount,
            unit
        ))
    };

    let shift = |forward: bool| -> FilterResult<DateTime<Tz>> {
        let shifted = match (unit.fixed_span(amount), unit.months(amount)) {
            (Some(span), _) if forward => now.clone().checked_add_signed(span),
            (Some(span), _) => now.clone().checked_sub_signed(span),
            (None, Some(months)) if forward => now.clone().checked_add_months(months),
            (None, Some(months)) => now.clone().checked_sub_months(months),
            (None, None) => None,
        };
        shifted.ok_or_else(out_of_range)
    };

    match period {
        Period::Last => Ok(Interval {
            start: shift(false)?,
            end: now.clone(),
        }),
        Period::Next => Ok(Interval {
            start: now.clone(),
            end: shift(true)?,
        }),
        Period::Arbitrary => Err(FilterError::illegal_argument(
            "ARBITRARY periods have fixed bounds and cannot be resolved relative to now",
        )),
    }
}

/// Project an instant to the ISO representation of a column's temporal kind.
///
/// Dates and times are taken in the instant's own offset; datetimes are
/// shifted into the display timezone first.
pub fn iso_format<Tz>(
    instant: Option<&DateTime<Tz>>,
    kind: TemporalKind,
    timezone: Timezone,
) -> Option<String>
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    let instant = instant?;
    Some(match kind {
        TemporalKind::Date => instant.format(ISO_DATE).to_string(),
        TemporalKind::Time => instant.format(ISO_TIME).to_string(),
        TemporalKind::DateTime => timezone.localize(instant).format(ISO_DATETIME).to_string(),
    })
}

/// A pickable temporal value, the form-side shape of an ISO string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TemporalValue {
    /// Calendar date.
    Date(NaiveDate),
    /// Time of day.
    Time(NaiveTime),
    /// Zoned date and time.
    DateTime(DateTime<FixedOffset>),
}

impl TemporalValue {
    /// Parse an ISO string as the given kind.
    ///
    /// Dates accept a full datetime and keep its date part; times accept
    /// `HH:MM` and full datetimes; datetimes without an offset are read in
    /// the display timezone.
    pub fn parse(s: &str, kind: TemporalKind, timezone: Timezone) -> FilterResult<Self> {
        let s = s.trim();
        let parsed = match kind {
            TemporalKind::Date => NaiveDate::parse_from_str(s, ISO_DATE)
                .ok()
                .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
                .or_else(|| parse_naive_datetime(s).map(|dt| dt.date()))
                .map(Self::Date),
            TemporalKind::Time => NaiveTime::parse_from_str(s, ISO_TIME)
                .or_else(|_| NaiveTime::parse_from_str(s, "%H:%M"))
                .ok()
                .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.time()))
                .map(Self::Time),
            TemporalKind::DateTime => DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| timezone.localize(&dt))
                .or_else(|| {
                    parse_naive_datetime(s).or_else(|| {
                        NaiveDate::parse_from_str(s, ISO_DATE)
                            .ok()
                            .map(|d| d.and_time(NaiveTime::MIN))
                    })
                    .and_then(|naive| timezone.offset().from_local_datetime(&naive).single())
                })
                .map(Self::DateTime),
        };
        parsed.ok_or_else(|| {
            let expected = match kind {
                TemporalKind::Date => "an ISO date (YYYY-MM-DD)",
                TemporalKind::Time => "an ISO time (HH:MM:SS)",
                TemporalKind::DateTime => "an ISO datetime",
            };
            FilterError::malformed_literal(expected, s)
        })
    }

    /// The ISO string stored in canonical filters.
    pub fn to_iso(&self) -> String {
        match self {
            Self::Date(d) => d.format(ISO_DATE).to_string(),
            Self::Time(t) => t.format(ISO_TIME).to_string(),
            Self::DateTime(dt) => dt.format(ISO_DATETIME).to_string(),
        }
    }

    /// Format for display with the configured patterns.
    ///
    /// A pattern the value cannot satisfy falls back to [`to_iso`](Self::to_iso).
    pub fn display(&self, formats: &DisplayFormats) -> String {
        let mut out = String::new();
        let written = match self {
            Self::Date(d) => write!(out, "{}", d.format(&formats.date)),
            Self::Time(t) => write!(out, "{}", t.format(&formats.time)),
            Self::DateTime(dt) => write!(out, "{}", dt.format(&formats.datetime)),
        };
        match written {
            Ok(()) => out,
            Err(_) => {
                tracing::debug!(value = %self.to_iso(), "Display pattern rejected value");
                self.to_iso()
            }
        }
    }
}

fn parse_naive_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use chrono::Utc;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 31, 12, 30, 0).unwrap()
    }

    #[test]
    fn test_last_seven_days() {
        let interval = resolve_interval(Period::Last, TimeUnit::Day, 7, now()).unwrap();
        assert_eq!(interval.start, now() - TimeDelta::days(7));
        assert_eq!(interval.end, now());
    }

    #[test]
    fn test_next_three_hours() {
        let interval = resolve_interval(Period::Next, TimeUnit::Hour, 3, now()).unwrap();
        assert_eq!(interval.start, now());
        assert_eq!(interval.end, now() + TimeDelta::hours(3));
    }

    #[test]
    fn test_calendar_months_clamp() {
        // 31 May minus three months lands on the last day of February.
        let interval = resolve_interval(Period::Last, TimeUnit::Month, 3, now()).unwrap();
        assert_eq!(
            interval.start,
            Utc.with_ymd_and_hms(2024, 2, 29, 12, 30, 0).unwrap()
        );

        let interval = resolve_interval(Period::Next, TimeUnit::Year, 1, now()).unwrap();
        assert_eq!(
            interval.end,
            Utc.with_ymd_and_hms(2025, 5, 31, 12, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_arbitrary_is_rejected() {
        let err = resolve_interval(Period::Arbitrary, TimeUnit::Day, 1, now()).unwrap_err();
        assert_eq!(err.code, ErrorCode::IllegalArgument);
    }

    #[test]
    fn test_unknown_unit_does_not_deserialize() {
        assert!(serde_json::from_str::<TimeUnit>("\"FORTNIGHT\"").is_err());
        assert_eq!(
            serde_json::from_str::<TimeUnit>("\"WEEK\"").unwrap(),
            TimeUnit::Week
        );
    }

    #[test]
    fn test_period_titles() {
        assert_eq!(RelativePeriod::last(3, TimeUnit::Month).title(), "last 3 months");
        assert_eq!(RelativePeriod::next(1, TimeUnit::Hour).title(), "next 1 hour");
    }

    #[test]
    fn test_iso_format_by_kind() {
        let tz: Timezone = "+03:00".parse().unwrap();
        let instant = now();
        assert_eq!(
            iso_format(Some(&instant), TemporalKind::Date, tz).as_deref(),
            Some("2024-05-31")
        );
        assert_eq!(
            iso_format(Some(&instant), TemporalKind::Time, tz).as_deref(),
            Some("12:30:00")
        );
        assert_eq!(
            iso_format(Some(&instant), TemporalKind::DateTime, tz).as_deref(),
            Some("2024-05-31T15:30:00+03:00")
        );
        assert_eq!(iso_format::<Utc>(None, TemporalKind::Date, tz), None);
    }

    #[test]
    fn test_parse_temporal_values() {
        let tz = Timezone::utc();
        assert_eq!(
            TemporalValue::parse("2024-01-02", TemporalKind::Date, tz).unwrap(),
            TemporalValue::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
        assert_eq!(
            TemporalValue::parse("2024-01-02T23:00:00+02:00", TemporalKind::Date, tz).unwrap(),
            TemporalValue::Date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
        );
        assert_eq!(
            TemporalValue::parse("08:15", TemporalKind::Time, tz).unwrap().to_iso(),
            "08:15:00"
        );

        let plus_two: Timezone = "+02:00".parse().unwrap();
        let dt = TemporalValue::parse("2024-01-02T10:00:00Z", TemporalKind::DateTime, plus_two)
            .unwrap();
        assert_eq!(dt.to_iso(), "2024-01-02T12:00:00+02:00");

        let naive =
            TemporalValue::parse("2024-01-02T10:00:00", TemporalKind::DateTime, plus_two).unwrap();
        assert_eq!(naive.to_iso(), "2024-01-02T10:00:00+02:00");
    }

    #[test]
    fn test_parse_malformed() {
        let err = TemporalValue::parse("yesterday", TemporalKind::Date, Timezone::utc())
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::IllegalArgument);
    }

    #[test]
    fn test_display_formats() {
        let formats = DisplayFormats::default();
        let value = TemporalValue::parse("2024-01-02", TemporalKind::Date, Timezone::utc()).unwrap();
        assert_eq!(value.display(&formats), "02.01.2024");
    }

    #[test]
    fn test_display_falls_back_to_iso() {
        let date = TemporalValue::parse("2024-01-02", TemporalKind::Date, Timezone::utc()).unwrap();
        let time_fields = DisplayFormats {
            date: "%Y-%m-%d %H:%M".to_string(),
            ..DisplayFormats::default()
        };
        assert_eq!(date.display(&time_fields), "2024-01-02");

        let unknown = DisplayFormats {
            date: "%Q".to_string(),
            time: "%Q".to_string(),
            datetime: "%Q".to_string(),
        };
        assert_eq!(date.display(&unknown), "2024-01-02");

        let time = TemporalValue::parse("08:15:00", TemporalKind::Time, Timezone::utc()).unwrap();
        let date_fields = DisplayFormats {
            time: "%d.%m %H:%M".to_string(),
            ..DisplayFormats::default()
        };
        assert_eq!(time.display(&date_fields), "08:15:00");

        let zoned = TemporalValue::parse("2024-01-02T10:00:00Z", TemporalKind::DateTime, Timezone::utc())
            .unwrap();
        assert_eq!(zoned.display(&unknown), "2024-01-02T10:00:00+00:00");
    }
}
