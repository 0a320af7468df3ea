//! Civil (wall-clock) timestamps and the calendar arithmetic built on them.
//!
//! A [`CivilDateTime`] is a local date and time with no offset attached. It is
//! the only time representation used inside the crate; text is parsed and
//! formatted only where records cross the store or interchange boundary.

use std::fmt;
use std::ops::{Add, Sub};

use chrono::{Datelike, Duration, Months, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Persisted timestamp layout, e.g. `2024-03-05 09:00`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Calendar date layout, e.g. `2024-03-05`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// A local civil date and time.
///
/// Ordering is chronological. The `Default` value is the zero time
/// (`1970-01-01 00:00`), which stands in for any timestamp that failed to
/// parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct CivilDateTime(NaiveDateTime);

impl CivilDateTime {
    /// Build from a date plus hour and minute. `None` when the time is out of range.
    pub fn new(date: NaiveDate, hour: u32, minute: u32) -> Option<Self> {
        let time = NaiveTime::from_hms_opt(hour, minute, 0)?;
        Some(Self(date.and_time(time)))
    }

    pub fn from_naive(dt: NaiveDateTime) -> Self {
        Self(dt)
    }

    /// The zero time substituted for unreadable timestamps.
    pub fn zero() -> Self {
        Self::default()
    }

    pub fn is_zero(&self) -> bool {
        *self == Self::zero()
    }

    /// Parse a `YYYY-MM-DD HH:MM` timestamp.
    pub fn parse(text: &str) -> Option<Self> {
        NaiveDateTime::parse_from_str(text.trim(), TIMESTAMP_FORMAT)
            .ok()
            .map(Self)
    }

    /// Parse a `YYYY-MM-DD HH:MM` timestamp, falling back to [`CivilDateTime::zero`].
    pub fn parse_or_zero(text: &str) -> Self {
        Self::parse(text).unwrap_or_else(|| {
            tracing::warn!(value = text, "unparsable timestamp, using zero time");
            Self::zero()
        })
    }

    /// Midnight at the start of `date`.
    pub fn start_of_day(date: NaiveDate) -> Self {
        Self(date.and_time(NaiveTime::default()))
    }

    /// The last instant (`23:59:59`) of `date`.
    pub fn end_of_day(date: NaiveDate) -> Self {
        Self(date.and_time(NaiveTime::default()) + Duration::days(1) - Duration::seconds(1))
    }

    pub fn date(&self) -> NaiveDate {
        self.0.date()
    }

    pub fn time(&self) -> NaiveTime {
        self.0.time()
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn naive(&self) -> NaiveDateTime {
        self.0
    }

    /// Same time of day on another date.
    pub fn with_date(&self, date: NaiveDate) -> Self {
        Self(date.and_time(self.time()))
    }

    /// `HH:MM`, as shown next to titles in listings.
    pub fn clock(&self) -> String {
        self.0.format("%H:%M").to_string()
    }
}

impl fmt::Display for CivilDateTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl Add<Duration> for CivilDateTime {
    type Output = CivilDateTime;

    fn add(self, rhs: Duration) -> Self::Output {
        Self(self.0 + rhs)
    }
}

impl Sub for CivilDateTime {
    type Output = Duration;

    fn sub(self, rhs: Self) -> Self::Output {
        self.0 - rhs.0
    }
}

impl Serialize for CivilDateTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Strings go through [`CivilDateTime::parse_or_zero`]; `null` and non-string
/// values read as the zero time.
impl<'de> Deserialize<'de> for CivilDateTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Option::<serde_json::Value>::deserialize(deserializer)? {
            Some(serde_json::Value::String(text)) => Ok(Self::parse_or_zero(&text)),
            other => {
                tracing::warn!(value = ?other, "non-text timestamp, using zero time");
                Ok(Self::zero())
            }
        }
    }
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), DATE_FORMAT).ok()
}

pub fn add_days(date: NaiveDate, days: i64) -> Option<NaiveDate> {
    date.checked_add_signed(Duration::try_days(days)?)
}

pub fn add_weeks(date: NaiveDate, weeks: i64) -> Option<NaiveDate> {
    add_days(date, weeks.checked_mul(7)?)
}

/// Add calendar months. A day that does not exist in the target month is
/// clamped to that month's last day (Jan 31 + 1 month = Feb 28/29).
pub fn add_months(date: NaiveDate, months: u32) -> Option<NaiveDate> {
    date.checked_add_months(Months::new(months))
}

/// Add calendar years with the same clamping as [`add_months`] (Feb 29 + 1 year = Feb 28).
pub fn add_years(date: NaiveDate, years: u32) -> Option<NaiveDate> {
    add_months(date, years.checked_mul(12)?)
}

/// The first date strictly after `date` that falls on `weekday` (1 to 7 days later).
pub fn next_weekday_after(date: NaiveDate, weekday: Weekday) -> Option<NaiveDate> {
    let target = i64::from(weekday.num_days_from_monday());
    let current = i64::from(date.weekday().num_days_from_monday());
    let ahead = match (target - current).rem_euclid(7) {
        0 => 7,
        n => n,
    };
    add_days(date, ahead)
}
