//! Calendar dates
//!
//! A [`CalendarDate`] is a `YYYY-MM-DD` string. Only the digit layout is
//! enforced: `2024-02-30` is a syntactically valid calendar date and is
//! carried through unchanged, it just cannot be used for date arithmetic.

use chrono::{Datelike, Duration, NaiveDate};
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

const DATE_FORMAT: &str = "%Y-%m-%d";

fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("valid date regex"))
}

/// Check whether a string has the strict `YYYY-MM-DD` shape
pub fn is_calendar_date(s: &str) -> bool {
    date_pattern().is_match(s)
}

/// A `YYYY-MM-DD` date with no time-of-day component
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct CalendarDate(String);

impl CalendarDate {
    /// Accept a string with the strict 4-2-2 digit shape
    pub fn parse(s: &str) -> Option<Self> {
        is_calendar_date(s).then(|| Self(s.to_string()))
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date.format(DATE_FORMAT).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret as a real calendar day, `None` for e.g. `2024-02-30`
    pub fn to_naive(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, DATE_FORMAT).ok()
    }

    /// Monday starting this date's ISO week
    ///
    /// Returns `None` when the date does not exist on the calendar.
    pub fn monday_of_week(&self) -> Option<Self> {
        self.to_naive().map(|d| Self::from_naive(monday_of_week(d)))
    }
}

impl fmt::Display for CalendarDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CalendarDate {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Monday that begins the ISO week containing `date`
///
/// Weekdays count Sunday=0 through Saturday=6; `(dow + 6) % 7` days are
/// subtracted, so a Monday maps to itself and a Sunday to six days earlier.
pub fn monday_of_week(date: NaiveDate) -> NaiveDate {
    let dow = date.weekday().num_days_from_sunday();
    let offset = (dow + 6) % 7;
    date - Duration::days(i64::from(offset))
}
