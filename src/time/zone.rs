//! Timezone validation and household-local "today"

use chrono_tz::Tz;

use super::clock::Clock;
use super::date::CalendarDate;

/// Timezone used when a household has none, or an unusable one
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Look a timezone identifier up in the tz database
///
/// Identifiers are matched case-insensitively, so `america/new_york`
/// resolves to `America/New_York`.
pub fn parse_timezone(tz: &str) -> Option<Tz> {
    tz.parse::<Tz>()
        .ok()
        .or_else(|| Tz::from_str_insensitive(tz).ok())
}

/// Validate a stored timezone preference
///
/// Returns the trimmed identifier when the tz database knows it, and
/// [`DEFAULT_TIMEZONE`] for anything else. Never fails.
pub fn normalize_timezone(tz: &str) -> String {
    let trimmed = tz.trim();
    if trimmed.is_empty() {
        return DEFAULT_TIMEZONE.to_string();
    }

    match parse_timezone(trimmed) {
        Some(_) => trimmed.to_string(),
        None => {
            tracing::debug!(timezone = %trimmed, "Unknown timezone, falling back to UTC");
            DEFAULT_TIMEZONE.to_string()
        }
    }
}

/// Current calendar day in `tz`
///
/// `tz` is expected to be normalized already; an unknown zone yields the
/// UTC calendar day.
pub fn today_in_timezone(clock: &dyn Clock, tz: &str) -> CalendarDate {
    let now = clock.now();
    let local = match parse_timezone(tz) {
        Some(zone) => now.with_timezone(&zone).date_naive(),
        None => now.date_naive(),
    };
    CalendarDate::from_naive(local)
}
