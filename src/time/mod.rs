//! Date and Timezone Resolution
//!
//! Household-local date handling shared by the dashboard endpoints:
//!
//! - [`normalize_timezone`]: validate a stored timezone, falling back to UTC
//! - [`today_in_timezone`]: the current calendar day in a timezone
//! - [`monday_of_week`]: the Monday that starts a date's ISO week
//!
//! "Now" always comes from an injected [`Clock`] so handlers and tests can
//! pin the instant.

mod clock;
mod date;
mod zone;

pub use clock::{Clock, FixedClock, SystemClock};
pub use date::{is_calendar_date, monday_of_week, CalendarDate};
pub use zone::{normalize_timezone, parse_timezone, today_in_timezone, DEFAULT_TIMEZONE};
