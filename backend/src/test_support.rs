//! Test utilities for the survey crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`). It
//! is only compiled for tests or with the `test-support` feature.

use chrono::{DateTime, Local, TimeZone, Utc};
use mockable::Clock;

/// Clock frozen at a single UTC instant.
///
/// # Examples
/// ```rust
/// use mockable::Clock;
/// use survey_backend::test_support::{FixtureClock, at};
///
/// let clock = FixtureClock::new(at(10, 15));
/// assert_eq!(clock.utc(), at(10, 15));
/// ```
#[derive(Debug, Clone, Copy)]
pub struct FixtureClock(DateTime<Utc>);

impl FixtureClock {
    /// Freeze the clock at `instant`.
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// 2024-01-01 at `hour:minute` UTC.
///
/// # Panics
/// Panics when `hour` or `minute` is out of range.
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, hour, minute, 0)
        .single()
        .unwrap_or_else(|| panic!("invalid fixture time {hour:02}:{minute:02}"))
}
