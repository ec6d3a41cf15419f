//! Deterministic clock for services under test.

use std::sync::Mutex;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use mockable::Clock;

/// Default instant used by fixtures: 2026-03-14 09:30 UTC.
pub fn fixture_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0)
        .single()
        .expect("valid fixture timestamp")
}

/// Calendar date of [`fixture_now`].
pub fn fixture_today() -> NaiveDate {
    fixture_now().date_naive()
}

/// Clock frozen at a settable instant.
#[derive(Debug)]
pub struct FixtureClock(Mutex<DateTime<Utc>>);

impl FixtureClock {
    pub fn at(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Move the clock to `now`.
    pub fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().expect("clock lock") = now;
    }
}

impl Default for FixtureClock {
    fn default() -> Self {
        Self::at(fixture_now())
    }
}

impl Clock for FixtureClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.0.lock().expect("clock lock")
    }
}
