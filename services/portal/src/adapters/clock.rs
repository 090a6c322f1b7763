//! services/portal/src/adapters/clock.rs

use booking_portal_core::ports::Clock;
use chrono::{DateTime, Local, NaiveDate, Utc};

/// Wall-clock time. "Today" is the local calendar date.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl SystemClock {
    pub fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}
