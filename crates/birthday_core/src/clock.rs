//! Operational clock in a fixed timezone.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Source of "now" for command handling and scheduling.
pub trait Clock {
    /// Current instant in the operational timezone.
    fn now(&self) -> DateTime<Tz>;

    /// Current calendar date in the operational timezone.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock projected into one timezone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Tz> {
        Utc::now().with_timezone(&self.tz)
    }
}

/// Clock frozen at one instant. Used for replays and tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    instant: DateTime<Tz>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Tz>) -> Self {
        Self { instant }
    }

    /// Freezes the clock at noon of `date` in `tz`.
    pub fn at_noon(tz: Tz, date: NaiveDate) -> Self {
        let noon = date.and_time(NaiveTime::MIN + Duration::hours(12));
        let instant = tz
            .from_local_datetime(&noon)
            .earliest()
            .unwrap_or_else(|| tz.from_utc_datetime(&noon));
        Self { instant }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Tz> {
        self.instant
    }
}
