//! Wall-clock access for the feeding domain.
//!
//! Day identifiers are built from local date fields rather than by slicing a
//! UTC timestamp, so a caretaker west of UTC checking in late in the evening
//! still sees the current local day.

use chrono::{DateTime, Duration, FixedOffset, Local, SecondsFormat, Timelike, Utc};
use std::sync::Mutex;

use crate::domain::models::DateId;

/// Source of the current local time
pub trait Clock: Send + Sync {
    /// Current time with the local UTC offset
    fn now(&self) -> DateTime<FixedOffset>;

    /// Local calendar day as a [`DateId`]
    fn today_id(&self) -> DateId {
        DateId::new(self.now().date_naive())
    }

    /// Local hour, 0-23
    fn current_hour(&self) -> u32 {
        self.now().hour()
    }

    /// Completion timestamp in UTC with millisecond precision
    fn timestamp(&self) -> String {
        self.now()
            .with_timezone(&Utc)
            .to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}

/// The machine's clock and timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        let now = Local::now();
        now.with_timezone(now.offset())
    }
}

/// A clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl ManualClock {
    pub fn new(now: DateTime<FixedOffset>) -> Self {
        Self { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<FixedOffset>) {
        *self.now.lock().unwrap_or_else(|e| e.into_inner()) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}
