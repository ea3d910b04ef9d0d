//! Daily reset rule.
//!
//! A state left over from a previous day is not cleared at midnight. It stays
//! visible until the local clock reaches the reset hour, so a caretaker
//! checking in at 2 AM still sees what was done the evening before.

use crate::domain::clock::Clock;
use crate::domain::models::DateId;

pub const DEFAULT_RESET_HOUR: u32 = 7;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetPolicy {
    reset_hour: u32,
}

impl ResetPolicy {
    pub fn new(reset_hour: u32) -> Self {
        Self { reset_hour }
    }

    pub fn reset_hour(&self) -> u32 {
        self.reset_hour
    }

    /// Whether a state stored for `stored` must be archived and cleared.
    ///
    /// A stored date in the future counts as "not today" and gets the same
    /// hour test.
    pub fn is_due(&self, stored: DateId, today: DateId, current_hour: u32) -> bool {
        stored != today && current_hour >= self.reset_hour
    }

    pub fn should_reset(&self, stored: DateId, clock: &dyn Clock) -> bool {
        self.is_due(stored, clock.today_id(), clock.current_hour())
    }
}

impl Default for ResetPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_RESET_HOUR)
    }
}
