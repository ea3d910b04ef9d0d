//! Domain model for a day of feedings.
use chrono::NaiveDate;
use std::fmt;
use std::str::FromStr;

/// Errors raised for caller input; storage failures never surface here
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FeedingError {
    #[error("Unknown feeding slot: {0}")]
    UnknownSlot(String),
    #[error("Invalid date id: {0} (expected YYYY-MM-DD)")]
    InvalidDate(String),
    #[error("Caretaker name cannot be empty")]
    EmptyCaretaker,
    #[error("Slot {0} is marked done without a caretaker and timestamp")]
    IncompleteStatus(String),
}

/// Format of a calendar-day identifier (`2024-01-02`)
pub const DATE_ID_FORMAT: &str = "%Y-%m-%d";

/// Canonical identifier of a local calendar day
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateId(NaiveDate);

impl DateId {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }

    pub fn date(&self) -> NaiveDate {
        self.0
    }

    /// The calendar day before this one
    pub fn pred(&self) -> DateId {
        self.0.pred_opt().map(Self).unwrap_or(*self)
    }
}

impl From<NaiveDate> for DateId {
    fn from(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl fmt::Display for DateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DATE_ID_FORMAT))
    }
}

impl FromStr for DateId {
    type Err = FeedingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // chrono accepts unpadded fields; ids are always zero-padded
        if s.len() != 10 {
            return Err(FeedingError::InvalidDate(s.to_string()));
        }
        NaiveDate::parse_from_str(s, DATE_ID_FORMAT)
            .map(Self)
            .map_err(|_| FeedingError::InvalidDate(s.to_string()))
    }
}

/// One of the two daily feeding slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FeedingSlot {
    Morning,
    Evening,
}

impl FeedingSlot {
    pub const ALL: [FeedingSlot; 2] = [FeedingSlot::Morning, FeedingSlot::Evening];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedingSlot::Morning => "morning",
            FeedingSlot::Evening => "evening",
        }
    }
}

impl fmt::Display for FeedingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedingSlot {
    type Err = FeedingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "morning" => Ok(FeedingSlot::Morning),
            "evening" => Ok(FeedingSlot::Evening),
            other => Err(FeedingError::UnknownSlot(other.to_string())),
        }
    }
}

/// Who completed a slot and when
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub caretaker: String,
    /// ISO-8601 timestamp in UTC
    pub timestamp: String,
}

/// Status of a single slot.
///
/// A slot is done exactly when it carries a [`Completion`], so a caretaker
/// and timestamp can never exist on a pending slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedingStatus {
    pub slot: FeedingSlot,
    pub completion: Option<Completion>,
}

impl FeedingStatus {
    pub fn pending(slot: FeedingSlot) -> Self {
        Self {
            slot,
            completion: None,
        }
    }

    pub fn done(slot: FeedingSlot, caretaker: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self {
            slot,
            completion: Some(Completion {
                caretaker: caretaker.into(),
                timestamp: timestamp.into(),
            }),
        }
    }

    pub fn is_done(&self) -> bool {
        self.completion.is_some()
    }

    pub fn caretaker(&self) -> Option<&str> {
        self.completion.as_ref().map(|c| c.caretaker.as_str())
    }

    pub fn timestamp(&self) -> Option<&str> {
        self.completion.as_ref().map(|c| c.timestamp.as_str())
    }
}

/// Feeding state of one calendar day; both slots are always present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedingState {
    date: DateId,
    morning: FeedingStatus,
    evening: FeedingStatus,
}

impl FeedingState {
    /// A state for `date` with both slots pending
    pub fn blank(date: DateId) -> Self {
        Self {
            date,
            morning: FeedingStatus::pending(FeedingSlot::Morning),
            evening: FeedingStatus::pending(FeedingSlot::Evening),
        }
    }

    pub fn date(&self) -> DateId {
        self.date
    }

    pub fn slot(&self, slot: FeedingSlot) -> &FeedingStatus {
        match slot {
            FeedingSlot::Morning => &self.morning,
            FeedingSlot::Evening => &self.evening,
        }
    }

    /// Replace the status of the slot named by `status.slot`
    pub fn set_slot(&mut self, status: FeedingStatus) {
        match status.slot {
            FeedingSlot::Morning => self.morning = status,
            FeedingSlot::Evening => self.evening = status,
        }
    }

    pub fn slots(&self) -> impl Iterator<Item = &FeedingStatus> {
        [&self.morning, &self.evening].into_iter()
    }

    pub fn is_blank(&self) -> bool {
        self.slots().all(|s| !s.is_done())
    }

    /// History records for every completed slot, dated with this state's day
    pub fn completed_records(&self) -> Vec<FeedingRecord> {
        self.slots()
            .filter_map(|status| {
                status.completion.as_ref().map(|c| FeedingRecord {
                    slot: status.slot,
                    caretaker: c.caretaker.clone(),
                    date: self.date,
                    timestamp: c.timestamp.clone(),
                })
            })
            .collect()
    }
}

/// A completed feeding kept in history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedingRecord {
    pub slot: FeedingSlot,
    pub caretaker: String,
    pub date: DateId,
    pub timestamp: String,
}

impl FeedingRecord {
    /// Records are unique on (slot, date, timestamp); the caretaker is not part of the key
    pub fn same_key(&self, other: &FeedingRecord) -> bool {
        self.slot == other.slot && self.date == other.date && self.timestamp == other.timestamp
    }

    pub fn to_status(&self) -> FeedingStatus {
        FeedingStatus::done(self.slot, self.caretaker.clone(), self.timestamp.clone())
    }
}
