use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the two daily feeding slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedingSlot {
    Morning,
    Evening,
}

impl fmt::Display for FeedingSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FeedingSlot::Morning => write!(f, "morning"),
            FeedingSlot::Evening => write!(f, "evening"),
        }
    }
}

/// Completion status of a single slot as seen by clients
///
/// `caretaker` and `timestamp` are only present when `done` is true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingStatus {
    pub slot: FeedingSlot,
    pub done: bool,
    /// Name of the caretaker who completed the slot
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caretaker: Option<String>,
    /// Completion time (ISO-8601, UTC)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

/// Both slots of a day, always present
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingSlots {
    pub morning: FeedingStatus,
    pub evening: FeedingStatus,
}

/// The feeding state for one calendar day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingState {
    /// Local calendar day in `YYYY-MM-DD` format
    pub date: String,
    pub slots: FeedingSlots,
}

/// A historical completion event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingRecord {
    pub slot: FeedingSlot,
    pub caretaker: String,
    /// Local calendar day the slot belonged to (`YYYY-MM-DD`)
    pub date: String,
    /// Completion time (ISO-8601, UTC)
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedingStateResponse {
    pub state: FeedingState,
    /// Local hour at which a previous day's state is archived and cleared
    pub reset_hour: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompleteSlotRequest {
    pub caretaker: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryResponse {
    /// Records ordered newest first
    pub records: Vec<FeedingRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaretakerListResponse {
    pub caretakers: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_status_omits_completion_fields() {
        let status = FeedingStatus {
            slot: FeedingSlot::Morning,
            done: false,
            caretaker: None,
            timestamp: None,
        };

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json, serde_json::json!({ "slot": "morning", "done": false }));
    }

    #[test]
    fn test_status_deserializes_without_optional_fields() {
        let status: FeedingStatus =
            serde_json::from_str(r#"{"slot":"evening","done":false}"#).unwrap();
        assert_eq!(status.slot, FeedingSlot::Evening);
        assert!(status.caretaker.is_none());
        assert!(status.timestamp.is_none());
    }

    #[test]
    fn test_slot_display_matches_wire_name() {
        assert_eq!(FeedingSlot::Morning.to_string(), "morning");
        assert_eq!(FeedingSlot::Evening.to_string(), "evening");
    }
}
