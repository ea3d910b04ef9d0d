//! Persisted shapes of feeding state and history rows.
//!
//! Storage backends read and write these rows verbatim. Every field is
//! tolerant on read so a partially written or hand-edited row still loads;
//! turning a row back into a domain value decides what to keep.
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::models::feeding::{DateId, FeedingRecord, FeedingSlot, FeedingState, FeedingStatus};
use crate::storage::StoreError;

/// Flat slot status as persisted: `{slot, done, caretaker?, timestamp?}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredStatus {
    #[serde(default)]
    pub slot: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caretaker: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl StoredStatus {
    fn from_status(status: &FeedingStatus) -> Self {
        Self {
            slot: Some(status.slot.as_str().to_string()),
            done: status.is_done(),
            caretaker: status.caretaker().map(str::to_string),
            timestamp: status.timestamp().map(str::to_string),
        }
    }

    /// Decode into a domain status for `slot`.
    ///
    /// A `done` flag without both caretaker and timestamp cannot be
    /// represented and loads as pending.
    fn to_status(&self, slot: FeedingSlot, date: &str) -> FeedingStatus {
        if !self.done {
            return FeedingStatus::pending(slot);
        }
        match (&self.caretaker, &self.timestamp) {
            (Some(caretaker), Some(timestamp)) => FeedingStatus::done(slot, caretaker, timestamp),
            _ => {
                warn!("Stored {} slot for {} is done but incomplete, loading as pending", slot, date);
                FeedingStatus::pending(slot)
            }
        }
    }
}

/// Both slots as persisted; a missing key loads as a pending slot
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredSlots {
    #[serde(default)]
    pub morning: Option<StoredStatus>,
    #[serde(default)]
    pub evening: Option<StoredStatus>,
}

/// One day's state row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFeedingState {
    pub date: String,
    #[serde(default)]
    pub slots: StoredSlots,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
}

impl StoredFeedingState {
    pub fn from_state(state: &FeedingState, updated_at: String, owner: Option<String>) -> Self {
        Self {
            date: state.date().to_string(),
            slots: StoredSlots {
                morning: Some(StoredStatus::from_status(state.slot(FeedingSlot::Morning))),
                evening: Some(StoredStatus::from_status(state.slot(FeedingSlot::Evening))),
            },
            updated_at,
            owner,
        }
    }

    /// Decode into a domain state; only an unreadable date rejects the row
    pub fn to_state(&self) -> Result<FeedingState, StoreError> {
        let date: DateId = self
            .date
            .parse()
            .map_err(|_| StoreError::Malformed(format!("state row has invalid date '{}'", self.date)))?;

        let mut state = FeedingState::blank(date);
        for slot in FeedingSlot::ALL {
            let stored = match slot {
                FeedingSlot::Morning => self.slots.morning.as_ref(),
                FeedingSlot::Evening => self.slots.evening.as_ref(),
            };
            match stored {
                Some(stored) => state.set_slot(stored.to_status(slot, &self.date)),
                None => warn!("Stored state for {} is missing the {} slot", self.date, slot),
            }
        }
        Ok(state)
    }
}

/// One history row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredFeedingRecord {
    pub id: String,
    pub slot: String,
    pub caretaker: String,
    pub date: String,
    pub timestamp: String,
    pub created_at: String,
    #[serde(default)]
    pub owner: Option<String>,
}

impl StoredFeedingRecord {
    pub fn from_record(record: &FeedingRecord, id: String, created_at: String, owner: Option<String>) -> Self {
        Self {
            id,
            slot: record.slot.as_str().to_string(),
            caretaker: record.caretaker.clone(),
            date: record.date.to_string(),
            timestamp: record.timestamp.clone(),
            created_at,
            owner,
        }
    }

    pub fn to_record(&self) -> Result<FeedingRecord, StoreError> {
        let slot: FeedingSlot = self
            .slot
            .parse()
            .map_err(|_| StoreError::Malformed(format!("history row {} has unknown slot '{}'", self.id, self.slot)))?;
        let date: DateId = self
            .date
            .parse()
            .map_err(|_| StoreError::Malformed(format!("history row {} has invalid date '{}'", self.id, self.date)))?;

        Ok(FeedingRecord {
            slot,
            caretaker: self.caretaker.clone(),
            date,
            timestamp: self.timestamp.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_survives_storage_shape() {
        let mut state = FeedingState::blank("2024-01-01".parse().unwrap());
        state.set_slot(FeedingStatus::done(FeedingSlot::Morning, "Garnet", "2024-01-01T07:10:00.000Z"));

        let stored = StoredFeedingState::from_state(&state, "2024-01-01T07:10:00.000Z".to_string(), None);
        assert_eq!(stored.date, "2024-01-01");
        assert_eq!(stored.to_state().unwrap(), state);
    }

    #[test]
    fn test_missing_slot_keys_load_as_pending() {
        let stored: StoredFeedingState =
            serde_json::from_str(r#"{"date":"2024-01-01","slots":{"evening":{"slot":"evening","done":true,"caretaker":"Yose","timestamp":"t1"}}}"#)
                .unwrap();

        let state = stored.to_state().unwrap();
        assert!(!state.slot(FeedingSlot::Morning).is_done());
        assert_eq!(state.slot(FeedingSlot::Evening).caretaker(), Some("Yose"));
    }

    #[test]
    fn test_missing_slots_object_loads_blank() {
        let stored: StoredFeedingState = serde_json::from_str(r#"{"date":"2024-01-01"}"#).unwrap();
        assert!(stored.to_state().unwrap().is_blank());
    }

    #[test]
    fn test_done_without_caretaker_loads_as_pending() {
        let stored: StoredFeedingState =
            serde_json::from_str(r#"{"date":"2024-01-01","slots":{"morning":{"slot":"morning","done":true}}}"#)
                .unwrap();
        assert!(!stored.to_state().unwrap().slot(FeedingSlot::Morning).is_done());
    }

    #[test]
    fn test_invalid_date_is_malformed() {
        let stored: StoredFeedingState = serde_json::from_str(r#"{"date":"01/02/2024"}"#).unwrap();
        assert!(matches!(stored.to_state(), Err(StoreError::Malformed(_))));
    }

    #[test]
    fn test_record_with_unknown_slot_is_malformed() {
        let stored = StoredFeedingRecord {
            id: "r1".to_string(),
            slot: "lunch".to_string(),
            caretaker: "Dani".to_string(),
            date: "2024-01-01".to_string(),
            timestamp: "t".to_string(),
            created_at: "t".to_string(),
            owner: None,
        };
        assert!(matches!(stored.to_record(), Err(StoreError::Malformed(_))));
    }
}
