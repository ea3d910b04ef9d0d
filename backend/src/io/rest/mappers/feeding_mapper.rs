//! Mappers for converting between feeding domain models and shared DTOs.

use crate::domain::models::{
    DateId, FeedingError, FeedingRecord as DomainFeedingRecord, FeedingSlot as DomainFeedingSlot,
    FeedingState as DomainFeedingState, FeedingStatus as DomainFeedingStatus,
};
use shared::{
    FeedingRecord as SharedFeedingRecord, FeedingSlot as SharedFeedingSlot, FeedingSlots,
    FeedingState as SharedFeedingState, FeedingStatus as SharedFeedingStatus,
};

pub struct FeedingMapper;

impl FeedingMapper {
    pub fn slot_to_dto(slot: DomainFeedingSlot) -> SharedFeedingSlot {
        match slot {
            DomainFeedingSlot::Morning => SharedFeedingSlot::Morning,
            DomainFeedingSlot::Evening => SharedFeedingSlot::Evening,
        }
    }

    pub fn slot_to_domain(slot: SharedFeedingSlot) -> DomainFeedingSlot {
        match slot {
            SharedFeedingSlot::Morning => DomainFeedingSlot::Morning,
            SharedFeedingSlot::Evening => DomainFeedingSlot::Evening,
        }
    }

    pub fn status_to_dto(domain: &DomainFeedingStatus) -> SharedFeedingStatus {
        SharedFeedingStatus {
            slot: Self::slot_to_dto(domain.slot),
            done: domain.is_done(),
            caretaker: domain.caretaker().map(str::to_string),
            timestamp: domain.timestamp().map(str::to_string),
        }
    }

    /// A done status must carry both a caretaker and a timestamp
    pub fn status_to_domain(dto: SharedFeedingStatus) -> Result<DomainFeedingStatus, FeedingError> {
        let slot = Self::slot_to_domain(dto.slot);
        if !dto.done {
            return Ok(DomainFeedingStatus::pending(slot));
        }
        match (dto.caretaker, dto.timestamp) {
            (Some(caretaker), Some(timestamp)) if !caretaker.trim().is_empty() => {
                Ok(DomainFeedingStatus::done(slot, caretaker.trim(), timestamp))
            }
            _ => Err(FeedingError::IncompleteStatus(slot.to_string())),
        }
    }

    pub fn to_dto(domain: &DomainFeedingState) -> SharedFeedingState {
        SharedFeedingState {
            date: domain.date().to_string(),
            slots: FeedingSlots {
                morning: Self::status_to_dto(domain.slot(DomainFeedingSlot::Morning)),
                evening: Self::status_to_dto(domain.slot(DomainFeedingSlot::Evening)),
            },
        }
    }

    pub fn to_domain(dto: SharedFeedingState) -> Result<DomainFeedingState, FeedingError> {
        let date: DateId = dto.date.parse()?;
        let mut state = DomainFeedingState::blank(date);
        // Each status is keyed by the field it sits in, not by its own slot tag
        let mut morning = Self::status_to_domain(dto.slots.morning)?;
        morning.slot = DomainFeedingSlot::Morning;
        let mut evening = Self::status_to_domain(dto.slots.evening)?;
        evening.slot = DomainFeedingSlot::Evening;
        state.set_slot(morning);
        state.set_slot(evening);
        Ok(state)
    }

    pub fn record_to_dto(domain: &DomainFeedingRecord) -> SharedFeedingRecord {
        SharedFeedingRecord {
            slot: Self::slot_to_dto(domain.slot),
            caretaker: domain.caretaker.clone(),
            date: domain.date.to_string(),
            timestamp: domain.timestamp.clone(),
        }
    }
}
