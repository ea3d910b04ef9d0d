//! # REST API for Feeding State
//!
//! Endpoints for the day's feeding state, slot completion, manual reset,
//! history and the caretaker roster. Reconciliation never fails, so only
//! caller mistakes (an unknown slot, a blank caretaker, a malformed state)
//! produce an error status.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use tracing::{info, warn};

use crate::domain::models::{FeedingError, FeedingSlot, FeedingState};
use crate::io::rest::mappers::feeding_mapper::FeedingMapper;
use crate::AppState;
use shared::{
    CaretakerListResponse, CompleteSlotRequest, FeedingState as SharedFeedingState, FeedingStateResponse,
    HistoryResponse,
};

/// Create a router for feeding related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/state", get(get_state).put(put_state))
        .route("/slots/:slot/complete", post(complete_slot))
        .route("/slots/:slot", delete(uncomplete_slot))
        .route("/reset", post(manual_reset))
        .route("/history", get(get_history))
        .route("/caretakers", get(get_caretakers))
}

fn state_response(state: &AppState, feeding_state: &FeedingState) -> Response {
    let response = FeedingStateResponse {
        state: FeedingMapper::to_dto(feeding_state),
        reset_hour: state.feeding_service.reset_hour(),
    };
    (StatusCode::OK, Json(response)).into_response()
}

fn bad_request(e: FeedingError) -> Response {
    warn!("Rejected feeding request: {}", e);
    (StatusCode::BAD_REQUEST, e.to_string()).into_response()
}

/// Get the reconciled state for today
pub async fn get_state(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/feeding/state");

    let feeding_state = state.feeding_service.load_state().await;
    state_response(&state, &feeding_state)
}

/// Replace a day's stored state
pub async fn put_state(
    State(state): State<AppState>,
    Json(request): Json<SharedFeedingState>,
) -> impl IntoResponse {
    info!("PUT /api/feeding/state - date: {}", request.date);

    match FeedingMapper::to_domain(request) {
        Ok(feeding_state) => {
            state.feeding_service.save_state(&feeding_state).await;
            state_response(&state, &feeding_state)
        }
        Err(e) => bad_request(e),
    }
}

/// Mark a slot done for the current state
pub async fn complete_slot(
    State(state): State<AppState>,
    Path(slot): Path<String>,
    Json(request): Json<CompleteSlotRequest>,
) -> impl IntoResponse {
    info!("POST /api/feeding/slots/{}/complete - caretaker: {}", slot, request.caretaker);

    let slot: FeedingSlot = match slot.parse() {
        Ok(slot) => slot,
        Err(e) => return bad_request(e),
    };

    let current = state.feeding_service.load_state().await;
    match state.feeding_service.mark_slot(&current, slot, &request.caretaker).await {
        Ok(updated) => state_response(&state, &updated),
        Err(e) => bad_request(e),
    }
}

/// Undo a slot completion for the current state
pub async fn uncomplete_slot(State(state): State<AppState>, Path(slot): Path<String>) -> impl IntoResponse {
    info!("DELETE /api/feeding/slots/{}", slot);

    let slot: FeedingSlot = match slot.parse() {
        Ok(slot) => slot,
        Err(e) => return bad_request(e),
    };

    let current = state.feeding_service.load_state().await;
    let updated = state.feeding_service.unmark_slot(&current, slot).await;
    state_response(&state, &updated)
}

/// Clear today's progress without archiving it
pub async fn manual_reset(State(state): State<AppState>) -> impl IntoResponse {
    info!("POST /api/feeding/reset");

    let blank = state.feeding_service.manual_reset().await;
    state_response(&state, &blank)
}

pub async fn get_history(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/feeding/history");

    let records = state
        .feeding_service
        .history()
        .await
        .iter()
        .map(FeedingMapper::record_to_dto)
        .collect();
    (StatusCode::OK, Json(HistoryResponse { records }))
}

pub async fn get_caretakers(State(state): State<AppState>) -> impl IntoResponse {
    info!("GET /api/feeding/caretakers");

    let caretakers = state.feeding_service.caretakers().to_vec();
    (StatusCode::OK, Json(CaretakerListResponse { caretakers }))
}
