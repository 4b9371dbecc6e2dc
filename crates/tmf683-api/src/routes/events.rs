//! Routes for inspecting the domain event bus and the event log.

use axum::extract::{Path, Query, State};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use tmf683_core::error::DomainError;
use tmf683_core::event::{DomainEvent, EventType};
use tmf683_core::event_log::EventLogRecord;
use tmf683_event_bus::BusStats;

use crate::error::ApiError;
use crate::state::AppState;

/// Query string for GET /events/history.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryParams {
    /// Restrict the snapshot to one event type.
    pub event_type: Option<String>,
}

/// Response body for POST /events/{id}/processed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessedResponse {
    /// The event that was marked.
    pub id: String,
    /// When it was marked.
    pub processed_at: DateTime<Utc>,
}

/// GET /events/history
#[instrument(skip(state))]
async fn history(
    State(state): State<AppState>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Vec<DomainEvent>>, ApiError> {
    let filter = params
        .event_type
        .as_deref()
        .map(str::parse::<EventType>)
        .transpose()?;

    let events = state
        .event_bus
        .history(filter)
        .iter()
        .map(|event| DomainEvent::clone(event))
        .collect();
    Ok(Json(events))
}

/// GET /events/stats
#[instrument(skip(state))]
async fn stats(State(state): State<AppState>) -> Json<BusStats> {
    Json(state.event_bus.stats())
}

/// GET /events/unprocessed
#[instrument(skip(state))]
async fn unprocessed(State(state): State<AppState>) -> Result<Json<Vec<EventLogRecord>>, ApiError> {
    Ok(Json(state.event_log.list_unprocessed().await?))
}

/// POST /events/{id}/processed
#[instrument(skip(state))]
async fn mark_processed(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ProcessedResponse>, ApiError> {
    let processed_at = state.clock.now();
    if !state.event_log.mark_processed(&id, processed_at).await? {
        return Err(DomainError::AggregateNotFound(id).into());
    }

    info!(event_id = %id, "event marked processed");

    Ok(Json(ProcessedResponse { id, processed_at }))
}

/// Returns the router for event inspection.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/history", get(history))
        .route("/stats", get(stats))
        .route("/unprocessed", get(unprocessed))
        .route("/{id}/processed", post(mark_processed))
}
