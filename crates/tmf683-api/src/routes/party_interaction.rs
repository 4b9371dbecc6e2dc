//! Routes for the Party Interaction resource (TMF683).

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

use tmf683_party_interaction::application::query_handlers::{
    self, DEFAULT_PAGE_LIMIT, PartyInteractionPage,
};
use tmf683_party_interaction::application::command_handlers;
use tmf683_party_interaction::domain::aggregates::{
    ChannelName, Characteristic, InteractionStatus, InteractionType, PartyInteraction,
    PartyInteractionPatch, RelatedParty,
};
use tmf683_party_interaction::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for POST /partyInteraction.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePartyInteractionRequest {
    /// What the interaction was about.
    pub description: String,
    /// Direction of the interaction.
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    /// Initial status, `active` when omitted.
    #[serde(default)]
    pub status: InteractionStatus,
    /// When the interaction happened.
    pub interaction_date: DateTime<Utc>,
    /// Channel kind.
    pub channel_name: ChannelName,
    /// Parties involved.
    pub involved_parties: Vec<RelatedParty>,
    /// Additional attributes.
    #[serde(default)]
    pub characteristics: Vec<Characteristic>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Query string for GET /partyInteraction.
#[derive(Debug, Deserialize)]
pub struct ListParams {
    /// Records to skip.
    pub offset: Option<u32>,
    /// Page size.
    pub limit: Option<u32>,
}

/// Response body for DELETE /partyInteraction/{id}.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    /// Always `true`; failures are reported as errors.
    pub success: bool,
}

/// POST /partyInteraction
#[instrument(skip(state, request))]
async fn create_party_interaction(
    State(state): State<AppState>,
    Json(request): Json<CreatePartyInteractionRequest>,
) -> Result<(StatusCode, Json<PartyInteraction>), ApiError> {
    let command = commands::CreatePartyInteraction {
        correlation_id: state.ids.next_id(),
        description: request.description,
        interaction_type: request.interaction_type,
        status: request.status,
        interaction_date: request.interaction_date,
        channel_name: request.channel_name,
        involved_parties: request.involved_parties,
        characteristics: request.characteristics,
        notes: request.notes,
    };

    info!(correlation_id = %command.correlation_id, "handling create_party_interaction command");

    let interaction = command_handlers::handle_create_party_interaction(
        &command,
        state.clock.as_ref(),
        state.ids.as_ref(),
        state.interactions.as_ref(),
        &state.event_bus,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(interaction)))
}

/// GET /partyInteraction
#[instrument(skip(state))]
async fn list_party_interactions(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PartyInteractionPage>, ApiError> {
    let page = query_handlers::list_party_interactions(
        params.offset.unwrap_or(0),
        params.limit.unwrap_or(DEFAULT_PAGE_LIMIT),
        state.interactions.as_ref(),
    )
    .await?;
    Ok(Json(page))
}

/// GET /partyInteraction/{id}
#[instrument(skip(state))]
async fn get_party_interaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PartyInteraction>, ApiError> {
    let interaction =
        query_handlers::get_party_interaction_by_id(&id, state.interactions.as_ref()).await?;
    Ok(Json(interaction))
}

/// PATCH /partyInteraction/{id}
#[instrument(skip(state, patch))]
async fn update_party_interaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(patch): Json<PartyInteractionPatch>,
) -> Result<Json<PartyInteraction>, ApiError> {
    let command = commands::UpdatePartyInteraction {
        correlation_id: state.ids.next_id(),
        interaction_id: id,
        patch,
    };

    info!(correlation_id = %command.correlation_id, "handling update_party_interaction command");

    let interaction = command_handlers::handle_update_party_interaction(
        &command,
        state.clock.as_ref(),
        state.interactions.as_ref(),
        &state.event_bus,
    )
    .await?;

    Ok(Json(interaction))
}

/// DELETE /partyInteraction/{id}
#[instrument(skip(state))]
async fn delete_party_interaction(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let command = commands::DeletePartyInteraction {
        correlation_id: state.ids.next_id(),
        interaction_id: id,
    };

    info!(correlation_id = %command.correlation_id, "handling delete_party_interaction command");

    command_handlers::handle_delete_party_interaction(
        &command,
        state.clock.as_ref(),
        state.interactions.as_ref(),
        &state.event_bus,
    )
    .await?;

    Ok(Json(DeleteResponse { success: true }))
}

/// Returns the router for the party interaction resource.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(list_party_interactions).post(create_party_interaction),
        )
        .route(
            "/{id}",
            get(get_party_interaction)
                .patch(update_party_interaction)
                .delete(delete_party_interaction),
        )
}
