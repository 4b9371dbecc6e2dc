//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tmf683_core::event_log::EventLogStore;
use tmf683_event_bus::{DomainEventBus, EventBusConfig};
use tmf683_party_interaction::application::listeners::register_event_listeners;
use tmf683_party_interaction::domain::repository::PartyInteractionRepository;
use tmf683_store::{
    InMemoryEventLog, InMemoryPartyInteractionRepository, PgEventLog,
    PgPartyInteractionRepository,
};
use tmf683_test_support::{FixedClock, SequenceIdGenerator};
use tower::ServiceExt;

use tmf683_api::state::AppState;

/// Builds application state over the given stores with a fixed clock,
/// sequential ids and the logging listeners registered.
pub fn build_state(
    interactions: Arc<dyn PartyInteractionRepository>,
    event_log: Arc<dyn EventLogStore>,
) -> AppState {
    let clock = Arc::new(FixedClock::standard());
    let event_bus = Arc::new(DomainEventBus::new(
        EventBusConfig::default(),
        event_log.clone(),
        clock.clone(),
        Arc::new(SequenceIdGenerator::new("evt")),
    ));
    register_event_listeners(&event_bus);
    AppState::new(
        clock,
        Arc::new(SequenceIdGenerator::new("id")),
        interactions,
        event_log,
        event_bus,
    )
}

/// State backed by the in-memory stores.
pub fn in_memory_state() -> AppState {
    build_state(
        Arc::new(InMemoryPartyInteractionRepository::new()),
        Arc::new(InMemoryEventLog::new()),
    )
}

/// State backed by PostgreSQL.
pub fn pg_state(pool: PgPool) -> AppState {
    build_state(
        Arc::new(PgPartyInteractionRepository::new(pool.clone())),
        Arc::new(PgEventLog::new(pool)),
    )
}

/// Build the full app router. Uses the same route structure as `main.rs`.
pub fn build_test_app(state: &AppState) -> Router {
    tmf683_api::router(state.clone())
}

/// Sample create request body.
pub fn create_body(description: &str) -> serde_json::Value {
    serde_json::json!({
        "description": description,
        "type": "inbound",
        "status": "pending",
        "interactionDate": "2026-01-14T16:30:00Z",
        "channelName": "in-person",
        "involvedParties": [
            { "id": "cust-9", "name": "Ada", "role": "customer" },
            { "id": "agent-7", "href": "/party/agent-7", "name": "Grace", "role": "agent" }
        ],
        "characteristics": [{ "name": "priority", "value": "high" }],
        "notes": "walk-in"
    })
}

/// Send a request with an optional JSON body and return the response.
pub async fn send_json(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    // Extractor rejections answer with plain text.
    let json = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send_json(app, "POST", uri, Some(body)).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send_json(app, "GET", uri, None).await
}
