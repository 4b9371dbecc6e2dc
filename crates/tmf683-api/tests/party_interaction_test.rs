//! Integration tests for the Party Interaction resource and its events.

mod common;

use axum::http::StatusCode;
use sqlx::PgPool;
use tmf683_api::state::AppState;
use tmf683_core::event::EventType;

async fn run_lifecycle(state: &AppState) {
    // POST /api/v1/partyInteraction
    let (status, created) = common::post_json(
        common::build_test_app(state),
        "/api/v1/partyInteraction",
        &common::create_body("store visit about a broken router"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = created["id"].as_str().unwrap().to_owned();
    assert_eq!(created["href"], format!("/partyInteraction/{id}"));
    assert_eq!(created["type"], "inbound");
    assert_eq!(created["status"], "pending");
    assert_eq!(created["channelName"], "in-person");
    assert_eq!(created["involvedParties"][1]["href"], "/party/agent-7");
    assert_eq!(created["characteristics"][0]["value"], "high");
    assert!(created["channelId"].is_string());

    // GET /api/v1/partyInteraction/{id}
    let (status, fetched) = common::get_json(
        common::build_test_app(state),
        &format!("/api/v1/partyInteraction/{id}"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, created);

    // PATCH /api/v1/partyInteraction/{id}
    let (status, updated) = common::send_json(
        common::build_test_app(state),
        "PATCH",
        &format!("/api/v1/partyInteraction/{id}"),
        Some(&serde_json::json!({
            "description": "router replaced",
            "status": "completed"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["description"], "router replaced");
    assert_eq!(updated["status"], "completed");
    assert_eq!(updated["notes"], "walk-in");

    // GET /api/v1/partyInteraction
    let (status, page) = common::get_json(
        common::build_test_app(state),
        "/api/v1/partyInteraction?offset=0&limit=10",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["limit"], 10);
    assert_eq!(page["data"].as_array().unwrap().len(), 1);

    // DELETE /api/v1/partyInteraction/{id}
    let (status, deleted) = common::send_json(
        common::build_test_app(state),
        "DELETE",
        &format!("/api/v1/partyInteraction/{id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deleted["success"], true);

    // GET /api/v1/events/history
    let (status, history) =
        common::get_json(common::build_test_app(state), "/api/v1/events/history").await;
    assert_eq!(status, StatusCode::OK);
    let history = history.as_array().unwrap();
    let summary: Vec<(&str, i64)> = history
        .iter()
        .map(|event| {
            (
                event["eventType"].as_str().unwrap(),
                event["version"].as_i64().unwrap(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("PartyInteractionCreatedEvent", 1),
            ("PartyInteractionUpdatedEvent", 2),
            ("PartyInteractionDeletedEvent", 3),
        ]
    );
    for event in history {
        assert_eq!(event["aggregateId"], id.as_str());
        assert_eq!(event["aggregateType"], "PartyInteraction");
        assert!(event["correlationId"].is_string());
    }
    assert_eq!(history[1]["payload"]["changes"]["status"], "completed");
    assert_eq!(history[1]["payload"]["previousValues"]["status"], "pending");
    assert_eq!(
        history[1]["payload"]["previousValues"]["description"],
        "store visit about a broken router"
    );
    assert_eq!(history[2]["payload"]["deletedAt"], "2026-01-15T10:00:00Z");

    // GET /api/v1/events/unprocessed
    let (status, pending) =
        common::get_json(common::build_test_app(state), "/api/v1/events/unprocessed").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending.as_array().unwrap().len(), 3);

    state.event_bus.wait_for_dispatches().await;
    assert_eq!(state.event_bus.pending_dispatches(), 0);
}

#[tokio::test]
async fn test_party_interaction_lifecycle_in_memory() {
    let state = common::in_memory_state();

    run_lifecycle(&state).await;
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_party_interaction_lifecycle_postgres(pool: PgPool) {
    let state = common::pg_state(pool);

    run_lifecycle(&state).await;
}

#[tokio::test]
async fn test_get_nonexistent_returns_404() {
    let state = common::in_memory_state();

    let (status, json) = common::get_json(
        common::build_test_app(&state),
        "/api/v1/partyInteraction/does-not-exist",
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "aggregate_not_found");
}

#[tokio::test]
async fn test_overlong_description_is_rejected_without_events() {
    let state = common::in_memory_state();
    let description = "x".repeat(1001);

    let (status, json) = common::post_json(
        common::build_test_app(&state),
        "/api/v1/partyInteraction",
        &common::create_body(&description),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"], "validation_error");
    assert!(state.event_bus.history(None).is_empty());
}

#[tokio::test]
async fn test_patch_drops_unknown_fields() {
    let state = common::in_memory_state();
    let (_, created) = common::post_json(
        common::build_test_app(&state),
        "/api/v1/partyInteraction",
        &common::create_body("billing question"),
    )
    .await;
    let id = created["id"].as_str().unwrap();

    let (status, updated) = common::send_json(
        common::build_test_app(&state),
        "PATCH",
        &format!("/api/v1/partyInteraction/{id}"),
        Some(&serde_json::json!({ "createdBy": "mallory", "notes": "follow up" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["createdBy"], "system");
    assert_eq!(updated["notes"], "follow up");
    let history = state
        .event_bus
        .history(Some(EventType::PartyInteractionUpdated));
    assert_eq!(
        history[0].payload["changes"],
        serde_json::json!({ "notes": "follow up" })
    );
}

#[tokio::test]
async fn test_create_without_involved_parties_is_rejected() {
    let state = common::in_memory_state();
    let mut body = common::create_body("billing question");
    body.as_object_mut().unwrap().remove("involvedParties");

    let (status, _) = common::post_json(
        common::build_test_app(&state),
        "/api/v1/partyInteraction",
        &body,
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(state.event_bus.history(None).is_empty());
}

#[tokio::test]
async fn test_event_stats_reflect_registered_listeners() {
    let state = common::in_memory_state();

    let (status, json) =
        common::get_json(common::build_test_app(&state), "/api/v1/events/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["totalHistory"], 0);
    assert_eq!(
        json["registeredEventTypes"],
        serde_json::json!([
            "PartyInteractionCreatedEvent",
            "PartyInteractionUpdatedEvent",
            "PartyInteractionDeletedEvent"
        ])
    );
}
