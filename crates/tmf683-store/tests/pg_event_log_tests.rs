//! Integration tests for `PgEventLog`.
//!
//! Run with `DATABASE_URL` pointing at a scratch database and `--ignored`.

use chrono::{TimeZone, Utc};
use sqlx::PgPool;
use tmf683_core::event_log::{EventLogRecord, EventLogStore};
use tmf683_store::PgEventLog;

fn make_record(id: &str, minute: u32) -> EventLogRecord {
    EventLogRecord {
        id: id.to_owned(),
        event_type: "PartyInteractionCreatedEvent".to_owned(),
        aggregate_id: "pi-1".to_owned(),
        aggregate_type: "PartyInteraction".to_owned(),
        payload: serde_json::json!({ "id": "pi-1", "description": "billing question" }),
        version: 1,
        timestamp: Utc.with_ymd_and_hms(2026, 1, 15, 10, minute, 0).unwrap(),
        correlation_id: Some("req-1".to_owned()),
        causation_id: None,
        processed: false,
        processed_at: None,
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_append_and_list_unprocessed_round_trip(pool: PgPool) {
    let log = PgEventLog::new(pool);
    let record = make_record("evt-1", 0);

    log.append(&record).await.unwrap();

    let pending = log.list_unprocessed().await.unwrap();
    assert_eq!(pending, vec![record]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_list_unprocessed_is_oldest_first(pool: PgPool) {
    let log = PgEventLog::new(pool);
    log.append(&make_record("evt-late", 5)).await.unwrap();
    log.append(&make_record("evt-early", 1)).await.unwrap();

    let ids: Vec<String> = log
        .list_unprocessed()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();

    assert_eq!(ids, vec!["evt-early", "evt-late"]);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_mark_processed_removes_record_from_pending(pool: PgPool) {
    let log = PgEventLog::new(pool);
    log.append(&make_record("evt-1", 0)).await.unwrap();
    let processed_at = Utc.with_ymd_and_hms(2026, 1, 15, 11, 0, 0).unwrap();

    let marked = log.mark_processed("evt-1", processed_at).await.unwrap();

    assert!(marked);
    assert!(log.list_unprocessed().await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_mark_processed_unknown_id_returns_false(pool: PgPool) {
    let log = PgEventLog::new(pool);

    let marked = log.mark_processed("missing", Utc::now()).await.unwrap();

    assert!(!marked);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_duplicate_id_is_rejected(pool: PgPool) {
    let log = PgEventLog::new(pool);
    log.append(&make_record("evt-1", 0)).await.unwrap();

    let result = log.append(&make_record("evt-1", 1)).await;

    assert!(result.is_err());
}
