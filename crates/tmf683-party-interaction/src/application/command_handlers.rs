//! Command handlers for the Party Interaction context.
//!
//! Each handler validates its command, performs the mutation through the
//! repository, builds the matching domain event, and publishes it. Nothing
//! is published when validation or the mutation fails.

use tmf683_core::clock::Clock;
use tmf683_core::command::Command;
use tmf683_core::error::DomainError;
use tmf683_core::id::IdGenerator;
use tmf683_event_bus::DomainEventBus;
use tracing::{debug, info};

use crate::domain::aggregates::{PartyInteraction, SYSTEM_ACTOR, validate_description};
use crate::domain::commands::{
    CreatePartyInteraction, DeletePartyInteraction, UpdatePartyInteraction,
};
use crate::domain::events;
use crate::domain::repository::PartyInteractionRepository;

/// Handles the `CreatePartyInteraction` command: builds the record, persists
/// it, and publishes `PartyInteractionCreatedEvent`.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the description is invalid, or
/// `DomainError::Infrastructure` if persistence fails.
pub async fn handle_create_party_interaction(
    command: &CreatePartyInteraction,
    clock: &dyn Clock,
    ids: &dyn IdGenerator,
    repo: &dyn PartyInteractionRepository,
    bus: &DomainEventBus,
) -> Result<PartyInteraction, DomainError> {
    validate_description(&command.description)?;

    let now = clock.now();
    let id = ids.next_id();
    let interaction = PartyInteraction {
        href: PartyInteraction::href_for(&id),
        id,
        description: command.description.clone(),
        interaction_type: command.interaction_type,
        status: command.status,
        interaction_date: command.interaction_date,
        completion_date: None,
        channel_id: Some(ids.next_id()),
        channel_name: command.channel_name,
        involved_parties: command.involved_parties.clone(),
        characteristics: command.characteristics.clone(),
        notes: command.notes.clone(),
        created_by: SYSTEM_ACTOR.to_owned(),
        updated_by: SYSTEM_ACTOR.to_owned(),
        created_at: now,
        updated_at: now,
    };

    repo.create(&interaction).await?;
    info!(
        command = command.command_type(),
        interaction_id = %interaction.id,
        "party interaction created"
    );

    bus.publish(events::interaction_created(
        &interaction,
        command.correlation_id(),
    )?)
    .await;

    Ok(interaction)
}

/// Handles the `UpdatePartyInteraction` command: applies the patch and
/// publishes `PartyInteractionUpdatedEvent` carrying the changes and the
/// values they replaced.
///
/// # Errors
///
/// Returns `DomainError::Validation` if a supplied description is invalid,
/// `DomainError::AggregateNotFound` if no interaction has the id, or
/// `DomainError::Infrastructure` if persistence fails.
pub async fn handle_update_party_interaction(
    command: &UpdatePartyInteraction,
    clock: &dyn Clock,
    repo: &dyn PartyInteractionRepository,
    bus: &DomainEventBus,
) -> Result<PartyInteraction, DomainError> {
    if let Some(description) = &command.patch.description {
        validate_description(description)?;
    }

    let now = clock.now();
    let Some(outcome) = repo
        .update(&command.interaction_id, &command.patch, SYSTEM_ACTOR, now)
        .await?
    else {
        debug!(interaction_id = %command.interaction_id, "update target not found");
        return Err(DomainError::AggregateNotFound(
            command.interaction_id.clone(),
        ));
    };
    info!(
        command = command.command_type(),
        interaction_id = %command.interaction_id,
        "party interaction updated"
    );

    bus.publish(events::interaction_updated(
        &outcome.previous,
        &command.patch,
        now,
        command.correlation_id(),
    )?)
    .await;

    Ok(outcome.current)
}

/// Handles the `DeletePartyInteraction` command: deletes the record and,
/// only once that succeeded, publishes `PartyInteractionDeletedEvent`.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no interaction has the id, or
/// `DomainError::Infrastructure` if persistence fails.
pub async fn handle_delete_party_interaction(
    command: &DeletePartyInteraction,
    clock: &dyn Clock,
    repo: &dyn PartyInteractionRepository,
    bus: &DomainEventBus,
) -> Result<(), DomainError> {
    if !repo.delete(&command.interaction_id).await? {
        debug!(interaction_id = %command.interaction_id, "delete target not found");
        return Err(DomainError::AggregateNotFound(
            command.interaction_id.clone(),
        ));
    }
    info!(
        command = command.command_type(),
        interaction_id = %command.interaction_id,
        "party interaction deleted"
    );

    bus.publish(events::interaction_deleted(
        &command.interaction_id,
        clock.now(),
        command.correlation_id(),
    )?)
    .await;

    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::{Arc, Mutex};

    use chrono::{DateTime, TimeZone, Utc};
    use tmf683_core::error::DomainError;
    use tmf683_core::event::EventType;
    use tmf683_event_bus::{DomainEventBus, EventBusConfig};
    use tmf683_test_support::{FixedClock, RecordingEventLog, SequenceIdGenerator};

    use super::*;
    use crate::domain::aggregates::{
        ChannelName, InteractionStatus, InteractionType, PartyInteractionPatch, PartyRole,
        RelatedParty,
    };
    use crate::domain::events::{PartyInteractionDeleted, PartyInteractionUpdated};
    use crate::domain::repository::UpdateOutcome;

    #[derive(Debug, Default)]
    pub(crate) struct MockRepository {
        records: Mutex<Vec<PartyInteraction>>,
        fail: bool,
    }

    impl MockRepository {
        pub(crate) fn failing() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub(crate) fn records(&self) -> Vec<PartyInteraction> {
            self.records.lock().unwrap().clone()
        }

        fn check(&self) -> Result<(), DomainError> {
            if self.fail {
                Err(DomainError::Infrastructure("connection refused".into()))
            } else {
                Ok(())
            }
        }
    }

    #[async_trait::async_trait]
    impl PartyInteractionRepository for MockRepository {
        async fn create(&self, interaction: &PartyInteraction) -> Result<(), DomainError> {
            self.check()?;
            self.records.lock().unwrap().push(interaction.clone());
            Ok(())
        }

        async fn get(&self, id: &str) -> Result<Option<PartyInteraction>, DomainError> {
            self.check()?;
            Ok(self.records.lock().unwrap().iter().find(|r| r.id == id).cloned())
        }

        async fn list(
            &self,
            offset: u32,
            limit: u32,
        ) -> Result<Vec<PartyInteraction>, DomainError> {
            self.check()?;
            Ok(self
                .records
                .lock()
                .unwrap()
                .iter()
                .skip(offset as usize)
                .take(limit as usize)
                .cloned()
                .collect())
        }

        async fn update(
            &self,
            id: &str,
            patch: &PartyInteractionPatch,
            updated_by: &str,
            updated_at: DateTime<Utc>,
        ) -> Result<Option<UpdateOutcome>, DomainError> {
            self.check()?;
            let mut records = self.records.lock().unwrap();
            let Some(record) = records.iter_mut().find(|r| r.id == id) else {
                return Ok(None);
            };
            let previous = record.clone();
            record.apply_patch(patch, updated_by, updated_at);
            Ok(Some(UpdateOutcome {
                previous,
                current: record.clone(),
            }))
        }

        async fn delete(&self, id: &str) -> Result<bool, DomainError> {
            self.check()?;
            let mut records = self.records.lock().unwrap();
            let before = records.len();
            records.retain(|r| r.id != id);
            Ok(records.len() != before)
        }
    }

    pub(crate) fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap()
    }

    pub(crate) fn test_bus() -> DomainEventBus {
        DomainEventBus::new(
            EventBusConfig::default(),
            Arc::new(RecordingEventLog::new()),
            Arc::new(FixedClock(fixed_now())),
            Arc::new(SequenceIdGenerator::new("evt")),
        )
    }

    pub(crate) fn create_command(description: &str) -> CreatePartyInteraction {
        CreatePartyInteraction {
            correlation_id: "req-1".to_owned(),
            description: description.to_owned(),
            interaction_type: InteractionType::Inbound,
            status: InteractionStatus::Active,
            interaction_date: Utc.with_ymd_and_hms(2026, 1, 14, 16, 30, 0).unwrap(),
            channel_name: ChannelName::Chat,
            involved_parties: vec![RelatedParty {
                id: "cust-1".to_owned(),
                href: None,
                name: "Grace".to_owned(),
                role: PartyRole::Customer,
            }],
            characteristics: Vec::new(),
            notes: None,
        }
    }

    async fn seed(repo: &MockRepository, bus: &DomainEventBus) -> PartyInteraction {
        let ids = SequenceIdGenerator::new("pi");
        let created = handle_create_party_interaction(
            &create_command("billing question"),
            &FixedClock(fixed_now()),
            &ids,
            repo,
            bus,
        )
        .await
        .unwrap();
        bus.clear_history();
        created
    }

    #[tokio::test]
    async fn test_handle_create_persists_record_and_publishes_created_event() {
        // Arrange
        let clock = FixedClock(fixed_now());
        let ids = SequenceIdGenerator::new("pi");
        let repo = MockRepository::default();
        let bus = test_bus();

        // Act
        let created = handle_create_party_interaction(
            &create_command("billing question"),
            &clock,
            &ids,
            &repo,
            &bus,
        )
        .await
        .unwrap();

        // Assert
        assert_eq!(created.id, "pi-1");
        assert_eq!(created.href, "/partyInteraction/pi-1");
        assert_eq!(created.channel_id.as_deref(), Some("pi-2"));
        assert_eq!(created.created_by, "system");
        assert_eq!(created.created_at, fixed_now());
        assert_eq!(repo.records(), vec![created.clone()]);

        let history = bus.history(None);
        assert_eq!(history.len(), 1);
        let event = &history[0];
        assert_eq!(event.event_type, EventType::PartyInteractionCreated);
        assert_eq!(event.aggregate_id, "pi-1");
        assert_eq!(event.version, 1);
        assert_eq!(event.timestamp, fixed_now());
        assert_eq!(event.correlation_id.as_deref(), Some("req-1"));
        let payload: PartyInteraction = serde_json::from_value(event.payload.clone()).unwrap();
        assert_eq!(payload, created);
    }

    #[tokio::test]
    async fn test_handle_create_rejects_empty_description_without_publishing() {
        // Arrange
        let repo = MockRepository::default();
        let bus = test_bus();

        // Act
        let result = handle_create_party_interaction(
            &create_command(""),
            &FixedClock(fixed_now()),
            &SequenceIdGenerator::new("pi"),
            &repo,
            &bus,
        )
        .await;

        // Assert
        match result {
            Err(DomainError::Validation(msg)) => assert_eq!(msg, "description must not be empty"),
            other => panic!("expected Validation, got {other:?}"),
        }
        assert!(repo.records().is_empty());
        assert!(bus.history(None).is_empty());
    }

    #[tokio::test]
    async fn test_handle_create_surfaces_repository_failure_without_publishing() {
        // Arrange
        let repo = MockRepository::failing();
        let bus = test_bus();

        // Act
        let result = handle_create_party_interaction(
            &create_command("billing question"),
            &FixedClock(fixed_now()),
            &SequenceIdGenerator::new("pi"),
            &repo,
            &bus,
        )
        .await;

        // Assert
        assert!(matches!(result, Err(DomainError::Infrastructure(_))));
        assert!(bus.history(None).is_empty());
    }

    #[tokio::test]
    async fn test_handle_update_publishes_changes_and_previous_values() {
        // Arrange
        let repo = MockRepository::default();
        let bus = test_bus();
        let existing = seed(&repo, &bus).await;
        let later = Utc.with_ymd_and_hms(2026, 1, 16, 9, 0, 0).unwrap();
        let command = UpdatePartyInteraction {
            correlation_id: "req-2".to_owned(),
            interaction_id: existing.id.clone(),
            patch: PartyInteractionPatch {
                notes: Some("refund issued".to_owned()),
                ..PartyInteractionPatch::default()
            },
        };

        // Act
        let updated =
            handle_update_party_interaction(&command, &FixedClock(later), &repo, &bus)
                .await
                .unwrap();

        // Assert
        assert_eq!(updated.notes.as_deref(), Some("refund issued"));
        assert_eq!(updated.description, "billing question");
        assert_eq!(updated.updated_at, later);
        assert_eq!(repo.records(), vec![updated.clone()]);

        let history = bus.history(None);
        assert_eq!(history.len(), 1);
        let event = &history[0];
        assert_eq!(event.event_type, EventType::PartyInteractionUpdated);
        assert_eq!(event.version, 2);
        assert_eq!(event.timestamp, later);
        assert_eq!(event.correlation_id.as_deref(), Some("req-2"));

        let payload: PartyInteractionUpdated =
            serde_json::from_value(event.payload.clone()).unwrap();
        assert_eq!(payload.id, existing.id);
        assert_eq!(payload.changes.len(), 1);
        assert_eq!(payload.changes["notes"], "refund issued");
        assert_eq!(payload.previous_values["description"], "billing question");
        assert_eq!(payload.previous_values["type"], "inbound");
        assert_eq!(payload.previous_values["status"], "active");
        assert_eq!(payload.previous_values["notes"], serde_json::Value::Null);
        assert_eq!(payload.previous_values.len(), 4);
    }

    #[tokio::test]
    async fn test_handle_update_missing_interaction_returns_not_found_without_publishing() {
        // Arrange
        let repo = MockRepository::default();
        let bus = test_bus();
        let command = UpdatePartyInteraction {
            correlation_id: "req-2".to_owned(),
            interaction_id: "missing".to_owned(),
            patch: PartyInteractionPatch {
                notes: Some("n/a".to_owned()),
                ..PartyInteractionPatch::default()
            },
        };

        // Act
        let result =
            handle_update_party_interaction(&command, &FixedClock(fixed_now()), &repo, &bus).await;

        // Assert
        match result {
            Err(DomainError::AggregateNotFound(id)) => assert_eq!(id, "missing"),
            other => panic!("expected AggregateNotFound, got {other:?}"),
        }
        assert!(bus.history(None).is_empty());
    }

    #[tokio::test]
    async fn test_handle_update_rejects_overlong_description_before_mutating() {
        // Arrange
        let repo = MockRepository::default();
        let bus = test_bus();
        let existing = seed(&repo, &bus).await;
        let command = UpdatePartyInteraction {
            correlation_id: "req-2".to_owned(),
            interaction_id: existing.id.clone(),
            patch: PartyInteractionPatch {
                description: Some("x".repeat(1001)),
                ..PartyInteractionPatch::default()
            },
        };

        // Act
        let result =
            handle_update_party_interaction(&command, &FixedClock(fixed_now()), &repo, &bus).await;

        // Assert
        assert!(matches!(result, Err(DomainError::Validation(_))));
        assert_eq!(repo.records(), vec![existing]);
        assert!(bus.history(None).is_empty());
    }

    #[tokio::test]
    async fn test_handle_delete_publishes_deleted_event_after_removal() {
        // Arrange
        let repo = MockRepository::default();
        let bus = test_bus();
        let existing = seed(&repo, &bus).await;
        let deleted_at = Utc.with_ymd_and_hms(2026, 1, 17, 12, 0, 0).unwrap();
        let command = DeletePartyInteraction {
            correlation_id: "req-3".to_owned(),
            interaction_id: existing.id.clone(),
        };

        // Act
        handle_delete_party_interaction(&command, &FixedClock(deleted_at), &repo, &bus)
            .await
            .unwrap();

        // Assert
        assert!(repo.records().is_empty());
        let history = bus.history(None);
        assert_eq!(history.len(), 1);
        let event = &history[0];
        assert_eq!(event.event_type, EventType::PartyInteractionDeleted);
        assert_eq!(event.aggregate_id, existing.id);
        assert_eq!(event.version, 3);

        let payload: PartyInteractionDeleted =
            serde_json::from_value(event.payload.clone()).unwrap();
        assert_eq!(payload.id, existing.id);
        assert_eq!(payload.deleted_at, deleted_at);
    }

    #[tokio::test]
    async fn test_handle_delete_missing_interaction_returns_not_found_without_publishing() {
        // Arrange
        let repo = MockRepository::default();
        let bus = test_bus();
        let command = DeletePartyInteraction {
            correlation_id: "req-3".to_owned(),
            interaction_id: "missing".to_owned(),
        };

        // Act
        let result =
            handle_delete_party_interaction(&command, &FixedClock(fixed_now()), &repo, &bus).await;

        // Assert
        assert!(matches!(result, Err(DomainError::AggregateNotFound(_))));
        assert!(bus.history(None).is_empty());
    }
}
