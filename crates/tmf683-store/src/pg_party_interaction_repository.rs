//! `PostgreSQL` implementation of the `PartyInteractionRepository` trait.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use tmf683_core::error::DomainError;
use tmf683_party_interaction::domain::aggregates::{
    Characteristic, PartyInteraction, PartyInteractionPatch, RelatedParty,
};
use tmf683_party_interaction::domain::repository::{PartyInteractionRepository, UpdateOutcome};

use crate::infrastructure;

/// PostgreSQL-backed repository over the `party_interactions` table.
#[derive(Debug, Clone)]
pub struct PgPartyInteractionRepository {
    pool: PgPool,
}

impl PgPartyInteractionRepository {
    /// Creates a new `PgPartyInteractionRepository`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PartyInteractionRow {
    id: String,
    href: String,
    description: String,
    interaction_type: String,
    status: String,
    interaction_date: DateTime<Utc>,
    completion_date: Option<DateTime<Utc>>,
    channel_id: Option<String>,
    channel_name: String,
    involved_parties: Json<Vec<RelatedParty>>,
    characteristics: Json<Vec<Characteristic>>,
    notes: Option<String>,
    created_by: String,
    updated_by: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PartyInteractionRow> for PartyInteraction {
    type Error = DomainError;

    fn try_from(row: PartyInteractionRow) -> Result<Self, Self::Error> {
        let corrupt =
            |err: DomainError| DomainError::Infrastructure(format!("row {}: {err}", row.id));
        Ok(Self {
            interaction_type: row.interaction_type.parse().map_err(corrupt)?,
            status: row.status.parse().map_err(corrupt)?,
            channel_name: row.channel_name.parse().map_err(corrupt)?,
            id: row.id,
            href: row.href,
            description: row.description,
            interaction_date: row.interaction_date,
            completion_date: row.completion_date,
            channel_id: row.channel_id,
            involved_parties: row.involved_parties.0,
            characteristics: row.characteristics.0,
            notes: row.notes,
            created_by: row.created_by,
            updated_by: row.updated_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl PartyInteractionRepository for PgPartyInteractionRepository {
    async fn create(&self, interaction: &PartyInteraction) -> Result<(), DomainError> {
        sqlx::query(
            "INSERT INTO party_interactions \
             (id, href, description, interaction_type, status, interaction_date, \
              completion_date, channel_id, channel_name, involved_parties, characteristics, \
              notes, created_by, updated_by, created_at, updated_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16)",
        )
        .bind(&interaction.id)
        .bind(&interaction.href)
        .bind(&interaction.description)
        .bind(interaction.interaction_type.as_str())
        .bind(interaction.status.as_str())
        .bind(interaction.interaction_date)
        .bind(interaction.completion_date)
        .bind(&interaction.channel_id)
        .bind(interaction.channel_name.as_str())
        .bind(Json(&interaction.involved_parties))
        .bind(Json(&interaction.characteristics))
        .bind(&interaction.notes)
        .bind(&interaction.created_by)
        .bind(&interaction.updated_by)
        .bind(interaction.created_at)
        .bind(interaction.updated_at)
        .execute(&self.pool)
        .await
        .map_err(infrastructure)?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<PartyInteraction>, DomainError> {
        let row: Option<PartyInteractionRow> = sqlx::query_as(
            "SELECT id, href, description, interaction_type, status, interaction_date, \
                    completion_date, channel_id, channel_name, involved_parties, \
                    characteristics, notes, created_by, updated_by, created_at, updated_at \
             FROM party_interactions WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(infrastructure)?;

        row.map(PartyInteraction::try_from).transpose()
    }

    async fn list(&self, offset: u32, limit: u32) -> Result<Vec<PartyInteraction>, DomainError> {
        let rows: Vec<PartyInteractionRow> = sqlx::query_as(
            "SELECT id, href, description, interaction_type, status, interaction_date, \
                    completion_date, channel_id, channel_name, involved_parties, \
                    characteristics, notes, created_by, updated_by, created_at, updated_at \
             FROM party_interactions \
             ORDER BY created_at, id \
             LIMIT $1 OFFSET $2",
        )
        .bind(i64::from(limit))
        .bind(i64::from(offset))
        .fetch_all(&self.pool)
        .await
        .map_err(infrastructure)?;

        rows.into_iter().map(PartyInteraction::try_from).collect()
    }

    async fn update(
        &self,
        id: &str,
        patch: &PartyInteractionPatch,
        updated_by: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<Option<UpdateOutcome>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(infrastructure)?;

        let row: Option<PartyInteractionRow> = sqlx::query_as(
            "SELECT id, href, description, interaction_type, status, interaction_date, \
                    completion_date, channel_id, channel_name, involved_parties, \
                    characteristics, notes, created_by, updated_by, created_at, updated_at \
             FROM party_interactions WHERE id = $1 \
             FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(infrastructure)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let previous = PartyInteraction::try_from(row)?;
        let mut current = previous.clone();
        current.apply_patch(patch, updated_by, updated_at);

        sqlx::query(
            "UPDATE party_interactions SET \
               description = $2, interaction_type = $3, status = $4, interaction_date = $5, \
               channel_name = $6, involved_parties = $7, characteristics = $8, notes = $9, \
               updated_by = $10, updated_at = $11 \
             WHERE id = $1",
        )
        .bind(&current.id)
        .bind(&current.description)
        .bind(current.interaction_type.as_str())
        .bind(current.status.as_str())
        .bind(current.interaction_date)
        .bind(current.channel_name.as_str())
        .bind(Json(&current.involved_parties))
        .bind(Json(&current.characteristics))
        .bind(&current.notes)
        .bind(&current.updated_by)
        .bind(current.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(infrastructure)?;

        tx.commit().await.map_err(infrastructure)?;

        Ok(Some(UpdateOutcome { previous, current }))
    }

    async fn delete(&self, id: &str) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM party_interactions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;

        Ok(result.rows_affected() > 0)
    }
}
