//! Commands for the Party Interaction context.

use chrono::{DateTime, Utc};
use tmf683_core::command::Command;

use super::aggregates::{
    ChannelName, Characteristic, InteractionStatus, InteractionType, PartyInteractionPatch,
    RelatedParty,
};

/// Command to record a new party interaction.
#[derive(Debug, Clone)]
pub struct CreatePartyInteraction {
    /// The correlation ID for tracing.
    pub correlation_id: String,
    /// What the interaction was about.
    pub description: String,
    /// Direction of the interaction.
    pub interaction_type: InteractionType,
    /// Initial status.
    pub status: InteractionStatus,
    /// When the interaction happened.
    pub interaction_date: DateTime<Utc>,
    /// Channel kind.
    pub channel_name: ChannelName,
    /// Parties involved.
    pub involved_parties: Vec<RelatedParty>,
    /// Additional attributes.
    pub characteristics: Vec<Characteristic>,
    /// Free-text notes.
    pub notes: Option<String>,
}

impl Command for CreatePartyInteraction {
    fn command_type(&self) -> &'static str {
        "party_interaction.create"
    }

    fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}

/// Command to change fields of an existing interaction.
#[derive(Debug, Clone)]
pub struct UpdatePartyInteraction {
    /// The correlation ID for tracing.
    pub correlation_id: String,
    /// The interaction to update.
    pub interaction_id: String,
    /// Fields to change.
    pub patch: PartyInteractionPatch,
}

impl Command for UpdatePartyInteraction {
    fn command_type(&self) -> &'static str {
        "party_interaction.update"
    }

    fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}

/// Command to delete an interaction.
#[derive(Debug, Clone)]
pub struct DeletePartyInteraction {
    /// The correlation ID for tracing.
    pub correlation_id: String,
    /// The interaction to delete.
    pub interaction_id: String,
}

impl Command for DeletePartyInteraction {
    fn command_type(&self) -> &'static str {
        "party_interaction.delete"
    }

    fn correlation_id(&self) -> &str {
        &self.correlation_id
    }
}
