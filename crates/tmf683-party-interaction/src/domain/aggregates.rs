//! The party interaction record and its value types.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tmf683_core::error::DomainError;

/// Longest description accepted, in characters.
pub const MAX_DESCRIPTION_CHARS: usize = 1000;

/// Fields every update snapshot carries, whether or not the patch touches them.
const SNAPSHOT_FIELDS: [&str; 3] = ["description", "type", "status"];

/// Actor recorded in `createdBy` / `updatedBy` for service-originated writes.
pub const SYSTEM_ACTOR: &str = "system";

/// Direction of an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionType {
    /// Initiated by the external party.
    Inbound,
    /// Initiated by the organisation.
    Outbound,
    /// Between internal parties.
    Internal,
}

impl InteractionType {
    /// Returns the stored tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
            Self::Internal => "internal",
        }
    }
}

impl FromStr for InteractionType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "inbound" => Ok(Self::Inbound),
            "outbound" => Ok(Self::Outbound),
            "internal" => Ok(Self::Internal),
            other => Err(DomainError::Validation(format!(
                "unknown interaction type: {other}"
            ))),
        }
    }
}

/// Lifecycle status of an interaction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionStatus {
    /// In progress.
    #[default]
    Active,
    /// Dormant.
    Inactive,
    /// Awaiting action.
    Pending,
    /// Finished.
    Completed,
}

impl InteractionStatus {
    /// Returns the stored tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl FromStr for InteractionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "pending" => Ok(Self::Pending),
            "completed" => Ok(Self::Completed),
            other => Err(DomainError::Validation(format!(
                "unknown interaction status: {other}"
            ))),
        }
    }
}

/// Channel an interaction took place on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChannelName {
    /// Email.
    Email,
    /// Telephone.
    Phone,
    /// Live chat.
    Chat,
    /// Social media.
    Social,
    /// Face to face.
    InPerson,
    /// Web self-service.
    Web,
}

impl ChannelName {
    /// Returns the stored tag.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Phone => "phone",
            Self::Chat => "chat",
            Self::Social => "social",
            Self::InPerson => "in-person",
            Self::Web => "web",
        }
    }
}

impl FromStr for ChannelName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "email" => Ok(Self::Email),
            "phone" => Ok(Self::Phone),
            "chat" => Ok(Self::Chat),
            "social" => Ok(Self::Social),
            "in-person" => Ok(Self::InPerson),
            "web" => Ok(Self::Web),
            other => Err(DomainError::Validation(format!(
                "unknown channel name: {other}"
            ))),
        }
    }
}

impl fmt::Display for ChannelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role a party plays in an interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyRole {
    /// The customer.
    Customer,
    /// A human agent.
    Agent,
    /// An automated system.
    System,
}

/// Reference to a party involved in an interaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedParty {
    /// Party identifier.
    pub id: String,
    /// Party URI, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    /// Display name.
    pub name: String,
    /// Role in the interaction.
    pub role: PartyRole,
}

/// Free-form name/value attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristic {
    /// Attribute name.
    pub name: String,
    /// Attribute value.
    pub value: String,
}

/// A recorded interaction between parties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyInteraction {
    /// Aggregate identifier.
    pub id: String,
    /// Resource URI.
    pub href: String,
    /// What the interaction was about.
    pub description: String,
    /// Direction of the interaction.
    #[serde(rename = "type")]
    pub interaction_type: InteractionType,
    /// Lifecycle status.
    pub status: InteractionStatus,
    /// When the interaction happened.
    pub interaction_date: DateTime<Utc>,
    /// When the interaction was closed.
    pub completion_date: Option<DateTime<Utc>>,
    /// Channel instance identifier.
    pub channel_id: Option<String>,
    /// Channel kind.
    pub channel_name: ChannelName,
    /// Parties involved.
    pub involved_parties: Vec<RelatedParty>,
    /// Additional attributes.
    pub characteristics: Vec<Characteristic>,
    /// Free-text notes.
    pub notes: Option<String>,
    /// Who created the record.
    pub created_by: String,
    /// Who last changed the record.
    pub updated_by: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last modification time.
    pub updated_at: DateTime<Utc>,
}

impl PartyInteraction {
    /// Resource URI for an interaction id.
    #[must_use]
    pub fn href_for(id: &str) -> String {
        format!("/partyInteraction/{id}")
    }

    /// Applies every field present in `patch` and stamps the audit fields.
    pub fn apply_patch(
        &mut self,
        patch: &PartyInteractionPatch,
        updated_by: &str,
        updated_at: DateTime<Utc>,
    ) {
        if let Some(description) = &patch.description {
            self.description.clone_from(description);
        }
        if let Some(interaction_type) = patch.interaction_type {
            self.interaction_type = interaction_type;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(interaction_date) = patch.interaction_date {
            self.interaction_date = interaction_date;
        }
        if let Some(channel_name) = patch.channel_name {
            self.channel_name = channel_name;
        }
        if let Some(involved_parties) = &patch.involved_parties {
            self.involved_parties.clone_from(involved_parties);
        }
        if let Some(characteristics) = &patch.characteristics {
            self.characteristics.clone_from(characteristics);
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
        updated_by.clone_into(&mut self.updated_by);
        self.updated_at = updated_at;
    }

    /// Snapshot taken before `patch` is applied, keyed by JSON field name.
    ///
    /// Always carries `description`, `type` and `status`, plus the current
    /// value of every other field the patch touches.
    #[must_use]
    pub fn snapshot_before(&self, patch: &PartyInteractionPatch) -> Map<String, Value> {
        let Ok(Value::Object(current)) = serde_json::to_value(self) else {
            return Map::new();
        };
        let touched = patch.changes();
        SNAPSHOT_FIELDS
            .iter()
            .map(|field| (*field).to_owned())
            .chain(touched.into_iter().map(|(field, _)| field))
            .filter_map(|field| {
                let value = current.get(&field)?.clone();
                Some((field, value))
            })
            .collect()
    }
}

/// A partial update. Absent fields are left unchanged and unrecognised
/// fields are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartyInteractionPatch {
    /// New description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New direction.
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub interaction_type: Option<InteractionType>,
    /// New status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<InteractionStatus>,
    /// New interaction date.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interaction_date: Option<DateTime<Utc>>,
    /// New channel.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel_name: Option<ChannelName>,
    /// Replacement list of involved parties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub involved_parties: Option<Vec<RelatedParty>>,
    /// Replacement list of characteristics.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characteristics: Option<Vec<Characteristic>>,
    /// New notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl PartyInteractionPatch {
    /// The submitted fields as a JSON object.
    #[must_use]
    pub fn changes(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }
}

/// Checks the description length rule.
///
/// # Errors
///
/// Returns `DomainError::Validation` if the description is empty or longer
/// than [`MAX_DESCRIPTION_CHARS`].
pub fn validate_description(description: &str) -> Result<(), DomainError> {
    if description.is_empty() {
        return Err(DomainError::Validation(
            "description must not be empty".into(),
        ));
    }
    if description.chars().count() > MAX_DESCRIPTION_CHARS {
        return Err(DomainError::Validation(format!(
            "description must be at most {MAX_DESCRIPTION_CHARS} characters"
        )));
    }
    Ok(())
}
