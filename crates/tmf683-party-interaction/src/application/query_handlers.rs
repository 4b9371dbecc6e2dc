//! Query handlers for the Party Interaction context.

use serde::Serialize;
use tmf683_core::error::DomainError;

use crate::domain::aggregates::PartyInteraction;
use crate::domain::repository::PartyInteractionRepository;

/// Page size used when the caller does not ask for one.
pub const DEFAULT_PAGE_LIMIT: u32 = 20;

/// Largest page a caller may request.
pub const MAX_PAGE_LIMIT: u32 = 100;

/// One page of interactions.
#[derive(Debug, Serialize)]
pub struct PartyInteractionPage {
    /// The interactions on this page.
    pub data: Vec<PartyInteraction>,
    /// Number of records skipped.
    pub offset: u32,
    /// Page size requested.
    pub limit: u32,
}

/// Retrieves a party interaction by id.
///
/// # Errors
///
/// Returns `DomainError::AggregateNotFound` if no interaction has the id, or
/// `DomainError::Infrastructure` if the repository fails.
pub async fn get_party_interaction_by_id(
    interaction_id: &str,
    repo: &dyn PartyInteractionRepository,
) -> Result<PartyInteraction, DomainError> {
    repo.get(interaction_id)
        .await?
        .ok_or_else(|| DomainError::AggregateNotFound(interaction_id.to_owned()))
}

/// Lists party interactions in creation order.
///
/// # Errors
///
/// Returns `DomainError::Validation` if `limit` is outside
/// `1..=MAX_PAGE_LIMIT`, or `DomainError::Infrastructure` if the repository
/// fails.
pub async fn list_party_interactions(
    offset: u32,
    limit: u32,
    repo: &dyn PartyInteractionRepository,
) -> Result<PartyInteractionPage, DomainError> {
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        return Err(DomainError::Validation(format!(
            "limit must be between 1 and {MAX_PAGE_LIMIT}"
        )));
    }
    let data = repo.list(offset, limit).await?;
    Ok(PartyInteractionPage {
        data,
        offset,
        limit,
    })
}
