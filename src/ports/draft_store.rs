//! Draft Store Port - Token-keyed registry of in-flight drafts.
//!
//! The store owns every draft between submission and finalization. Each
//! operation is atomic with respect to other store calls; callers never
//! hold a draft across an await and write it back.

use async_trait::async_trait;
use std::collections::BTreeSet;
use std::time::Duration;

use crate::domain::draft::{Draft, FieldValue, PanelRef, PhotoAppend, PublishLocation};
use crate::domain::foundation::{DomainError, DraftToken, PhotoRef, UserId};
use crate::domain::listing::{EditableField, ListingError, ListingForm};

/// Errors from draft store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DraftStoreError {
    #[error("Draft not found: {0}")]
    NotFound(DraftToken),

    #[error("Invalid state for draft {token}: {reason}")]
    InvalidState { token: DraftToken, reason: String },
}

impl DraftStoreError {
    pub fn invalid_state(token: &DraftToken, err: DomainError) -> Self {
        DraftStoreError::InvalidState {
            token: token.clone(),
            reason: err.message,
        }
    }
}

impl From<DraftStoreError> for ListingError {
    fn from(err: DraftStoreError) -> Self {
        match err {
            DraftStoreError::NotFound(token) => ListingError::NotFound(token),
            DraftStoreError::InvalidState { reason, .. } => {
                ListingError::validation("status", reason)
            }
        }
    }
}

/// Outcome of claiming a draft for publication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishClaim {
    /// The caller now holds the claim; snapshot taken at claim time.
    Claimed(Draft),
    /// Another finalize is mid-flight.
    InFlight,
    /// The draft was already posted.
    AlreadyPublished,
}

/// Port for the draft registry.
#[async_trait]
pub trait DraftStore: Send + Sync {
    /// Creates a draft under a fresh token.
    async fn create(
        &self,
        submitter_id: UserId,
        form: ListingForm,
        pending_fields: BTreeSet<EditableField>,
    ) -> DraftToken;

    /// Snapshot of a draft.
    async fn get(&self, token: &DraftToken) -> Option<Draft>;

    /// Appends a photo, reporting `Full` at the limit without mutation.
    async fn append_photo(
        &self,
        token: &DraftToken,
        photo: PhotoRef,
    ) -> Result<PhotoAppend, DraftStoreError>;

    /// Overwrites price or description and clears its pending mark.
    async fn set_field(
        &self,
        token: &DraftToken,
        value: FieldValue,
    ) -> Result<Draft, DraftStoreError>;

    /// Takes the publish claim.
    async fn begin_publish(&self, token: &DraftToken) -> Result<PublishClaim, DraftStoreError>;

    /// Releases a claim whose publication failed.
    async fn abort_publish(&self, token: &DraftToken) -> Result<(), DraftStoreError>;

    /// Records the public post. Allowed once.
    async fn set_publish_location(
        &self,
        token: &DraftToken,
        location: PublishLocation,
    ) -> Result<Draft, DraftStoreError>;

    async fn record_panel(&self, token: &DraftToken, panel: PanelRef)
        -> Result<(), DraftStoreError>;

    /// Removes and returns a draft. The sole destructor.
    async fn remove(&self, token: &DraftToken) -> Option<Draft>;

    /// Re-inserts a draft removed by a finalization that could not complete.
    async fn restore(&self, draft: Draft);

    /// Removes drafts untouched for longer than `max_idle`.
    async fn sweep_idle(&self, max_idle: Duration) -> Vec<Draft>;

    async fn len(&self) -> usize;
}
