//! Draft aggregate.
//!
//! A draft is one in-flight listing submission, correlated across every
//! conversational turn by its token. It lives only in memory and is
//! destroyed by approve or reject.
//!
//! # Invariants
//!
//! - `photos.len() <= MAX_PHOTOS`
//! - `publish_location` is set at most once, and only while publishing
//! - `pending_fields` only ever shrinks

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::status::DraftStatus;
use crate::domain::foundation::{
    ChatId, DomainError, DraftToken, MessageId, PhotoRef, StateMachine, Timestamp, UserId,
    ValidationError,
};
use crate::domain::listing::{EditableField, ListingForm, ListingStamp, Price, Reveal};

/// Maximum number of photos attached to one listing.
pub const MAX_PHOTOS: usize = 5;

/// Where the public post of a draft lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishLocation {
    pub channel_id: ChatId,
    /// The message carrying the listing text (the first album item for photos).
    pub message_id: MessageId,
    /// Album items after the first; empty for text posts.
    #[serde(default)]
    pub trailing_message_ids: Vec<MessageId>,
    /// Photo posts carry their text as a caption.
    pub has_photos: bool,
    pub stamp: ListingStamp,
}

impl PublishLocation {
    /// Every message making up the post, caption carrier first.
    pub fn message_ids(&self) -> impl Iterator<Item = MessageId> + '_ {
        std::iter::once(self.message_id).chain(self.trailing_message_ids.iter().copied())
    }
}

/// A moderator's action panel message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PanelRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// Result of attaching a photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhotoAppend {
    Added { count: usize },
    Full,
}

/// A moderator-supplied replacement for an editable field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Price(Price),
    Description(String),
}

impl FieldValue {
    /// Parses a moderator's reply for the given field.
    ///
    /// Prices follow the decimal-millions grammar; descriptions are kept
    /// verbatim apart from surrounding whitespace.
    pub fn parse(field: EditableField, raw: &str) -> Result<Self, ValidationError> {
        match field {
            EditableField::Price => Price::parse_millions(raw).map(FieldValue::Price),
            EditableField::Description => Ok(FieldValue::Description(raw.trim().to_string())),
        }
    }

    pub fn field(&self) -> EditableField {
        match self {
            FieldValue::Price(_) => EditableField::Price,
            FieldValue::Description(_) => EditableField::Description,
        }
    }
}

/// Draft aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    token: DraftToken,
    submitter_id: UserId,
    form: ListingForm,
    photos: Vec<PhotoRef>,
    status: DraftStatus,
    publish_location: Option<PublishLocation>,
    /// Fields still awaiting a moderator decision.
    pending_fields: BTreeSet<EditableField>,
    panels: Vec<PanelRef>,
    created_at: Timestamp,
    last_touched_at: Timestamp,
}

impl Draft {
    /// Creates a collecting draft with no photos and no panels.
    pub fn new(
        token: DraftToken,
        submitter_id: UserId,
        form: ListingForm,
        pending_fields: BTreeSet<EditableField>,
        now: Timestamp,
    ) -> Self {
        Self {
            token,
            submitter_id,
            form,
            photos: Vec::new(),
            status: DraftStatus::Collecting,
            publish_location: None,
            pending_fields,
            panels: Vec::new(),
            created_at: now,
            last_touched_at: now,
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Accessors
    // ─────────────────────────────────────────────────────────────────────────

    pub fn token(&self) -> &DraftToken {
        &self.token
    }

    pub fn submitter_id(&self) -> UserId {
        self.submitter_id
    }

    pub fn form(&self) -> &ListingForm {
        &self.form
    }

    pub fn photos(&self) -> &[PhotoRef] {
        &self.photos
    }

    pub fn has_photos(&self) -> bool {
        !self.photos.is_empty()
    }

    pub fn status(&self) -> DraftStatus {
        self.status
    }

    pub fn publish_location(&self) -> Option<&PublishLocation> {
        self.publish_location.as_ref()
    }

    pub fn pending_fields(&self) -> &BTreeSet<EditableField> {
        &self.pending_fields
    }

    pub fn is_pending(&self, field: EditableField) -> bool {
        self.pending_fields.contains(&field)
    }

    pub fn panels(&self) -> &[PanelRef] {
        &self.panels
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn last_touched_at(&self) -> Timestamp {
        self.last_touched_at
    }

    pub fn is_submitted_by(&self, user_id: UserId) -> bool {
        self.submitter_id == user_id
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reveal rules
    // ─────────────────────────────────────────────────────────────────────────

    /// Reveal flags for the first publication: only non-pending fields show.
    pub fn initial_reveal(&self) -> Reveal {
        Reveal::new(
            !self.is_pending(EditableField::Price),
            !self.is_pending(EditableField::Description),
        )
    }

    /// Reveal flags on approval: a pending field shows once it is non-empty.
    pub fn approval_reveal(&self) -> Reveal {
        Reveal::new(
            !self.is_pending(EditableField::Price) || !self.form.price_words().is_empty(),
            !self.is_pending(EditableField::Description)
                || !self.form.description().trim().is_empty(),
        )
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Mutations
    // ─────────────────────────────────────────────────────────────────────────

    /// Attaches a photo unless the draft is full.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` once the draft left `Collecting`
    pub fn append_photo(
        &mut self,
        photo: PhotoRef,
        now: Timestamp,
    ) -> Result<PhotoAppend, DomainError> {
        if !self.status.accepts_photos() {
            return Err(DomainError::invalid_transition(format!(
                "draft is {} and no longer accepts photos",
                self.status
            )));
        }
        if self.photos.len() >= MAX_PHOTOS {
            return Ok(PhotoAppend::Full);
        }
        self.photos.push(photo);
        self.last_touched_at = now;
        Ok(PhotoAppend::Added {
            count: self.photos.len(),
        })
    }

    /// Overwrites an editable field and clears its pending mark.
    pub fn set_field(&mut self, value: FieldValue, now: Timestamp) {
        let field = value.field();
        match value {
            FieldValue::Price(price) => self.form.set_price(price),
            FieldValue::Description(text) => self.form.set_description(text),
        }
        self.pending_fields.remove(&field);
        self.last_touched_at = now;
    }

    /// Takes the publish claim.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if already publishing or published
    pub fn begin_publish(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition(DraftStatus::Publishing, now)
    }

    /// Releases the publish claim after a failed publication.
    pub fn abort_publish(&mut self, now: Timestamp) -> Result<(), DomainError> {
        self.transition(DraftStatus::Collecting, now)
    }

    /// Records the public post and completes the claim.
    ///
    /// # Errors
    ///
    /// - `InvalidStateTransition` if a location is already set or no claim is held
    pub fn set_publish_location(
        &mut self,
        location: PublishLocation,
        now: Timestamp,
    ) -> Result<(), DomainError> {
        if self.publish_location.is_some() {
            return Err(DomainError::invalid_transition(
                "publish location already recorded",
            ));
        }
        self.transition(DraftStatus::Published, now)?;
        self.publish_location = Some(location);
        Ok(())
    }

    pub fn record_panel(&mut self, panel: PanelRef, now: Timestamp) {
        self.panels.push(panel);
        self.last_touched_at = now;
    }

    fn transition(&mut self, target: DraftStatus, now: Timestamp) -> Result<(), DomainError> {
        self.status = self
            .status
            .transition_to(target)
            .map_err(|e| DomainError::invalid_transition(e.to_string()))?;
        self.last_touched_at = now;
        Ok(())
    }
}
