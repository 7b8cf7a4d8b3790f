//! Reference Data Port - Read-mostly configuration owned outside the core.
//!
//! Moderator roster, channel lists, the active destination and the global
//! listing counter.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::foundation::{ChatId, UserId};
use crate::domain::listing::ListingStamp;

/// Errors that can occur while reading or updating reference data.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceDataError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Corrupt data in {file}: {reason}")]
    Corrupt { file: String, reason: String },
}

/// A freshly allocated listing number and the day it was issued.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceNumber {
    pub number: u64,
    pub date: NaiveDate,
}

impl SequenceNumber {
    /// Stamp printed under captions, dated `YYYY/MM/DD`.
    pub fn stamp(&self) -> ListingStamp {
        ListingStamp {
            number: self.number,
            display_date: self.date.format("%Y/%m/%d").to_string(),
        }
    }
}

/// Port for moderator, channel and numbering data.
#[async_trait]
pub trait ReferenceData: Send + Sync {
    /// Every moderator, owner included, in ascending id order.
    async fn list_moderators(&self) -> Result<Vec<UserId>, ReferenceDataError>;

    async fn is_moderator(&self, user_id: UserId) -> Result<bool, ReferenceDataError>;

    async fn is_owner(&self, user_id: UserId) -> Result<bool, ReferenceDataError>;

    /// Channels a submitter must have joined.
    async fn required_channel_ids(&self) -> Result<Vec<ChatId>, ReferenceDataError>;

    /// Whether the desk may post into `chat_id`.
    async fn is_channel_allowed(&self, chat_id: ChatId) -> Result<bool, ReferenceDataError>;

    /// The currently selected publication channel, if any.
    async fn active_destination(&self) -> Result<Option<ChatId>, ReferenceDataError>;

    /// Allocates the next global listing number. Never resets.
    async fn next_sequence_number(&self) -> Result<SequenceNumber, ReferenceDataError>;
}
