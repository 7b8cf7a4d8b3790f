//! Messaging Transport Port - Interface to the bot platform.
//!
//! Every outbound effect of the listing desk (posts, panels, edits,
//! deletions, membership lookups) goes through this port. All text is sent
//! with HTML formatting.

use async_trait::async_trait;
use std::str::FromStr;

use crate::domain::foundation::{ChatId, MessageId, PhotoRef, UserId};
use crate::domain::moderation::InlineKeyboard;

/// Errors raised by the messaging transport.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Bot API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl TransportError {
    pub fn api(code: i64, description: impl Into<String>) -> Self {
        TransportError::Api {
            code,
            description: description.into(),
        }
    }
}

/// Coordinates of a message the transport sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef {
    pub chat_id: ChatId,
    pub message_id: MessageId,
}

/// A user's standing in a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    Creator,
    Administrator,
    Member,
    Restricted,
    Left,
    Kicked,
}

impl MemberStatus {
    /// Only full members, administrators and creators count as joined.
    pub fn is_joined(&self) -> bool {
        matches!(
            self,
            MemberStatus::Creator | MemberStatus::Administrator | MemberStatus::Member
        )
    }
}

impl FromStr for MemberStatus {
    type Err = TransportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "creator" | "owner" => Ok(MemberStatus::Creator),
            "administrator" => Ok(MemberStatus::Administrator),
            "member" => Ok(MemberStatus::Member),
            "restricted" => Ok(MemberStatus::Restricted),
            "left" => Ok(MemberStatus::Left),
            "kicked" | "banned" => Ok(MemberStatus::Kicked),
            other => Err(TransportError::Decode(format!(
                "unknown member status '{}'",
                other
            ))),
        }
    }
}

/// Port for the messaging platform.
#[async_trait]
pub trait MessagingTransport: Send + Sync {
    /// Send a text message, optionally with inline controls.
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageRef, TransportError>;

    /// Send photos as one album; the first photo carries the caption.
    ///
    /// # Returns
    /// One reference per album message, in album order. Never empty.
    async fn send_photo_group(
        &self,
        chat_id: ChatId,
        photos: &[PhotoRef],
        caption: &str,
    ) -> Result<Vec<MessageRef>, TransportError>;

    /// Replace the text of a message. `None` removes any inline controls.
    async fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), TransportError>;

    /// Replace the caption of a photo message.
    async fn edit_message_caption(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        caption: &str,
    ) -> Result<(), TransportError>;

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), TransportError>;

    async fn get_chat_member_status(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<MemberStatus, TransportError>;

    /// Acknowledge a button press, optionally with a toast or alert.
    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), TransportError>;
}
