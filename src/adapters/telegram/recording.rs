//! Recording Transport for testing.
//!
//! An in-process implementation of the MessagingTransport port that keeps
//! every call and the current state of every message it "sent", so tests
//! can assert on what a user or moderator would actually see.
//!
//! # Features
//!
//! - Sequential message ids per transport
//! - Per-chat and per-operation failure injection
//! - Configurable membership statuses
//!
//! # Example
//!
//! ```ignore
//! let transport = RecordingTransport::new()
//!     .with_member_status(channel, user, MemberStatus::Left);
//! transport.fail_operation(TransportOp::EditCaption);
//! ```

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::domain::foundation::{ChatId, MessageId, PhotoRef, UserId};
use crate::domain::moderation::InlineKeyboard;
use crate::ports::{MemberStatus, MessageRef, MessagingTransport, TransportError};

/// Transport operations, for failure injection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportOp {
    SendMessage,
    SendPhotoGroup,
    EditText,
    EditCaption,
    Delete,
    GetMember,
    AnswerCallback,
}

/// One successful transport call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportCall {
    SendMessage {
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboard>,
    },
    SendPhotoGroup {
        chat_id: ChatId,
        message_id: MessageId,
        photos: Vec<PhotoRef>,
        caption: String,
    },
    EditText {
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboard>,
    },
    EditCaption {
        chat_id: ChatId,
        message_id: MessageId,
        caption: String,
    },
    Delete {
        chat_id: ChatId,
        message_id: MessageId,
    },
    GetMember {
        chat_id: ChatId,
        user_id: UserId,
    },
    AnswerCallback {
        callback_id: String,
        text: Option<String>,
        show_alert: bool,
    },
}

impl TransportCall {
    /// Chat the call targeted, if any.
    pub fn chat_id(&self) -> Option<ChatId> {
        match self {
            TransportCall::SendMessage { chat_id, .. }
            | TransportCall::SendPhotoGroup { chat_id, .. }
            | TransportCall::EditText { chat_id, .. }
            | TransportCall::EditCaption { chat_id, .. }
            | TransportCall::Delete { chat_id, .. }
            | TransportCall::GetMember { chat_id, .. } => Some(*chat_id),
            TransportCall::AnswerCallback { .. } => None,
        }
    }

    /// True for calls that created a new message.
    pub fn is_send(&self) -> bool {
        matches!(
            self,
            TransportCall::SendMessage { .. } | TransportCall::SendPhotoGroup { .. }
        )
    }
}

/// What a message currently looks like.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedMessage {
    pub text: String,
    pub keyboard: Option<InlineKeyboard>,
    pub photos: Vec<PhotoRef>,
    pub deleted: bool,
}

#[derive(Debug, Default)]
struct Failures {
    chats: HashSet<ChatId>,
    operations: HashSet<TransportOp>,
}

/// Messaging transport double.
#[derive(Debug, Clone, Default)]
pub struct RecordingTransport {
    calls: Arc<Mutex<Vec<TransportCall>>>,
    messages: Arc<Mutex<HashMap<(ChatId, MessageId), RecordedMessage>>>,
    next_message_id: Arc<Mutex<i64>>,
    failures: Arc<Mutex<Failures>>,
    members: Arc<Mutex<HashMap<(ChatId, UserId), MemberStatus>>>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the status `get_chat_member_status` reports. Unset pairs are members.
    pub fn with_member_status(self, chat_id: ChatId, user_id: UserId, status: MemberStatus) -> Self {
        self.set_member_status(chat_id, user_id, status);
        self
    }

    pub fn set_member_status(&self, chat_id: ChatId, user_id: UserId, status: MemberStatus) {
        self.members
            .lock()
            .unwrap()
            .insert((chat_id, user_id), status);
    }

    /// Every call targeting `chat_id` fails from now on.
    pub fn fail_chat(&self, chat_id: ChatId) {
        self.failures.lock().unwrap().chats.insert(chat_id);
    }

    /// Every call of `op` fails from now on.
    pub fn fail_operation(&self, op: TransportOp) {
        self.failures.lock().unwrap().operations.insert(op);
    }

    pub fn clear_failures(&self) {
        let mut failures = self.failures.lock().unwrap();
        failures.chats.clear();
        failures.operations.clear();
    }

    pub fn calls(&self) -> Vec<TransportCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    /// Successful calls that targeted `chat_id`.
    pub fn calls_to(&self, chat_id: ChatId) -> Vec<TransportCall> {
        self.calls()
            .into_iter()
            .filter(|call| call.chat_id() == Some(chat_id))
            .collect()
    }

    /// Messages created in `chat_id`.
    pub fn sends_to(&self, chat_id: ChatId) -> Vec<TransportCall> {
        self.calls_to(chat_id)
            .into_iter()
            .filter(TransportCall::is_send)
            .collect()
    }

    /// Current state of a message.
    pub fn message(&self, chat_id: ChatId, message_id: MessageId) -> Option<RecordedMessage> {
        self.messages
            .lock()
            .unwrap()
            .get(&(chat_id, message_id))
            .cloned()
    }

    /// Texts of every text message sent to `chat_id`, in order.
    pub fn texts_to(&self, chat_id: ChatId) -> Vec<String> {
        self.calls_to(chat_id)
            .into_iter()
            .filter_map(|call| match call {
                TransportCall::SendMessage { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn check(&self, op: TransportOp, chat_id: Option<ChatId>) -> Result<(), TransportError> {
        let failures = self.failures.lock().unwrap();
        let chat_failed = chat_id.map_or(false, |c| failures.chats.contains(&c));
        if chat_failed || failures.operations.contains(&op) {
            return Err(TransportError::api(400, format!("injected {:?} failure", op)));
        }
        Ok(())
    }

    fn allocate(&self) -> MessageId {
        let mut next = self.next_message_id.lock().unwrap();
        *next += 1;
        MessageId::new(*next)
    }

    fn record(&self, call: TransportCall) {
        self.calls.lock().unwrap().push(call);
    }

    fn update_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        f: impl FnOnce(&mut RecordedMessage),
    ) -> Result<(), TransportError> {
        let mut messages = self.messages.lock().unwrap();
        match messages.get_mut(&(chat_id, message_id)) {
            Some(message) if !message.deleted => {
                f(message);
                Ok(())
            }
            _ => Err(TransportError::api(400, "message to edit not found")),
        }
    }
}

#[async_trait]
impl MessagingTransport for RecordingTransport {
    async fn send_message(
        &self,
        chat_id: ChatId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<MessageRef, TransportError> {
        self.check(TransportOp::SendMessage, Some(chat_id))?;
        let message_id = self.allocate();
        self.messages.lock().unwrap().insert(
            (chat_id, message_id),
            RecordedMessage {
                text: text.to_string(),
                keyboard: keyboard.cloned(),
                photos: Vec::new(),
                deleted: false,
            },
        );
        self.record(TransportCall::SendMessage {
            chat_id,
            message_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(MessageRef {
            chat_id,
            message_id,
        })
    }

    async fn send_photo_group(
        &self,
        chat_id: ChatId,
        photos: &[PhotoRef],
        caption: &str,
    ) -> Result<Vec<MessageRef>, TransportError> {
        self.check(TransportOp::SendPhotoGroup, Some(chat_id))?;
        if photos.is_empty() {
            return Err(TransportError::api(400, "photo group needs at least one photo"));
        }
        let album: Vec<MessageRef> = photos
            .iter()
            .map(|_| MessageRef {
                chat_id,
                message_id: self.allocate(),
            })
            .collect();
        {
            let mut messages = self.messages.lock().unwrap();
            for (index, (sent, photo)) in album.iter().zip(photos).enumerate() {
                messages.insert(
                    (chat_id, sent.message_id),
                    RecordedMessage {
                        // only the first item carries the caption
                        text: if index == 0 {
                            caption.to_string()
                        } else {
                            String::new()
                        },
                        keyboard: None,
                        photos: vec![photo.clone()],
                        deleted: false,
                    },
                );
            }
        }
        self.record(TransportCall::SendPhotoGroup {
            chat_id,
            message_id: album[0].message_id,
            photos: photos.to_vec(),
            caption: caption.to_string(),
        });
        Ok(album)
    }

    async fn edit_message_text(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: &str,
        keyboard: Option<&InlineKeyboard>,
    ) -> Result<(), TransportError> {
        self.check(TransportOp::EditText, Some(chat_id))?;
        self.update_message(chat_id, message_id, |message| {
            message.text = text.to_string();
            message.keyboard = keyboard.cloned();
        })?;
        self.record(TransportCall::EditText {
            chat_id,
            message_id,
            text: text.to_string(),
            keyboard: keyboard.cloned(),
        });
        Ok(())
    }

    async fn edit_message_caption(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        caption: &str,
    ) -> Result<(), TransportError> {
        self.check(TransportOp::EditCaption, Some(chat_id))?;
        self.update_message(chat_id, message_id, |message| {
            message.text = caption.to_string();
        })?;
        self.record(TransportCall::EditCaption {
            chat_id,
            message_id,
            caption: caption.to_string(),
        });
        Ok(())
    }

    async fn delete_message(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
    ) -> Result<(), TransportError> {
        self.check(TransportOp::Delete, Some(chat_id))?;
        self.update_message(chat_id, message_id, |message| {
            message.deleted = true;
        })?;
        self.record(TransportCall::Delete {
            chat_id,
            message_id,
        });
        Ok(())
    }

    async fn get_chat_member_status(
        &self,
        chat_id: ChatId,
        user_id: UserId,
    ) -> Result<MemberStatus, TransportError> {
        self.check(TransportOp::GetMember, Some(chat_id))?;
        self.record(TransportCall::GetMember { chat_id, user_id });
        Ok(self
            .members
            .lock()
            .unwrap()
            .get(&(chat_id, user_id))
            .copied()
            .unwrap_or(MemberStatus::Member))
    }

    async fn answer_callback(
        &self,
        callback_id: &str,
        text: Option<&str>,
        show_alert: bool,
    ) -> Result<(), TransportError> {
        self.check(TransportOp::AnswerCallback, None)?;
        self.record(TransportCall::AnswerCallback {
            callback_id: callback_id.to_string(),
            text: text.map(str::to_string),
            show_alert,
        });
        Ok(())
    }
}
