//! In-Memory Reference Data Adapter
//!
//! Same semantics as the file-backed store without touching disk. Useful
//! for tests and for running without a data directory.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::state::{ReferenceBootstrap, ReferenceState};
use crate::domain::foundation::{ChatId, UserId};
use crate::ports::{Clock, ReferenceData, ReferenceDataError, SequenceNumber};

/// In-memory moderator roster, channel lists and counter.
pub struct InMemoryReferenceData {
    state: RwLock<ReferenceState>,
    clock: Arc<dyn Clock>,
    failing: RwLock<bool>,
}

impl InMemoryReferenceData {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: RwLock::new(ReferenceState::default()),
            clock,
            failing: RwLock::new(false),
        }
    }

    pub fn with_bootstrap(mut self, bootstrap: &ReferenceBootstrap) -> Self {
        self.state.get_mut().apply(bootstrap);
        self
    }

    pub fn with_moderator(mut self, user_id: UserId) -> Self {
        self.state.get_mut().admins.insert(user_id);
        self
    }

    pub fn with_required_channel(self, chat_id: ChatId) -> Self {
        self.with_bootstrap_channel(chat_id, true, false, false)
    }

    pub fn with_allowed_channel(self, chat_id: ChatId) -> Self {
        self.with_bootstrap_channel(chat_id, false, true, false)
    }

    /// Allows the channel and makes it the active destination.
    pub fn with_destination(self, chat_id: ChatId) -> Self {
        self.with_bootstrap_channel(chat_id, false, true, true)
    }

    fn with_bootstrap_channel(
        mut self,
        chat_id: ChatId,
        required: bool,
        allowed: bool,
        active: bool,
    ) -> Self {
        let state = self.state.get_mut();
        if required && !state.required_ids().contains(&chat_id) {
            state.required.push(super::state::RequiredChannel {
                id: chat_id,
                title: String::new(),
                username: String::new(),
            });
        }
        if allowed {
            state.allowed.insert(chat_id);
        }
        if active {
            state.destinations.active = Some(chat_id);
        }
        self
    }

    /// Makes every subsequent read fail, simulating an unreachable store.
    pub async fn set_failing(&self, failing: bool) {
        *self.failing.write().await = failing;
    }

    pub async fn remove_moderator(&self, user_id: UserId) {
        self.state.write().await.admins.remove(&user_id);
    }

    async fn check(&self) -> Result<(), ReferenceDataError> {
        if *self.failing.read().await {
            Err(ReferenceDataError::Io("reference data unavailable".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ReferenceData for InMemoryReferenceData {
    async fn list_moderators(&self) -> Result<Vec<UserId>, ReferenceDataError> {
        self.check().await?;
        Ok(self.state.read().await.moderators())
    }

    async fn is_moderator(&self, user_id: UserId) -> Result<bool, ReferenceDataError> {
        self.check().await?;
        Ok(self.state.read().await.is_moderator(user_id))
    }

    async fn is_owner(&self, user_id: UserId) -> Result<bool, ReferenceDataError> {
        self.check().await?;
        Ok(self.state.read().await.is_owner(user_id))
    }

    async fn required_channel_ids(&self) -> Result<Vec<ChatId>, ReferenceDataError> {
        self.check().await?;
        Ok(self.state.read().await.required_ids())
    }

    async fn is_channel_allowed(&self, chat_id: ChatId) -> Result<bool, ReferenceDataError> {
        self.check().await?;
        Ok(self.state.read().await.allowed.contains(&chat_id))
    }

    async fn active_destination(&self) -> Result<Option<ChatId>, ReferenceDataError> {
        self.check().await?;
        Ok(self.state.read().await.destinations.active)
    }

    async fn next_sequence_number(&self) -> Result<SequenceNumber, ReferenceDataError> {
        self.check().await?;
        let today = self.clock.now().date();
        Ok(self.state.write().await.next_sequence(today))
    }
}
