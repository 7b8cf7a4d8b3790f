//! MembershipGate - decides whether a user may submit listings.
//!
//! Moderators and the owner always pass. Everyone else must be a member of
//! every required channel. Anything that cannot be verified counts as "no".

use std::sync::Arc;
use tracing::{debug, warn};

use crate::domain::foundation::{ChatId, UserId};
use crate::domain::listing::ListingError;
use crate::ports::{MessagingTransport, ReferenceData};

pub struct MembershipGate {
    transport: Arc<dyn MessagingTransport>,
    reference: Arc<dyn ReferenceData>,
    fallback_channel: Option<ChatId>,
}

impl MembershipGate {
    pub fn new(
        transport: Arc<dyn MessagingTransport>,
        reference: Arc<dyn ReferenceData>,
        fallback_channel: Option<ChatId>,
    ) -> Self {
        Self {
            transport,
            reference,
            fallback_channel,
        }
    }

    /// # Errors
    /// `NotEligible` when the user fails the gate.
    pub async fn check(&self, user_id: UserId) -> Result<(), ListingError> {
        if self.is_eligible(user_id).await {
            Ok(())
        } else {
            Err(ListingError::NotEligible)
        }
    }

    pub async fn is_eligible(&self, user_id: UserId) -> bool {
        match self.is_privileged(user_id).await {
            Ok(true) => return true,
            Ok(false) => {}
            Err(reason) => {
                warn!(user = %user_id, %reason, "privilege lookup failed");
                return false;
            }
        }

        let required = match self.required_channels().await {
            Ok(channels) => channels,
            Err(reason) => {
                warn!(user = %user_id, %reason, "required channel lookup failed");
                return false;
            }
        };

        for chat_id in required {
            match self.transport.get_chat_member_status(chat_id, user_id).await {
                Ok(status) if status.is_joined() => {}
                Ok(status) => {
                    debug!(user = %user_id, channel = %chat_id, ?status, "not a member");
                    return false;
                }
                Err(e) => {
                    warn!(user = %user_id, channel = %chat_id, error = %e, "membership query failed");
                    return false;
                }
            }
        }
        true
    }

    async fn is_privileged(&self, user_id: UserId) -> Result<bool, String> {
        if self
            .reference
            .is_moderator(user_id)
            .await
            .map_err(|e| e.to_string())?
        {
            return Ok(true);
        }
        self.reference
            .is_owner(user_id)
            .await
            .map_err(|e| e.to_string())
    }

    async fn required_channels(&self) -> Result<Vec<ChatId>, String> {
        let configured = self
            .reference
            .required_channel_ids()
            .await
            .map_err(|e| e.to_string())?;
        if configured.is_empty() {
            Ok(self.fallback_channel.into_iter().collect())
        } else {
            Ok(configured)
        }
    }
}
