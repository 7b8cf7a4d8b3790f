//! BeginEditHandler - a moderator pressed an edit control.

use std::sync::Arc;
use tracing::debug;

use crate::application::sessions::EditIntents;
use crate::domain::foundation::{DraftToken, UserId};
use crate::domain::listing::{EditableField, ListingError};
use crate::domain::moderation::EditIntent;
use crate::ports::{DraftStore, ReferenceData};

#[derive(Debug, Clone)]
pub struct BeginEditCommand {
    pub moderator_id: UserId,
    pub token: DraftToken,
    pub field: EditableField,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeginEditResult {
    pub intent: EditIntent,
    pub replaced: Option<EditIntent>,
}

pub struct BeginEditHandler {
    reference: Arc<dyn ReferenceData>,
    drafts: Arc<dyn DraftStore>,
    intents: Arc<EditIntents>,
}

impl BeginEditHandler {
    pub fn new(
        reference: Arc<dyn ReferenceData>,
        drafts: Arc<dyn DraftStore>,
        intents: Arc<EditIntents>,
    ) -> Self {
        Self {
            reference,
            drafts,
            intents,
        }
    }

    pub async fn handle(&self, cmd: BeginEditCommand) -> Result<BeginEditResult, ListingError> {
        // 1. Moderators only
        require_moderator(self.reference.as_ref(), cmd.moderator_id).await?;

        // 2. Draft must still exist
        if self.drafts.get(&cmd.token).await.is_none() {
            return Err(ListingError::not_found(cmd.token));
        }

        // 3. Record the intent, replacing any older one
        let intent = EditIntent::new(cmd.token, cmd.field);
        let replaced = self.intents.begin(cmd.moderator_id, intent.clone()).await;
        debug!(
            moderator = %cmd.moderator_id,
            token = %intent.token,
            field = %intent.field,
            "edit intent opened"
        );
        Ok(BeginEditResult { intent, replaced })
    }
}

/// Fails with `Forbidden` unless `user_id` is on the moderator roster.
pub(crate) async fn require_moderator(
    reference: &dyn ReferenceData,
    user_id: UserId,
) -> Result<(), ListingError> {
    let is_moderator = reference
        .is_moderator(user_id)
        .await
        .map_err(|e| ListingError::infrastructure(e.to_string()))?;
    if is_moderator {
        Ok(())
    } else {
        Err(ListingError::forbidden())
    }
}
