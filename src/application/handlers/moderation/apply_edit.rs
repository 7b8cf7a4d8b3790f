//! ApplyEditHandler - a moderator's free-text reply to an open edit intent.

use std::sync::Arc;
use tracing::{debug, info};

use super::begin_edit::require_moderator;
use crate::application::services::{ModeratorFanout, PanelSyncReport};
use crate::application::sessions::EditIntents;
use crate::domain::draft::{Draft, FieldValue};
use crate::domain::foundation::UserId;
use crate::domain::listing::{EditableField, ListingError};
use crate::ports::{DraftStore, DraftStoreError, ReferenceData};

#[derive(Debug, Clone)]
pub struct ApplyEditCommand {
    pub moderator_id: UserId,
    pub text: String,
}

#[derive(Debug, Clone)]
pub enum ApplyEditResult {
    /// The sender has no open intent; the text is not an edit.
    NoIntent,
    Applied {
        field: EditableField,
        draft: Draft,
        panels: PanelSyncReport,
    },
}

pub struct ApplyEditHandler {
    reference: Arc<dyn ReferenceData>,
    drafts: Arc<dyn DraftStore>,
    intents: Arc<EditIntents>,
    fanout: Arc<ModeratorFanout>,
}

impl ApplyEditHandler {
    pub fn new(
        reference: Arc<dyn ReferenceData>,
        drafts: Arc<dyn DraftStore>,
        intents: Arc<EditIntents>,
        fanout: Arc<ModeratorFanout>,
    ) -> Self {
        Self {
            reference,
            drafts,
            intents,
            fanout,
        }
    }

    pub async fn handle(&self, cmd: ApplyEditCommand) -> Result<ApplyEditResult, ListingError> {
        // 1. Is this reply expected?
        let Some(intent) = self.intents.current(cmd.moderator_id).await else {
            return Ok(ApplyEditResult::NoIntent);
        };

        // 2. Roster may have changed since the intent opened
        if let Err(e) = require_moderator(self.reference.as_ref(), cmd.moderator_id).await {
            if e == ListingError::Forbidden {
                self.intents.clear(cmd.moderator_id).await;
            }
            return Err(e);
        }

        // 3. Parse; a bad value keeps the intent open
        let value = FieldValue::parse(intent.field, &cmd.text)?;

        // 4. Apply
        let draft = match self.drafts.set_field(&intent.token, value).await {
            Ok(draft) => draft,
            Err(DraftStoreError::NotFound(token)) => {
                self.intents.clear(cmd.moderator_id).await;
                debug!(moderator = %cmd.moderator_id, token = %token, "edit target vanished");
                return Err(ListingError::not_found(token));
            }
            Err(e) => return Err(e.into()),
        };
        self.intents.clear(cmd.moderator_id).await;

        // 5. Sync every panel
        let panels = self.fanout.refresh_panels(&draft).await;

        info!(
            token = %intent.token,
            moderator = %cmd.moderator_id,
            field = %intent.field,
            "field edited"
        );
        Ok(ApplyEditResult::Applied {
            field: intent.field,
            draft,
            panels,
        })
    }
}
