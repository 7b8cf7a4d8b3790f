//! ApproveHandler - applies the moderated values to the public post.

use std::sync::Arc;
use tracing::{info, warn};

use super::begin_edit::require_moderator;
use crate::application::services::{ModeratorFanout, PanelSyncReport, PostUpdate, PublishPipeline};
use crate::application::sessions::EditIntents;
use crate::domain::foundation::{DraftToken, UserId};
use crate::domain::listing::ListingError;
use crate::domain::moderation::PanelOutcome;
use crate::ports::{DraftStore, ReferenceData};

#[derive(Debug, Clone)]
pub struct ApproveCommand {
    pub moderator_id: UserId,
    pub token: DraftToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApproveResult {
    pub post: PostUpdate,
    pub panels: PanelSyncReport,
}

pub struct ApproveHandler {
    reference: Arc<dyn ReferenceData>,
    drafts: Arc<dyn DraftStore>,
    pipeline: Arc<PublishPipeline>,
    fanout: Arc<ModeratorFanout>,
    intents: Arc<EditIntents>,
}

impl ApproveHandler {
    pub fn new(
        reference: Arc<dyn ReferenceData>,
        drafts: Arc<dyn DraftStore>,
        pipeline: Arc<PublishPipeline>,
        fanout: Arc<ModeratorFanout>,
        intents: Arc<EditIntents>,
    ) -> Self {
        Self {
            reference,
            drafts,
            pipeline,
            fanout,
            intents,
        }
    }

    pub async fn handle(&self, cmd: ApproveCommand) -> Result<ApproveResult, ListingError> {
        // 1. Moderators only
        require_moderator(self.reference.as_ref(), cmd.moderator_id).await?;

        // 2. Draft must exist and be posted
        let existing = self
            .drafts
            .get(&cmd.token)
            .await
            .ok_or_else(|| ListingError::not_found(cmd.token.clone()))?;
        if existing.publish_location().is_none() {
            return Err(ListingError::NotPublished(cmd.token));
        }

        // 3. Retire the token; a concurrent approve or reject loses here
        let draft = self
            .drafts
            .remove(&cmd.token)
            .await
            .ok_or_else(|| ListingError::not_found(cmd.token.clone()))?;

        // 4. Rewrite the public post
        let post = match self.pipeline.apply_approval(&draft).await {
            Ok(post) => post,
            Err(e) => {
                warn!(token = %cmd.token, error = %e, "approval not applied, draft restored");
                self.drafts.restore(draft).await;
                return Err(e);
            }
        };

        // 5. Close every panel
        self.intents.purge_token(&cmd.token).await;
        let panels = self.fanout.close_panels(&draft, PanelOutcome::Applied).await;

        info!(
            token = %cmd.token,
            moderator = %cmd.moderator_id,
            reposted = matches!(post, PostUpdate::Reposted(_)),
            "draft approved"
        );
        Ok(ApproveResult { post, panels })
    }
}
