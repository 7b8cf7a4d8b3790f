//! RejectHandler - withdraws a draft and its public post.

use std::sync::Arc;
use tracing::info;

use super::begin_edit::require_moderator;
use crate::application::services::{ModeratorFanout, PanelSyncReport, PostWithdrawal, PublishPipeline};
use crate::application::sessions::{EditIntents, PhotoCollectionSessions};
use crate::domain::foundation::{DraftToken, UserId};
use crate::domain::listing::ListingError;
use crate::domain::moderation::PanelOutcome;
use crate::ports::{DraftStore, ReferenceData};

#[derive(Debug, Clone)]
pub struct RejectCommand {
    pub moderator_id: UserId,
    pub token: DraftToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectResult {
    /// `None` when the draft was never posted.
    pub post: Option<PostWithdrawal>,
    pub panels: PanelSyncReport,
}

pub struct RejectHandler {
    reference: Arc<dyn ReferenceData>,
    drafts: Arc<dyn DraftStore>,
    pipeline: Arc<PublishPipeline>,
    fanout: Arc<ModeratorFanout>,
    intents: Arc<EditIntents>,
    photo_sessions: Arc<PhotoCollectionSessions>,
}

impl RejectHandler {
    pub fn new(
        reference: Arc<dyn ReferenceData>,
        drafts: Arc<dyn DraftStore>,
        pipeline: Arc<PublishPipeline>,
        fanout: Arc<ModeratorFanout>,
        intents: Arc<EditIntents>,
        photo_sessions: Arc<PhotoCollectionSessions>,
    ) -> Self {
        Self {
            reference,
            drafts,
            pipeline,
            fanout,
            intents,
            photo_sessions,
        }
    }

    pub async fn handle(&self, cmd: RejectCommand) -> Result<RejectResult, ListingError> {
        // 1. Moderators only
        require_moderator(self.reference.as_ref(), cmd.moderator_id).await?;

        // 2. Remove immediately
        let draft = self
            .drafts
            .remove(&cmd.token)
            .await
            .ok_or_else(|| ListingError::not_found(cmd.token.clone()))?;

        // 3. Best-effort cleanup of everything that pointed at it
        self.intents.purge_token(&cmd.token).await;
        self.photo_sessions
            .close_for(draft.submitter_id(), &cmd.token)
            .await;

        let post = match draft.publish_location() {
            Some(location) => Some(self.pipeline.withdraw(location).await),
            None => None,
        };
        let panels = self.fanout.close_panels(&draft, PanelOutcome::Rejected).await;

        info!(token = %cmd.token, moderator = %cmd.moderator_id, ?post, "draft rejected");
        Ok(RejectResult { post, panels })
    }
}
