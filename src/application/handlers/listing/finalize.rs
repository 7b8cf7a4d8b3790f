//! FinalizeHandler - publishes a draft and sends it out for review.
//!
//! Finalize is idempotent: the `Publishing` claim is taken before the first
//! await that touches the channel, so a repeated press while the post is in
//! flight, or after it landed, changes nothing.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::application::policy::DeskPolicy;
use crate::application::services::{ModeratorFanout, PublishPipeline};
use crate::application::sessions::PhotoCollectionSessions;
use crate::domain::draft::PublishLocation;
use crate::domain::foundation::{ChatId, DraftToken, UserId};
use crate::domain::listing::ListingError;
use crate::ports::{DraftStore, PublishClaim, ReferenceData};

#[derive(Debug, Clone)]
pub struct FinalizeCommand {
    pub submitter_id: UserId,
    pub token: DraftToken,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinalizeResult {
    Published {
        location: PublishLocation,
        moderators_notified: usize,
    },
    /// An earlier finalize already posted (or is posting) this draft.
    AlreadySubmitted,
}

pub struct FinalizeHandler {
    drafts: Arc<dyn DraftStore>,
    reference: Arc<dyn ReferenceData>,
    pipeline: Arc<PublishPipeline>,
    fanout: Arc<ModeratorFanout>,
    photo_sessions: Arc<PhotoCollectionSessions>,
    policy: Arc<DeskPolicy>,
}

impl FinalizeHandler {
    pub fn new(
        drafts: Arc<dyn DraftStore>,
        reference: Arc<dyn ReferenceData>,
        pipeline: Arc<PublishPipeline>,
        fanout: Arc<ModeratorFanout>,
        photo_sessions: Arc<PhotoCollectionSessions>,
        policy: Arc<DeskPolicy>,
    ) -> Self {
        Self {
            drafts,
            reference,
            pipeline,
            fanout,
            photo_sessions,
            policy,
        }
    }

    pub async fn handle(&self, cmd: FinalizeCommand) -> Result<FinalizeResult, ListingError> {
        // 1. Only the submitter may finalize
        let draft = self
            .drafts
            .get(&cmd.token)
            .await
            .filter(|draft| draft.is_submitted_by(cmd.submitter_id))
            .ok_or_else(|| ListingError::not_found(cmd.token.clone()))?;
        if draft.publish_location().is_some() {
            return Ok(FinalizeResult::AlreadySubmitted);
        }

        // 2. Resolve the destination
        let destination = self.destination().await?;

        // 3. Claim the draft
        let claimed = match self.drafts.begin_publish(&cmd.token).await? {
            PublishClaim::Claimed(draft) => draft,
            PublishClaim::InFlight | PublishClaim::AlreadyPublished => {
                debug!(token = %cmd.token, "finalize repeated");
                return Ok(FinalizeResult::AlreadySubmitted);
            }
        };

        // 4. No more photos for this draft
        self.photo_sessions
            .close_for(cmd.submitter_id, &cmd.token)
            .await;

        // 5. Post to the channel
        let location = match self.pipeline.publish_initial(&claimed, destination).await {
            Ok(location) => location,
            Err(e) => {
                if let Err(abort_err) = self.drafts.abort_publish(&cmd.token).await {
                    warn!(token = %cmd.token, error = %abort_err, "publish claim not released");
                }
                return Err(e);
            }
        };
        let published = self
            .drafts
            .set_publish_location(&cmd.token, location.clone())
            .await?;

        // 6. Fan out to moderators
        let moderators_notified = match self.fanout.broadcast_for_review(&published).await {
            Ok(count) => count,
            Err(e) => {
                warn!(token = %cmd.token, error = %e, "review fan-out failed");
                0
            }
        };

        info!(
            token = %cmd.token,
            channel = %location.channel_id,
            moderators = moderators_notified,
            "draft finalized"
        );
        Ok(FinalizeResult::Published {
            location,
            moderators_notified,
        })
    }

    async fn destination(&self) -> Result<ChatId, ListingError> {
        let selected = self
            .reference
            .active_destination()
            .await
            .map_err(|e| ListingError::infrastructure(e.to_string()))?
            .or(self.policy.fallback_channel)
            .ok_or(ListingError::DestinationMissing)?;
        let allowed = self
            .reference
            .is_channel_allowed(selected)
            .await
            .map_err(|e| ListingError::infrastructure(e.to_string()))?;
        if allowed {
            Ok(selected)
        } else {
            Err(ListingError::DestinationMissing)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::clock::ManualClock;
    use crate::adapters::reference::InMemoryReferenceData;
    use crate::application::test_support::{photo, Desk, CHANNEL, MODERATORS, SUBMITTER};
    use crate::domain::draft::DraftStatus;

    fn handler(desk: &Desk) -> FinalizeHandler {
        FinalizeHandler::new(
            desk.drafts.clone(),
            desk.reference.clone(),
            desk.pipeline.clone(),
            desk.fanout.clone(),
            desk.photo_sessions.clone(),
            Arc::new(desk.policy.clone()),
        )
    }

    fn cmd(token: &DraftToken) -> FinalizeCommand {
        FinalizeCommand {
            submitter_id: SUBMITTER,
            token: token.clone(),
        }
    }

    #[tokio::test]
    async fn publishes_and_fans_out() {
        let desk = Desk::new();
        let token = desk.create_draft().await;
        desk.photo_sessions.open(SUBMITTER, token.clone()).await;

        let result = handler(&desk).handle(cmd(&token)).await.unwrap();
        let FinalizeResult::Published {
            location,
            moderators_notified,
        } = result
        else {
            panic!("expected a publication");
        };
        assert_eq!(location.channel_id, CHANNEL);
        assert_eq!(moderators_notified, MODERATORS.len());

        let draft = desk.drafts.get(&token).await.unwrap();
        assert_eq!(draft.status(), DraftStatus::Published);
        assert_eq!(draft.panels().len(), MODERATORS.len());
        assert!(desk.photo_sessions.current(SUBMITTER).await.is_none());
    }

    #[tokio::test]
    async fn finalize_twice_posts_once() {
        let desk = Desk::new();
        let token = desk.create_draft().await;
        let handler = handler(&desk);

        handler.handle(cmd(&token)).await.unwrap();
        let second = handler.handle(cmd(&token)).await.unwrap();
        assert_eq!(second, FinalizeResult::AlreadySubmitted);
        assert_eq!(desk.transport.sends_to(CHANNEL).len(), 1);
    }

    #[tokio::test]
    async fn in_flight_claim_is_respected() {
        let desk = Desk::new();
        let token = desk.create_draft().await;
        desk.drafts.begin_publish(&token).await.unwrap();

        let result = handler(&desk).handle(cmd(&token)).await.unwrap();
        assert_eq!(result, FinalizeResult::AlreadySubmitted);
        assert!(desk.transport.sends_to(CHANNEL).is_empty());
    }

    #[tokio::test]
    async fn stranger_cannot_finalize() {
        let desk = Desk::new();
        let token = desk.create_draft().await;
        let result = handler(&desk)
            .handle(FinalizeCommand {
                submitter_id: UserId::new(99),
                token: token.clone(),
            })
            .await;
        assert_eq!(result, Err(ListingError::NotFound(token)));
    }

    #[tokio::test]
    async fn failed_post_releases_claim() {
        let desk = Desk::new();
        let token = desk.create_draft().await;
        desk.drafts.append_photo(&token, photo(0)).await.unwrap();
        desk.transport.fail_chat(CHANNEL);

        let result = handler(&desk).handle(cmd(&token)).await;
        assert!(matches!(result, Err(ListingError::Transport(_))));
        let draft = desk.drafts.get(&token).await.unwrap();
        assert_eq!(draft.status(), DraftStatus::Collecting);

        desk.transport.clear_failures();
        let retried = handler(&desk).handle(cmd(&token)).await.unwrap();
        assert!(matches!(retried, FinalizeResult::Published { .. }));
    }

    #[tokio::test]
    async fn missing_destination_is_reported() {
        let desk = Desk::new();
        let token = desk.create_draft().await;
        let bare = Arc::new(InMemoryReferenceData::new(Arc::new(ManualClock::default())));
        let handler = FinalizeHandler::new(
            desk.drafts.clone(),
            bare,
            desk.pipeline.clone(),
            desk.fanout.clone(),
            desk.photo_sessions.clone(),
            Arc::new(DeskPolicy::default()),
        );
        let result = handler.handle(cmd(&token)).await;
        assert_eq!(result, Err(ListingError::DestinationMissing));
        assert_eq!(
            desk.drafts.get(&token).await.unwrap().status(),
            DraftStatus::Collecting
        );
    }

    #[tokio::test]
    async fn disallowed_fallback_is_refused() {
        let desk = Desk::new();
        let token = desk.create_draft().await;
        let policy = DeskPolicy {
            fallback_channel: Some(ChatId::new(-42)),
            ..Default::default()
        };
        let bare = Arc::new(InMemoryReferenceData::new(Arc::new(ManualClock::default())));
        let handler = FinalizeHandler::new(
            desk.drafts.clone(),
            bare,
            desk.pipeline.clone(),
            desk.fanout.clone(),
            desk.photo_sessions.clone(),
            Arc::new(policy),
        );
        assert_eq!(
            handler.handle(cmd(&token)).await,
            Err(ListingError::DestinationMissing)
        );
    }
}
