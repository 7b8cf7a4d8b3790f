//! Shared wiring for application tests.

use std::sync::Arc;

use crate::adapters::clock::{ManualClock, SequentialTokenGenerator};
use crate::adapters::drafts::InMemoryDraftStore;
use crate::adapters::reference::{InMemoryReferenceData, ReferenceBootstrap};
use crate::adapters::telegram::RecordingTransport;
use crate::application::policy::DeskPolicy;
use crate::application::services::{MembershipGate, ModeratorFanout, PublishPipeline};
use crate::application::sessions::{EditIntents, PhotoCollectionSessions};
use crate::domain::draft::Draft;
use crate::domain::foundation::{ChatId, DraftToken, PhotoRef, UserId};
use crate::domain::listing::fixtures::valid_form;
use crate::ports::DraftStore;

pub const OWNER: UserId = UserId::new(1000);
pub const ADMIN: UserId = UserId::new(2000);
pub const MODERATORS: [UserId; 2] = [OWNER, ADMIN];
pub const SUBMITTER: UserId = UserId::new(42);
pub const CHANNEL: ChatId = ChatId::new(-1001);

pub fn photo(n: usize) -> PhotoRef {
    PhotoRef::new(format!("photo-{}", n)).unwrap()
}

/// Every collaborator a handler may need, backed by in-memory adapters.
pub struct Desk {
    pub clock: Arc<ManualClock>,
    pub transport: RecordingTransport,
    pub reference: Arc<InMemoryReferenceData>,
    pub drafts: Arc<InMemoryDraftStore>,
    pub photo_sessions: Arc<PhotoCollectionSessions>,
    pub intents: Arc<EditIntents>,
    pub gate: Arc<MembershipGate>,
    pub pipeline: Arc<PublishPipeline>,
    pub fanout: Arc<ModeratorFanout>,
    pub policy: DeskPolicy,
}

impl Desk {
    pub fn new() -> Self {
        let clock = Arc::new(ManualClock::default());
        let transport = RecordingTransport::new();
        let bootstrap = ReferenceBootstrap {
            owner_id: Some(OWNER),
            admin_ids: vec![ADMIN],
            target_channel_id: Some(CHANNEL),
        };
        let reference =
            Arc::new(InMemoryReferenceData::new(clock.clone()).with_bootstrap(&bootstrap));
        let drafts = Arc::new(InMemoryDraftStore::new(
            clock.clone(),
            Arc::new(SequentialTokenGenerator::new()),
        ));
        let policy = DeskPolicy {
            fallback_channel: Some(CHANNEL),
            ..Default::default()
        };
        let transport_port = Arc::new(transport.clone());

        Self {
            photo_sessions: Arc::new(PhotoCollectionSessions::new(clock.clone())),
            intents: Arc::new(EditIntents::new(clock.clone())),
            gate: Arc::new(MembershipGate::new(
                transport_port.clone(),
                reference.clone(),
                policy.fallback_channel,
            )),
            pipeline: Arc::new(PublishPipeline::new(
                transport_port.clone(),
                reference.clone(),
                None,
            )),
            fanout: Arc::new(ModeratorFanout::new(
                transport_port,
                reference.clone(),
                drafts.clone(),
            )),
            clock,
            transport,
            reference,
            drafts,
            policy,
        }
    }

    pub async fn create_draft(&self) -> DraftToken {
        let form = valid_form();
        let pending = self.policy.initial_pending(&form);
        self.drafts.create(SUBMITTER, form, pending).await
    }

    /// A draft posted to `CHANNEL` without any moderator panels.
    pub async fn published_draft(&self, photos: usize) -> Draft {
        let token = self.create_draft().await;
        for n in 0..photos {
            self.drafts.append_photo(&token, photo(n)).await.unwrap();
        }
        let draft = self.drafts.get(&token).await.unwrap();
        self.drafts.begin_publish(&token).await.unwrap();
        let location = self.pipeline.publish_initial(&draft, CHANNEL).await.unwrap();
        self.drafts
            .set_publish_location(&token, location)
            .await
            .unwrap()
    }

    /// A published draft whose panels went out to every moderator.
    pub async fn reviewed_draft(&self, photos: usize) -> Draft {
        let draft = self.published_draft(photos).await;
        self.fanout.broadcast_for_review(&draft).await.unwrap();
        self.drafts.get(draft.token()).await.unwrap()
    }
}
