//! In-Memory Draft Store Adapter
//!
//! Holds every in-flight draft in a token-keyed map. Drafts are not
//! persisted: a restart loses them.

use async_trait::async_trait;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::draft::{Draft, DraftStatus, FieldValue, PanelRef, PhotoAppend, PublishLocation};
use crate::domain::foundation::{DraftToken, PhotoRef, UserId};
use crate::domain::listing::{EditableField, ListingForm};
use crate::ports::{Clock, DraftStore, DraftStoreError, PublishClaim, TokenGenerator};

/// In-memory draft registry with injected time and token sources.
#[derive(Clone)]
pub struct InMemoryDraftStore {
    drafts: Arc<RwLock<HashMap<DraftToken, Draft>>>,
    clock: Arc<dyn Clock>,
    tokens: Arc<dyn TokenGenerator>,
}

impl InMemoryDraftStore {
    pub fn new(clock: Arc<dyn Clock>, tokens: Arc<dyn TokenGenerator>) -> Self {
        Self {
            drafts: Arc::new(RwLock::new(HashMap::new())),
            clock,
            tokens,
        }
    }

    /// Applies `f` to the stored draft under a single write lock.
    async fn with_draft<T>(
        &self,
        token: &DraftToken,
        f: impl FnOnce(&mut Draft) -> Result<T, DraftStoreError>,
    ) -> Result<T, DraftStoreError> {
        let mut drafts = self.drafts.write().await;
        let draft = drafts
            .get_mut(token)
            .ok_or_else(|| DraftStoreError::NotFound(token.clone()))?;
        f(draft)
    }
}

#[async_trait]
impl DraftStore for InMemoryDraftStore {
    async fn create(
        &self,
        submitter_id: UserId,
        form: ListingForm,
        pending_fields: BTreeSet<EditableField>,
    ) -> DraftToken {
        let mut drafts = self.drafts.write().await;
        let mut token = self.tokens.next_token();
        while drafts.contains_key(&token) {
            token = self.tokens.next_token();
        }
        let draft = Draft::new(
            token.clone(),
            submitter_id,
            form,
            pending_fields,
            self.clock.now(),
        );
        drafts.insert(token.clone(), draft);
        tracing::debug!(token = %token, submitter = %submitter_id, "draft created");
        token
    }

    async fn get(&self, token: &DraftToken) -> Option<Draft> {
        self.drafts.read().await.get(token).cloned()
    }

    async fn append_photo(
        &self,
        token: &DraftToken,
        photo: PhotoRef,
    ) -> Result<PhotoAppend, DraftStoreError> {
        let now = self.clock.now();
        self.with_draft(token, |draft| {
            draft
                .append_photo(photo, now)
                .map_err(|e| DraftStoreError::invalid_state(token, e))
        })
        .await
    }

    async fn set_field(
        &self,
        token: &DraftToken,
        value: FieldValue,
    ) -> Result<Draft, DraftStoreError> {
        let now = self.clock.now();
        self.with_draft(token, |draft| {
            draft.set_field(value, now);
            Ok(draft.clone())
        })
        .await
    }

    async fn begin_publish(&self, token: &DraftToken) -> Result<PublishClaim, DraftStoreError> {
        let now = self.clock.now();
        self.with_draft(token, |draft| match draft.status() {
            DraftStatus::Publishing => Ok(PublishClaim::InFlight),
            DraftStatus::Published => Ok(PublishClaim::AlreadyPublished),
            DraftStatus::Collecting => {
                draft
                    .begin_publish(now)
                    .map_err(|e| DraftStoreError::invalid_state(token, e))?;
                tracing::debug!(token = %token, "publish claim taken");
                Ok(PublishClaim::Claimed(draft.clone()))
            }
        })
        .await
    }

    async fn abort_publish(&self, token: &DraftToken) -> Result<(), DraftStoreError> {
        let now = self.clock.now();
        self.with_draft(token, |draft| {
            draft
                .abort_publish(now)
                .map_err(|e| DraftStoreError::invalid_state(token, e))
        })
        .await
    }

    async fn set_publish_location(
        &self,
        token: &DraftToken,
        location: PublishLocation,
    ) -> Result<Draft, DraftStoreError> {
        let now = self.clock.now();
        self.with_draft(token, |draft| {
            draft
                .set_publish_location(location, now)
                .map_err(|e| DraftStoreError::invalid_state(token, e))?;
            Ok(draft.clone())
        })
        .await
    }

    async fn record_panel(
        &self,
        token: &DraftToken,
        panel: PanelRef,
    ) -> Result<(), DraftStoreError> {
        let now = self.clock.now();
        self.with_draft(token, |draft| {
            draft.record_panel(panel, now);
            Ok(())
        })
        .await
    }

    async fn remove(&self, token: &DraftToken) -> Option<Draft> {
        let removed = self.drafts.write().await.remove(token);
        if removed.is_some() {
            tracing::debug!(token = %token, "draft removed");
        }
        removed
    }

    async fn restore(&self, draft: Draft) {
        let token = draft.token().clone();
        self.drafts.write().await.entry(token).or_insert(draft);
    }

    async fn sweep_idle(&self, max_idle: Duration) -> Vec<Draft> {
        let cutoff = self.clock.now().minus_secs(max_idle.as_secs());
        let mut drafts = self.drafts.write().await;
        let stale: Vec<DraftToken> = drafts
            .values()
            .filter(|d| d.last_touched_at().is_before(&cutoff))
            .map(|d| d.token().clone())
            .collect();
        stale
            .iter()
            .filter_map(|token| drafts.remove(token))
            .collect()
    }

    async fn len(&self) -> usize {
        self.drafts.read().await.len()
    }
}
