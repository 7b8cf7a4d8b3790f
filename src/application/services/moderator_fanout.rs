//! ModeratorFanout - review payloads and panel synchronisation.
//!
//! Every moderator receives the full caption plus an action panel. Panels
//! are re-rendered after each edit and closed when the draft is finalized.
//! Receivers are independent: one failing moderator never blocks the rest.

use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::draft::{Draft, PanelRef};
use crate::domain::foundation::{ChatId, UserId};
use crate::domain::listing::{render_moderator_caption, render_panel_text, ListingError};
use crate::domain::moderation::{review_controls, InlineKeyboard, PanelOutcome};
use crate::ports::{DraftStore, DraftStoreError, MessagingTransport, ReferenceData, TransportError};

/// Outcome of updating a draft's panels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelSyncReport {
    pub updated: usize,
    /// Panels that could not be edited and now show outdated content.
    pub stale: Vec<PanelRef>,
}

pub struct ModeratorFanout {
    transport: Arc<dyn MessagingTransport>,
    reference: Arc<dyn ReferenceData>,
    drafts: Arc<dyn DraftStore>,
}

impl ModeratorFanout {
    pub fn new(
        transport: Arc<dyn MessagingTransport>,
        reference: Arc<dyn ReferenceData>,
        drafts: Arc<dyn DraftStore>,
    ) -> Self {
        Self {
            transport,
            reference,
            drafts,
        }
    }

    /// Sends caption and panel to every moderator. Returns how many got both.
    ///
    /// # Errors
    ///
    /// - `NotPublished` if the draft has no public post yet
    /// - `Infrastructure` if the roster cannot be read
    pub async fn broadcast_for_review(&self, draft: &Draft) -> Result<usize, ListingError> {
        let location = draft
            .publish_location()
            .ok_or_else(|| ListingError::NotPublished(draft.token().clone()))?;
        let moderators = self
            .reference
            .list_moderators()
            .await
            .map_err(|e| ListingError::infrastructure(e.to_string()))?;

        let caption = render_moderator_caption(draft.form(), &location.stamp);
        let panel_text = render_panel_text(draft.form());
        let controls = review_controls(draft.token());

        let mut delivered = 0;
        for moderator in moderators {
            match self
                .send_review(draft, moderator, &caption, &panel_text, &controls)
                .await
            {
                Ok(panel) => match self.drafts.record_panel(draft.token(), panel).await {
                    Ok(()) => delivered += 1,
                    // approved or rejected while the fan-out was still sending
                    Err(DraftStoreError::NotFound(_)) => self.settle_orphan(draft, panel).await,
                    Err(e) => {
                        warn!(token = %draft.token(), moderator = %moderator, error = %e, "panel not recorded");
                    }
                },
                Err(e) => {
                    warn!(token = %draft.token(), moderator = %moderator, error = %e, "review delivery failed");
                }
            }
        }

        info!(token = %draft.token(), moderators = delivered, "review fan-out complete");
        Ok(delivered)
    }

    async fn send_review(
        &self,
        draft: &Draft,
        moderator: UserId,
        caption: &str,
        panel_text: &str,
        controls: &InlineKeyboard,
    ) -> Result<PanelRef, TransportError> {
        let chat_id = ChatId::from(moderator);
        if draft.has_photos() {
            self.transport
                .send_photo_group(chat_id, draft.photos(), caption)
                .await?;
        } else {
            self.transport.send_message(chat_id, caption, None).await?;
        }
        let panel = self
            .transport
            .send_message(chat_id, panel_text, Some(controls))
            .await?;
        Ok(PanelRef {
            chat_id: panel.chat_id,
            message_id: panel.message_id,
        })
    }

    /// Closes a panel that can no longer be recorded against its draft.
    async fn settle_orphan(&self, draft: &Draft, panel: PanelRef) {
        let text = PanelOutcome::Settled.text();
        match self
            .transport
            .edit_message_text(panel.chat_id, panel.message_id, text, None)
            .await
        {
            Ok(()) => debug!(token = %draft.token(), chat = %panel.chat_id, "late panel settled"),
            Err(e) => warn!(
                token = %draft.token(),
                chat = %panel.chat_id,
                message = %panel.message_id,
                error = %e,
                "late panel left interactive"
            ),
        }
    }

    /// Re-renders every recorded panel with the draft's current values.
    pub async fn refresh_panels(&self, draft: &Draft) -> PanelSyncReport {
        let text = render_panel_text(draft.form());
        let controls = review_controls(draft.token());
        self.update_panels(draft, &text, Some(&controls)).await
    }

    /// Puts every panel into its terminal state and removes the controls.
    pub async fn close_panels(&self, draft: &Draft, outcome: PanelOutcome) -> PanelSyncReport {
        self.update_panels(draft, outcome.text(), None).await
    }

    async fn update_panels(
        &self,
        draft: &Draft,
        text: &str,
        controls: Option<&InlineKeyboard>,
    ) -> PanelSyncReport {
        let mut report = PanelSyncReport::default();
        for panel in draft.panels() {
            match self
                .transport
                .edit_message_text(panel.chat_id, panel.message_id, text, controls)
                .await
            {
                Ok(()) => report.updated += 1,
                Err(e) => {
                    warn!(
                        token = %draft.token(),
                        chat = %panel.chat_id,
                        message = %panel.message_id,
                        error = %e,
                        "panel is stale"
                    );
                    report.stale.push(*panel);
                }
            }
        }
        debug!(
            token = %draft.token(),
            updated = report.updated,
            stale = report.stale.len(),
            "panels synced"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::telegram::TransportCall;
    use crate::application::test_support::{Desk, MODERATORS};
    use crate::domain::draft::FieldValue;
    use crate::domain::listing::{EditableField, PANEL_APPLIED_TEXT, PANEL_SETTLED_TEXT};

    #[tokio::test]
    async fn each_moderator_gets_caption_and_panel() {
        let desk = Desk::new();
        let draft = desk.published_draft(0).await;

        let delivered = desk.fanout.broadcast_for_review(&draft).await.unwrap();
        assert_eq!(delivered, MODERATORS.len());

        for moderator in MODERATORS {
            let sends = desk.transport.sends_to(ChatId::from(moderator));
            assert_eq!(sends.len(), 2);
            assert!(matches!(
                &sends[1],
                TransportCall::SendMessage { keyboard: Some(_), .. }
            ));
        }
        let stored = desk.drafts.get(draft.token()).await.unwrap();
        assert_eq!(stored.panels().len(), MODERATORS.len());
    }

    #[tokio::test]
    async fn photos_go_to_moderators_as_a_group() {
        let desk = Desk::new();
        let draft = desk.published_draft(3).await;
        desk.fanout.broadcast_for_review(&draft).await.unwrap();
        let sends = desk.transport.sends_to(ChatId::from(MODERATORS[0]));
        assert!(matches!(
            &sends[0],
            TransportCall::SendPhotoGroup { photos, .. } if photos.len() == 3
        ));
    }

    #[tokio::test]
    async fn failing_moderator_is_skipped() {
        let desk = Desk::new();
        let draft = desk.published_draft(0).await;
        desk.transport.fail_chat(ChatId::from(MODERATORS[0]));

        let delivered = desk.fanout.broadcast_for_review(&draft).await.unwrap();
        assert_eq!(delivered, MODERATORS.len() - 1);
        let stored = desk.drafts.get(draft.token()).await.unwrap();
        assert_eq!(stored.panels().len(), MODERATORS.len() - 1);
    }

    #[tokio::test]
    async fn panels_for_a_finalized_draft_are_closed_on_delivery() {
        let desk = Desk::new();
        let draft = desk.published_draft(0).await;
        desk.drafts.remove(draft.token()).await;

        let delivered = desk.fanout.broadcast_for_review(&draft).await.unwrap();
        assert_eq!(delivered, 0);
        for moderator in MODERATORS {
            let chat = ChatId::from(moderator);
            let panel = desk
                .transport
                .sends_to(chat)
                .into_iter()
                .find_map(|call| match call {
                    TransportCall::SendMessage {
                        message_id,
                        keyboard: Some(_),
                        ..
                    } => Some(message_id),
                    _ => None,
                })
                .unwrap();
            let shown = desk.transport.message(chat, panel).unwrap();
            assert_eq!(shown.text, PANEL_SETTLED_TEXT);
            assert!(shown.keyboard.is_none());
        }
    }

    #[tokio::test]
    async fn unpublished_draft_cannot_be_broadcast() {
        let desk = Desk::new();
        let token = desk.create_draft().await;
        let draft = desk.drafts.get(&token).await.unwrap();
        let result = desk.fanout.broadcast_for_review(&draft).await;
        assert!(matches!(result, Err(ListingError::NotPublished(_))));
    }

    #[tokio::test]
    async fn refresh_shows_new_description_and_reports_stale() {
        let desk = Desk::new();
        let draft = desk.reviewed_draft(0).await;
        let draft = desk
            .drafts
            .set_field(
                draft.token(),
                FieldValue::parse(EditableField::Description, "بدون رنگ").unwrap(),
            )
            .await
            .unwrap();
        desk.transport.fail_chat(ChatId::from(MODERATORS[1]));

        let report = desk.fanout.refresh_panels(&draft).await;
        assert_eq!(report.updated, MODERATORS.len() - 1);
        assert_eq!(report.stale.len(), 1);

        let panel = draft.panels()[0];
        let shown = desk.transport.message(panel.chat_id, panel.message_id).unwrap();
        assert!(shown.text.contains("بدون رنگ"));
        assert!(shown.keyboard.is_some());
    }

    #[tokio::test]
    async fn closing_removes_controls() {
        let desk = Desk::new();
        let draft = desk.reviewed_draft(0).await;
        let report = desk.fanout.close_panels(&draft, PanelOutcome::Applied).await;
        assert_eq!(report.updated, MODERATORS.len());
        for panel in draft.panels() {
            let shown = desk.transport.message(panel.chat_id, panel.message_id).unwrap();
            assert_eq!(shown.text, PANEL_APPLIED_TEXT);
            assert!(shown.keyboard.is_none());
        }
    }
}
