//! PublishPipeline - everything that touches the public channel post.
//!
//! Renders and sends the first post, rewrites it on approval and withdraws
//! it on rejection.

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::draft::{Draft, PublishLocation};
use crate::domain::foundation::ChatId;
use crate::domain::listing::{render_public_caption, ListingError, PublicContact, WITHDRAWN_POST_TEXT};
use crate::ports::{MessageRef, MessagingTransport, ReferenceData, TransportError};

/// How an approved caption reached the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostUpdate {
    EditedInPlace,
    /// The post could not be edited; a new message carries the caption.
    Reposted(MessageRef),
}

/// What happened to the public post of a rejected draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PostWithdrawal {
    Deleted,
    MarkedWithdrawn,
    /// Neither delete nor edit went through.
    Untouched,
}

pub struct PublishPipeline {
    transport: Arc<dyn MessagingTransport>,
    reference: Arc<dyn ReferenceData>,
    contact: Option<PublicContact>,
}

impl PublishPipeline {
    pub fn new(
        transport: Arc<dyn MessagingTransport>,
        reference: Arc<dyn ReferenceData>,
        contact: Option<PublicContact>,
    ) -> Self {
        Self {
            transport,
            reference,
            contact,
        }
    }

    /// Sends the first, partially revealed post to `destination`.
    ///
    /// Callers must hold the draft's publish claim.
    ///
    /// # Errors
    ///
    /// - `Infrastructure` if no sequence number can be allocated
    /// - `Transport` if the post cannot be sent
    pub async fn publish_initial(
        &self,
        draft: &Draft,
        destination: ChatId,
    ) -> Result<PublishLocation, ListingError> {
        let stamp = self
            .reference
            .next_sequence_number()
            .await
            .map_err(|e| ListingError::infrastructure(e.to_string()))?
            .stamp();

        let caption = render_public_caption(
            draft.form(),
            &stamp,
            draft.initial_reveal(),
            self.contact.as_ref(),
        );

        let mut sent = if draft.has_photos() {
            self.transport
                .send_photo_group(destination, draft.photos(), &caption)
                .await
        } else {
            self.transport
                .send_message(destination, &caption, None)
                .await
                .map(|message| vec![message])
        }
        .map_err(|e| ListingError::transport(e.to_string()))?
        .into_iter();
        let first = sent
            .next()
            .ok_or_else(|| ListingError::transport("post returned no message"))?;

        info!(
            token = %draft.token(),
            channel = %first.chat_id,
            message = %first.message_id,
            number = stamp.number,
            "listing posted"
        );

        Ok(PublishLocation {
            channel_id: first.chat_id,
            message_id: first.message_id,
            trailing_message_ids: sent.map(|message| message.message_id).collect(),
            has_photos: draft.has_photos(),
            stamp,
        })
    }

    /// Rewrites the post with the approval reveal, reposting if the edit fails.
    ///
    /// # Errors
    ///
    /// - `NotPublished` if the draft has no post
    /// - `Transport` if both the edit and the repost fail
    pub async fn apply_approval(&self, draft: &Draft) -> Result<PostUpdate, ListingError> {
        let location = draft
            .publish_location()
            .ok_or_else(|| ListingError::NotPublished(draft.token().clone()))?;

        let caption = render_public_caption(
            draft.form(),
            &location.stamp,
            draft.approval_reveal(),
            self.contact.as_ref(),
        );

        let edited = if location.has_photos {
            self.transport
                .edit_message_caption(location.channel_id, location.message_id, &caption)
                .await
        } else {
            self.transport
                .edit_message_text(location.channel_id, location.message_id, &caption, None)
                .await
        };

        match edited {
            Ok(()) => Ok(PostUpdate::EditedInPlace),
            Err(edit_err) => {
                warn!(
                    token = %draft.token(),
                    error = %edit_err,
                    "post edit failed, reposting"
                );
                let reposted = self
                    .transport
                    .send_message(location.channel_id, &caption, None)
                    .await
                    .map_err(|e: TransportError| {
                        ListingError::transport(format!("edit: {}; repost: {}", edit_err, e))
                    })?;
                Ok(PostUpdate::Reposted(reposted))
            }
        }
    }

    /// Deletes every message of the post.
    ///
    /// Album items are deleted independently of the caption carrier. If the
    /// caption carrier cannot be deleted its text is replaced instead.
    pub async fn withdraw(&self, location: &PublishLocation) -> PostWithdrawal {
        for message_id in location.trailing_message_ids.iter().copied() {
            if let Err(e) = self
                .transport
                .delete_message(location.channel_id, message_id)
                .await
            {
                warn!(
                    channel = %location.channel_id,
                    message = %message_id,
                    error = %e,
                    "album item left in channel"
                );
            }
        }

        let delete_err = match self
            .transport
            .delete_message(location.channel_id, location.message_id)
            .await
        {
            Ok(()) => return PostWithdrawal::Deleted,
            Err(e) => e,
        };

        let marked = if location.has_photos {
            self.transport
                .edit_message_caption(location.channel_id, location.message_id, WITHDRAWN_POST_TEXT)
                .await
        } else {
            self.transport
                .edit_message_text(
                    location.channel_id,
                    location.message_id,
                    WITHDRAWN_POST_TEXT,
                    None,
                )
                .await
        };

        match marked {
            Ok(()) => PostWithdrawal::MarkedWithdrawn,
            Err(e) => {
                warn!(
                    channel = %location.channel_id,
                    message = %location.message_id,
                    delete_error = %delete_err,
                    edit_error = %e,
                    "could not withdraw post"
                );
                PostWithdrawal::Untouched
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use crate::adapters::clock::ManualClock;
    use crate::adapters::reference::InMemoryReferenceData;
    use crate::adapters::telegram::{RecordingTransport, TransportCall, TransportOp};
    use crate::domain::draft::FieldValue;
    use crate::domain::foundation::{DraftToken, PhotoRef, Timestamp, UserId};
    use crate::domain::listing::fixtures::valid_form;
    use crate::domain::listing::{EditableField, Price};

    const CHANNEL: ChatId = ChatId::new(-500);

    fn pipeline(transport: &RecordingTransport) -> PublishPipeline {
        let reference = InMemoryReferenceData::new(Arc::new(ManualClock::default()));
        PublishPipeline::new(Arc::new(transport.clone()), Arc::new(reference), None)
    }

    fn draft(photos: usize) -> Draft {
        let mut draft = Draft::new(
            DraftToken::parse("t1").unwrap(),
            UserId::new(1),
            valid_form(),
            BTreeSet::from([EditableField::Price, EditableField::Description]),
            Timestamp::now(),
        );
        for i in 0..photos {
            draft
                .append_photo(PhotoRef::new(format!("p{}", i)).unwrap(), Timestamp::now())
                .unwrap();
        }
        draft
    }

    async fn published(transport: &RecordingTransport, mut draft: Draft) -> Draft {
        draft.begin_publish(Timestamp::now()).unwrap();
        let location = pipeline(transport).publish_initial(&draft, CHANNEL).await.unwrap();
        draft.set_publish_location(location, Timestamp::now()).unwrap();
        draft
    }

    #[tokio::test]
    async fn text_post_hides_pending_fields() {
        let transport = RecordingTransport::new();
        let draft = published(&transport, draft(0)).await;
        let location = draft.publish_location().unwrap();
        assert!(!location.has_photos);
        assert_eq!(location.stamp.number, 1);

        let posted = transport.message(CHANNEL, location.message_id).unwrap();
        assert!(!posted.text.contains("80 میلیون"));
        assert_eq!(transport.sends_to(CHANNEL).len(), 1);
    }

    #[tokio::test]
    async fn photo_post_uses_photo_group() {
        let transport = RecordingTransport::new();
        let draft = published(&transport, draft(2)).await;
        let location = draft.publish_location().unwrap();
        assert!(location.has_photos);
        assert_eq!(location.message_ids().count(), 2);
        assert!(matches!(
            transport.sends_to(CHANNEL).as_slice(),
            [TransportCall::SendPhotoGroup { photos, .. }] if photos.len() == 2
        ));
    }

    #[tokio::test]
    async fn failed_send_is_a_transport_error() {
        let transport = RecordingTransport::new();
        transport.fail_chat(CHANNEL);
        let mut draft = draft(0);
        draft.begin_publish(Timestamp::now()).unwrap();
        let result = pipeline(&transport).publish_initial(&draft, CHANNEL).await;
        assert!(matches!(result, Err(ListingError::Transport(_))));
    }

    #[tokio::test]
    async fn approval_edits_in_place_and_reveals_edited_price() {
        let transport = RecordingTransport::new();
        let mut draft = published(&transport, draft(0)).await;
        draft.set_field(
            FieldValue::Price(Price::parse_millions("95").unwrap()),
            Timestamp::now(),
        );

        let update = pipeline(&transport).apply_approval(&draft).await.unwrap();
        assert_eq!(update, PostUpdate::EditedInPlace);
        let location = draft.publish_location().unwrap();
        let posted = transport.message(CHANNEL, location.message_id).unwrap();
        assert!(posted.text.contains(&draft.form().price_words()));
    }

    #[tokio::test]
    async fn approval_reposts_when_edit_fails() {
        let transport = RecordingTransport::new();
        let draft = published(&transport, draft(0)).await;
        transport.fail_operation(TransportOp::EditText);

        let update = pipeline(&transport).apply_approval(&draft).await.unwrap();
        assert!(matches!(update, PostUpdate::Reposted(r) if r.chat_id == CHANNEL));
        assert_eq!(transport.sends_to(CHANNEL).len(), 2);
    }

    #[tokio::test]
    async fn approval_fails_when_repost_fails_too() {
        let transport = RecordingTransport::new();
        let draft = published(&transport, draft(1)).await;
        transport.fail_chat(CHANNEL);
        let result = pipeline(&transport).apply_approval(&draft).await;
        assert!(matches!(result, Err(ListingError::Transport(_))));
    }

    #[tokio::test]
    async fn approval_requires_publication() {
        let transport = RecordingTransport::new();
        let result = pipeline(&transport).apply_approval(&draft(0)).await;
        assert!(matches!(result, Err(ListingError::NotPublished(_))));
    }

    #[tokio::test]
    async fn withdraw_deletes_then_falls_back_to_marking() {
        let transport = RecordingTransport::new();
        let draft = published(&transport, draft(0)).await;
        let location = draft.publish_location().unwrap().clone();

        transport.fail_operation(TransportOp::Delete);
        let outcome = pipeline(&transport).withdraw(&location).await;
        assert_eq!(outcome, PostWithdrawal::MarkedWithdrawn);
        let posted = transport.message(CHANNEL, location.message_id).unwrap();
        assert_eq!(posted.text, WITHDRAWN_POST_TEXT);

        transport.clear_failures();
        assert_eq!(
            pipeline(&transport).withdraw(&location).await,
            PostWithdrawal::Deleted
        );
    }

    #[tokio::test]
    async fn withdraw_deletes_whole_album() {
        let transport = RecordingTransport::new();
        let draft = published(&transport, draft(3)).await;
        let location = draft.publish_location().unwrap().clone();

        let outcome = pipeline(&transport).withdraw(&location).await;
        assert_eq!(outcome, PostWithdrawal::Deleted);
        for message_id in location.message_ids() {
            assert!(transport.message(CHANNEL, message_id).unwrap().deleted);
        }
    }

    #[tokio::test]
    async fn withdraw_marks_caption_when_album_cannot_be_deleted() {
        let transport = RecordingTransport::new();
        let draft = published(&transport, draft(2)).await;
        let location = draft.publish_location().unwrap().clone();

        transport.fail_operation(TransportOp::Delete);
        let outcome = pipeline(&transport).withdraw(&location).await;
        assert_eq!(outcome, PostWithdrawal::MarkedWithdrawn);
        let caption = transport.message(CHANNEL, location.message_id).unwrap();
        assert_eq!(caption.text, WITHDRAWN_POST_TEXT);
    }
}
