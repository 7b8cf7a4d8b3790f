//! UploadPhotoHandler - attaches photos to the submitter's open draft.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::application::services::MembershipGate;
use crate::application::sessions::PhotoCollectionSessions;
use crate::domain::draft::{PhotoAppend, MAX_PHOTOS};
use crate::domain::foundation::{DraftToken, PhotoRef, UserId};
use crate::domain::listing::ListingError;
use crate::ports::{DraftStore, DraftStoreError};

#[derive(Debug, Clone)]
pub struct UploadPhotoCommand {
    pub submitter_id: UserId,
    pub photo: PhotoRef,
}

/// What became of an uploaded photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadPhotoResult {
    Accepted { token: DraftToken, remaining: usize },
    /// The draft already holds `MAX_PHOTOS`; nothing changed.
    LimitReached { token: DraftToken, limit: usize },
    /// No open session; the photo is dropped silently.
    Ignored,
}

pub struct UploadPhotoHandler {
    gate: Arc<MembershipGate>,
    drafts: Arc<dyn DraftStore>,
    photo_sessions: Arc<PhotoCollectionSessions>,
}

impl UploadPhotoHandler {
    pub fn new(
        gate: Arc<MembershipGate>,
        drafts: Arc<dyn DraftStore>,
        photo_sessions: Arc<PhotoCollectionSessions>,
    ) -> Self {
        Self {
            gate,
            drafts,
            photo_sessions,
        }
    }

    pub async fn handle(&self, cmd: UploadPhotoCommand) -> Result<UploadPhotoResult, ListingError> {
        // 1. Find the open session
        let Some(session) = self.photo_sessions.current(cmd.submitter_id).await else {
            return Ok(UploadPhotoResult::Ignored);
        };
        if session.is_exhausted() {
            return Ok(UploadPhotoResult::LimitReached {
                token: session.token,
                limit: MAX_PHOTOS,
            });
        }

        // 2. Membership gate
        self.gate.check(cmd.submitter_id).await?;

        // 3. Append to the draft
        let token = session.token;
        match self.drafts.append_photo(&token, cmd.photo).await {
            Ok(PhotoAppend::Added { count }) => {
                let remaining = self
                    .photo_sessions
                    .try_consume(cmd.submitter_id)
                    .await
                    .unwrap_or_else(|| MAX_PHOTOS.saturating_sub(count));
                debug!(token = %token, count, remaining, "photo attached");
                Ok(UploadPhotoResult::Accepted { token, remaining })
            }
            Ok(PhotoAppend::Full) => Ok(UploadPhotoResult::LimitReached {
                token,
                limit: MAX_PHOTOS,
            }),
            Err(DraftStoreError::NotFound(_)) => {
                self.photo_sessions.close_for(cmd.submitter_id, &token).await;
                Ok(UploadPhotoResult::Ignored)
            }
            Err(e) => {
                // finalize already took the draft
                warn!(token = %token, error = %e, "photo arrived after finalize");
                self.photo_sessions.close_for(cmd.submitter_id, &token).await;
                Ok(UploadPhotoResult::Ignored)
            }
        }
    }
}
