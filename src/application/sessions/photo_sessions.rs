//! Photo collection sessions.
//!
//! Between form submission and finalize a submitter may upload photos for
//! exactly one draft. The session counts the remaining slots; the draft
//! store stays authoritative for the photo list itself.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::draft::MAX_PHOTOS;
use crate::domain::foundation::{DraftToken, Timestamp, UserId};
use crate::ports::Clock;

/// An open upload window for one submitter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhotoCollectionSession {
    pub token: DraftToken,
    pub remaining_slots: usize,
    pub opened_at: Timestamp,
}

impl PhotoCollectionSession {
    pub fn is_exhausted(&self) -> bool {
        self.remaining_slots == 0
    }
}

/// Registry of upload sessions keyed by submitter.
pub struct PhotoCollectionSessions {
    sessions: RwLock<HashMap<UserId, PhotoCollectionSession>>,
    clock: Arc<dyn Clock>,
}

impl PhotoCollectionSessions {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Opens a session for `token`, returning any session it replaced.
    pub async fn open(
        &self,
        submitter_id: UserId,
        token: DraftToken,
    ) -> Option<PhotoCollectionSession> {
        let session = PhotoCollectionSession {
            token,
            remaining_slots: MAX_PHOTOS,
            opened_at: self.clock.now(),
        };
        self.sessions.write().await.insert(submitter_id, session)
    }

    pub async fn current(&self, submitter_id: UserId) -> Option<PhotoCollectionSession> {
        self.sessions.read().await.get(&submitter_id).cloned()
    }

    /// Takes one slot. Returns the slots left, or `None` when there is no
    /// session or it is exhausted.
    pub async fn try_consume(&self, submitter_id: UserId) -> Option<usize> {
        let mut sessions = self.sessions.write().await;
        let session = sessions.get_mut(&submitter_id)?;
        if session.is_exhausted() {
            return None;
        }
        session.remaining_slots -= 1;
        Some(session.remaining_slots)
    }

    pub async fn close(&self, submitter_id: UserId) -> Option<PhotoCollectionSession> {
        self.sessions.write().await.remove(&submitter_id)
    }

    /// Closes the submitter's session only if it still targets `token`.
    pub async fn close_for(&self, submitter_id: UserId, token: &DraftToken) -> bool {
        let mut sessions = self.sessions.write().await;
        match sessions.get(&submitter_id) {
            Some(session) if &session.token == token => {
                sessions.remove(&submitter_id);
                true
            }
            _ => false,
        }
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
