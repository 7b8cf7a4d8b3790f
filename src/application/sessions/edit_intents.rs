//! Moderator edit intents.
//!
//! At most one intent per moderator; opening a new one silently replaces
//! the old.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{DraftToken, Timestamp, UserId};
use crate::domain::moderation::EditIntent;
use crate::ports::Clock;

#[derive(Debug, Clone)]
struct OpenIntent {
    intent: EditIntent,
    opened_at: Timestamp,
}

/// Registry of edit intents keyed by moderator.
pub struct EditIntents {
    intents: RwLock<HashMap<UserId, OpenIntent>>,
    clock: Arc<dyn Clock>,
}

impl EditIntents {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            intents: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Opens an intent, returning the one it replaced.
    pub async fn begin(&self, moderator_id: UserId, intent: EditIntent) -> Option<EditIntent> {
        let open = OpenIntent {
            intent,
            opened_at: self.clock.now(),
        };
        self.intents
            .write()
            .await
            .insert(moderator_id, open)
            .map(|previous| previous.intent)
    }

    pub async fn current(&self, moderator_id: UserId) -> Option<EditIntent> {
        self.intents
            .read()
            .await
            .get(&moderator_id)
            .map(|open| open.intent.clone())
    }

    /// When the moderator's current intent was opened.
    pub async fn opened_at(&self, moderator_id: UserId) -> Option<Timestamp> {
        self.intents
            .read()
            .await
            .get(&moderator_id)
            .map(|open| open.opened_at)
    }

    pub async fn clear(&self, moderator_id: UserId) -> Option<EditIntent> {
        self.intents
            .write()
            .await
            .remove(&moderator_id)
            .map(|open| open.intent)
    }

    /// Drops every intent targeting `token`. Returns how many were dropped.
    pub async fn purge_token(&self, token: &DraftToken) -> usize {
        let mut intents = self.intents.write().await;
        let before = intents.len();
        intents.retain(|_, open| &open.intent.token != token);
        before - intents.len()
    }
}
