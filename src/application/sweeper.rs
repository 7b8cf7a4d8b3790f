//! IdleSweeper - background removal of abandoned drafts.
//!
//! Drafts are kept indefinitely by default. When a TTL is configured this
//! service periodically drops drafts nobody touched for longer than the TTL,
//! together with the photo sessions and edit intents pointing at them.
//! Published posts and panels of swept drafts are left as they are.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{debug, info};

use super::sessions::{EditIntents, PhotoCollectionSessions};
use crate::ports::DraftStore;

#[derive(Debug, Clone)]
pub struct IdleSweeperConfig {
    /// Drafts idle for longer than this are removed.
    pub max_idle: Duration,
    /// How often to look for idle drafts.
    pub interval: Duration,
}

impl IdleSweeperConfig {
    pub fn new(max_idle: Duration) -> Self {
        Self {
            max_idle,
            interval: Duration::from_secs(300),
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

pub struct IdleSweeper {
    drafts: Arc<dyn DraftStore>,
    photo_sessions: Arc<PhotoCollectionSessions>,
    intents: Arc<EditIntents>,
    config: IdleSweeperConfig,
}

impl IdleSweeper {
    pub fn new(
        drafts: Arc<dyn DraftStore>,
        photo_sessions: Arc<PhotoCollectionSessions>,
        intents: Arc<EditIntents>,
        config: IdleSweeperConfig,
    ) -> Self {
        Self {
            drafts,
            photo_sessions,
            intents,
            config,
        }
    }

    /// Sweeps until `shutdown` flips to `true`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.interval);
        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        debug!("idle sweeper stopping");
                        return;
                    }
                }
                _ = interval.tick() => {
                    self.sweep_once().await;
                }
            }
        }
    }

    /// One pass. Returns how many drafts were removed.
    pub async fn sweep_once(&self) -> usize {
        let swept = self.drafts.sweep_idle(self.config.max_idle).await;
        for draft in &swept {
            self.photo_sessions
                .close_for(draft.submitter_id(), draft.token())
                .await;
            self.intents.purge_token(draft.token()).await;
            debug!(token = %draft.token(), "idle draft swept");
        }
        if !swept.is_empty() {
            info!(count = swept.len(), "idle drafts removed");
        }
        swept.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::test_support::{Desk, ADMIN, SUBMITTER};
    use crate::domain::listing::EditableField;
    use crate::domain::moderation::EditIntent;

    fn sweeper(desk: &Desk) -> IdleSweeper {
        IdleSweeper::new(
            desk.drafts.clone(),
            desk.photo_sessions.clone(),
            desk.intents.clone(),
            IdleSweeperConfig::new(Duration::from_secs(3600)),
        )
    }

    #[tokio::test]
    async fn removes_idle_drafts_with_their_sessions() {
        let desk = Desk::new();
        let token = desk.create_draft().await;
        desk.photo_sessions.open(SUBMITTER, token.clone()).await;
        desk.intents
            .begin(ADMIN, EditIntent::new(token.clone(), EditableField::Price))
            .await;

        desk.clock.advance_secs(3601);
        assert_eq!(sweeper(&desk).sweep_once().await, 1);
        assert!(desk.drafts.get(&token).await.is_none());
        assert!(desk.photo_sessions.current(SUBMITTER).await.is_none());
        assert!(desk.intents.current(ADMIN).await.is_none());
    }

    #[tokio::test]
    async fn fresh_drafts_survive() {
        let desk = Desk::new();
        let token = desk.create_draft().await;
        desk.clock.advance_secs(60);
        assert_eq!(sweeper(&desk).sweep_once().await, 0);
        assert!(desk.drafts.get(&token).await.is_some());
    }

    #[tokio::test]
    async fn run_stops_on_shutdown() {
        let desk = Desk::new();
        let sweeper = IdleSweeper::new(
            desk.drafts.clone(),
            desk.photo_sessions.clone(),
            desk.intents.clone(),
            IdleSweeperConfig::new(Duration::from_secs(60)).with_interval(Duration::from_millis(10)),
        );
        let (tx, rx) = watch::channel(false);
        let handle = tokio::spawn(async move { sweeper.run(rx).await });
        tx.send(true).unwrap();
        handle.await.unwrap();
    }
}
