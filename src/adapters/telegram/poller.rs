//! UpdatePoller - long-polls the Bot API and feeds the dispatcher.
//!
//! Updates are dispatched one at a time in arrival order. The offset moves
//! past every received update, including ones that map to no event.
//!
//! ## Graceful Shutdown
//!
//! The poller listens for a shutdown signal; an in-flight long poll is
//! abandoned, an in-flight dispatch is completed.

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;
use tracing::{debug, info, warn};

use super::client::BotApiClient;
use super::wire::{Message, PhotoSize, Update, User};
use crate::application::{Actor, Dispatcher, InboundEvent};
use crate::domain::foundation::{ChatId, MessageId, PhotoRef, UserId};
use crate::ports::{MessageRef, TransportError};

/// Anything that yields Bot API updates after an offset.
#[async_trait]
pub trait UpdateSource: Send + Sync {
    async fn fetch(&self, offset: Option<i64>) -> Result<Vec<Update>, TransportError>;
}

#[async_trait]
impl UpdateSource for BotApiClient {
    async fn fetch(&self, offset: Option<i64>) -> Result<Vec<Update>, TransportError> {
        self.get_updates(offset).await
    }
}

#[derive(Debug, Clone)]
pub struct UpdatePollerConfig {
    /// Pause after a failed poll before trying again.
    pub error_backoff: Duration,
}

impl Default for UpdatePollerConfig {
    fn default() -> Self {
        Self {
            error_backoff: Duration::from_secs(3),
        }
    }
}

impl UpdatePollerConfig {
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }
}

pub struct UpdatePoller {
    source: Arc<dyn UpdateSource>,
    dispatcher: Arc<Dispatcher>,
    config: UpdatePollerConfig,
}

impl UpdatePoller {
    pub fn new(source: Arc<dyn UpdateSource>, dispatcher: Arc<Dispatcher>) -> Self {
        Self::with_config(source, dispatcher, UpdatePollerConfig::default())
    }

    pub fn with_config(
        source: Arc<dyn UpdateSource>,
        dispatcher: Arc<Dispatcher>,
        config: UpdatePollerConfig,
    ) -> Self {
        Self {
            source,
            dispatcher,
            config,
        }
    }

    /// Polls until `shutdown` flips to `true`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut offset = None;
        info!("update polling started");
        loop {
            if *shutdown.borrow() {
                info!("update polling stopped");
                return;
            }
            let polled = tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        info!("update polling stopped");
                        return;
                    }
                    continue;
                }
                polled = self.source.fetch(offset) => polled,
            };

            match polled {
                Ok(updates) => offset = self.dispatch_batch(updates, offset).await,
                Err(e) => {
                    warn!(error = %e, "update poll failed");
                    tokio::select! {
                        _ = shutdown.changed() => {}
                        _ = time::sleep(self.config.error_backoff) => {}
                    }
                }
            }
        }
    }

    /// Dispatches a batch and returns the next offset.
    pub async fn dispatch_batch(&self, updates: Vec<Update>, offset: Option<i64>) -> Option<i64> {
        let mut next = offset;
        for update in updates {
            next = Some(next.map_or(update.update_id + 1, |n| n.max(update.update_id + 1)));
            let update_id = update.update_id;
            match to_inbound_event(update) {
                Some(event) => self.dispatcher.dispatch(event).await,
                None => debug!(update_id, "update skipped"),
            }
        }
        next
    }
}

fn actor(user: &User) -> Actor {
    let actor = Actor::new(UserId::new(user.id));
    match user.username.as_deref() {
        Some(handle) if !handle.is_empty() => actor.with_handle(handle),
        _ => actor,
    }
}

fn message_ref(message: &Message) -> MessageRef {
    MessageRef {
        chat_id: ChatId::new(message.chat.id),
        message_id: MessageId::new(message.message_id),
    }
}

/// Picks the highest-resolution size.
fn largest(sizes: &[PhotoSize]) -> Option<&PhotoSize> {
    sizes
        .iter()
        .enumerate()
        .max_by_key(|(i, size)| (u64::from(size.width) * u64::from(size.height), *i))
        .map(|(_, size)| size)
}

/// Maps a raw update to an event, or `None` for updates the desk ignores.
pub fn to_inbound_event(update: Update) -> Option<InboundEvent> {
    if let Some(query) = update.callback_query {
        return Some(InboundEvent::ButtonPressed {
            actor: actor(&query.from),
            message: query.message.as_ref().map(message_ref),
            callback_id: query.id,
            data: query.data?,
        });
    }

    let message = update.message?;
    let actor = actor(message.from.as_ref()?);
    let chat_id = ChatId::new(message.chat.id);

    if let Some(web_app) = message.web_app_data {
        return Some(InboundEvent::FormSubmitted {
            actor,
            chat_id,
            payload: web_app.data,
        });
    }
    if let Some(sizes) = &message.photo {
        let photo = PhotoRef::new(largest(sizes)?.file_id.clone()).ok()?;
        return Some(InboundEvent::PhotoReceived {
            actor,
            chat_id,
            photo,
        });
    }
    message.text.map(|text| InboundEvent::TextReceived {
        actor,
        chat_id,
        text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(value: serde_json::Value) -> Update {
        serde_json::from_value(value).unwrap()
    }

    fn from() -> serde_json::Value {
        json!({"id": 42, "is_bot": false, "first_name": "S", "username": "seller"})
    }

    #[test]
    fn web_app_data_becomes_form() {
        let event = to_inbound_event(update(json!({
            "update_id": 1,
            "message": {
                "message_id": 9, "date": 0,
                "chat": {"id": 42, "type": "private"},
                "from": from(),
                "web_app_data": {"data": "{\"car\":\"x\"}", "button_text": "فرم"}
            }
        })));
        assert_eq!(
            event,
            Some(InboundEvent::FormSubmitted {
                actor: Actor::new(UserId::new(42)).with_handle("seller"),
                chat_id: ChatId::new(42),
                payload: "{\"car\":\"x\"}".to_string(),
            })
        );
    }

    #[test]
    fn photo_uses_largest_size() {
        let event = to_inbound_event(update(json!({
            "update_id": 2,
            "message": {
                "message_id": 9, "date": 0,
                "chat": {"id": 42, "type": "private"},
                "from": from(),
                "photo": [
                    {"file_id": "small", "file_unique_id": "a", "width": 90, "height": 60},
                    {"file_id": "big", "file_unique_id": "b", "width": 1280, "height": 853},
                    {"file_id": "mid", "file_unique_id": "c", "width": 320, "height": 213}
                ]
            }
        })));
        assert!(matches!(
            event,
            Some(InboundEvent::PhotoReceived { photo, .. }) if photo.as_str() == "big"
        ));
    }

    #[test]
    fn callback_keeps_pressed_message() {
        let event = to_inbound_event(update(json!({
            "update_id": 3,
            "callback_query": {
                "id": "cb", "from": from(), "data": "finish:t1",
                "message": {"message_id": 7, "date": 0, "chat": {"id": 42, "type": "private"}}
            }
        })));
        assert_eq!(
            event,
            Some(InboundEvent::ButtonPressed {
                actor: Actor::new(UserId::new(42)).with_handle("seller"),
                callback_id: "cb".to_string(),
                data: "finish:t1".to_string(),
                message: Some(MessageRef {
                    chat_id: ChatId::new(42),
                    message_id: MessageId::new(7),
                }),
            })
        );
    }

    #[test]
    fn unsupported_updates_are_skipped() {
        let channel_post = update(json!({"update_id": 4}));
        assert!(to_inbound_event(channel_post).is_none());

        let sticker = update(json!({
            "update_id": 5,
            "message": {"message_id": 1, "date": 0, "chat": {"id": 42, "type": "private"}, "from": from()}
        }));
        assert!(to_inbound_event(sticker).is_none());
    }

    #[test]
    fn text_message_maps_to_text_event() {
        let event = to_inbound_event(update(json!({
            "update_id": 6,
            "message": {
                "message_id": 1, "date": 0,
                "chat": {"id": 2000, "type": "private"},
                "from": {"id": 2000, "is_bot": false, "first_name": "M"},
                "text": "120.5"
            }
        })));
        assert_eq!(
            event,
            Some(InboundEvent::TextReceived {
                actor: Actor::new(UserId::new(2000)),
                chat_id: ChatId::new(2000),
                text: "120.5".to_string(),
            })
        );
    }

    mod polling {
        use super::*;
        use crate::adapters::clock::{ManualClock, SequentialTokenGenerator};
        use crate::adapters::drafts::InMemoryDraftStore;
        use crate::adapters::reference::InMemoryReferenceData;
        use crate::adapters::telegram::RecordingTransport;
        use crate::application::{DeskDependencies, DeskPolicy};
        use std::sync::Mutex;

        /// Returns each scripted batch once, then fails.
        struct ScriptedSource {
            batches: Mutex<Vec<Vec<Update>>>,
            offsets: Mutex<Vec<Option<i64>>>,
        }

        #[async_trait]
        impl UpdateSource for ScriptedSource {
            async fn fetch(&self, offset: Option<i64>) -> Result<Vec<Update>, TransportError> {
                self.offsets.lock().unwrap().push(offset);
                let mut batches = self.batches.lock().unwrap();
                if batches.is_empty() {
                    Err(TransportError::Network("script exhausted".to_string()))
                } else {
                    Ok(batches.remove(0))
                }
            }
        }

        fn dispatcher(transport: &RecordingTransport) -> Arc<Dispatcher> {
            let clock = Arc::new(ManualClock::default());
            Arc::new(Dispatcher::new(DeskDependencies {
                transport: Arc::new(transport.clone()),
                reference: Arc::new(InMemoryReferenceData::new(clock.clone())),
                drafts: Arc::new(InMemoryDraftStore::new(
                    clock.clone(),
                    Arc::new(SequentialTokenGenerator::new()),
                )),
                clock,
                policy: DeskPolicy::default(),
            }))
        }

        fn text_update(id: i64, text: &str) -> Update {
            update(json!({
                "update_id": id,
                "message": {
                    "message_id": id, "date": 0,
                    "chat": {"id": 42, "type": "private"},
                    "from": from(),
                    "text": text
                }
            }))
        }

        #[tokio::test]
        async fn offset_moves_past_every_update() {
            let transport = RecordingTransport::new();
            let source = Arc::new(ScriptedSource {
                batches: Mutex::new(vec![]),
                offsets: Mutex::new(vec![]),
            });
            let poller = UpdatePoller::new(source, dispatcher(&transport));

            let updates = vec![text_update(10, "a"), update(json!({"update_id": 11}))];
            assert_eq!(poller.dispatch_batch(updates, None).await, Some(12));
            assert_eq!(poller.dispatch_batch(vec![], Some(12)).await, Some(12));
        }

        #[tokio::test]
        async fn run_requests_next_offset_and_stops() {
            let transport = RecordingTransport::new();
            let source = Arc::new(ScriptedSource {
                batches: Mutex::new(vec![vec![text_update(5, "hi")]]),
                offsets: Mutex::new(vec![]),
            });
            let poller = UpdatePoller::with_config(
                source.clone(),
                dispatcher(&transport),
                UpdatePollerConfig::default().with_error_backoff(Duration::from_secs(60)),
            );
            let (tx, rx) = watch::channel(false);
            let handle = tokio::spawn(async move { poller.run(rx).await });

            while source.offsets.lock().unwrap().len() < 2 {
                tokio::task::yield_now().await;
            }
            tx.send(true).unwrap();
            handle.await.unwrap();

            let offsets = source.offsets.lock().unwrap().clone();
            assert_eq!(&offsets[..2], &[None, Some(6)]);
        }
    }
}
