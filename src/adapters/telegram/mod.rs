//! Telegram Bot API adapters.
//!
//! - `BotApiClient` - HTTPS transport
//! - `UpdatePoller` - long-polling update source
//! - `RecordingTransport` - in-process double with failure injection

mod client;
mod poller;
mod recording;
mod wire;

pub use client::{BotApiClient, BotApiConfig};
pub use poller::{to_inbound_event, UpdatePoller, UpdatePollerConfig, UpdateSource};
pub use recording::{RecordedMessage, RecordingTransport, TransportCall, TransportOp};
pub use wire::Update;
