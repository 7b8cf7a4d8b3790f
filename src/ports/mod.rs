//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `MessagingTransport` - the bot platform (posts, edits, membership)
//! - `ReferenceData` - moderator roster, channel lists, listing counter
//! - `DraftStore` - token-keyed registry of in-flight drafts
//! - `Clock` / `TokenGenerator` - injected time and token sources

mod clock;
mod draft_store;
mod messaging_transport;
mod reference_data;

pub use clock::{Clock, TokenGenerator};
pub use draft_store::{DraftStore, DraftStoreError, PublishClaim};
pub use messaging_transport::{MemberStatus, MessageRef, MessagingTransport, TransportError};
pub use reference_data::{ReferenceData, ReferenceDataError, SequenceNumber};
