//! Per-actor conversational state.
//!
//! - `PhotoCollectionSessions` - submitter upload windows
//! - `EditIntents` - moderators awaiting a field value

mod edit_intents;
mod photo_sessions;

pub use edit_intents::EditIntents;
pub use photo_sessions::{PhotoCollectionSession, PhotoCollectionSessions};
