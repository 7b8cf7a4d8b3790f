//! Moderation domain module.
//!
//! The vocabulary shared by submitters and moderators: callback payloads,
//! inline controls, edit intents and terminal panel outcomes.

mod callback;
mod intent;
mod keyboard;

pub use callback::CallbackAction;
pub use intent::{EditIntent, PanelOutcome};
pub use keyboard::{finish_controls, review_controls, InlineButton, InlineKeyboard};
