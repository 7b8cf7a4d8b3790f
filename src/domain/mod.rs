//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (identifiers, timestamps, errors, state machine)
//! - `listing` - Listing form, price, caption rendering and workflow errors
//! - `draft` - The per-token draft aggregate and its publication lifecycle
//! - `moderation` - Callback payloads, inline controls and edit intents

pub mod draft;
pub mod foundation;
pub mod listing;
pub mod moderation;
