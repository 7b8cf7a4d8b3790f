//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the desk to external systems:
//! - `clock` - wall clock, random tokens, and deterministic test doubles
//! - `drafts` - in-memory draft store
//! - `reference` - moderator roster, channels and counter (file, in-memory)
//! - `telegram` - Bot API transport and update polling

pub mod clock;
pub mod drafts;
pub mod reference;
pub mod telegram;
