//! Clock and token-generator ports.
//!
//! Injected into the session registries so tests control time and tokens.

use crate::domain::foundation::{DraftToken, Timestamp};

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

pub trait TokenGenerator: Send + Sync {
    /// Returns a token never handed out before.
    fn next_token(&self) -> DraftToken;
}
