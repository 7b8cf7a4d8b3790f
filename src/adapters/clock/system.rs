//! Production time and token sources.

use crate::domain::foundation::{DraftToken, Timestamp};
use crate::ports::{Clock, TokenGenerator};

/// Wall-clock time in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// Random v4-UUID tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenGenerator;

impl TokenGenerator for RandomTokenGenerator {
    fn next_token(&self) -> DraftToken {
        DraftToken::new()
    }
}
