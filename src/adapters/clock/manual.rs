//! Deterministic time and token sources for tests and local runs.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use crate::domain::foundation::{DraftToken, Timestamp};
use crate::ports::{Clock, TokenGenerator};

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Timestamp>,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn advance_secs(&self, secs: u64) {
        let mut now = self.now.lock().unwrap_or_else(|e| e.into_inner());
        *now = now.plus_secs(secs);
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(Timestamp::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.now.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// Tokens `t1`, `t2`, ... in order.
#[derive(Debug, Default)]
pub struct SequentialTokenGenerator {
    next: AtomicU64,
}

impl SequentialTokenGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenGenerator for SequentialTokenGenerator {
    fn next_token(&self) -> DraftToken {
        let n = self.next.fetch_add(1, Ordering::SeqCst) + 1;
        match DraftToken::parse(&format!("t{}", n)) {
            Ok(token) => token,
            Err(_) => DraftToken::new(),
        }
    }
}
