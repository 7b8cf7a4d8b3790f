//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, timestamps and error types that form the
//! vocabulary of the listing desk.

mod errors;
mod ids;
mod state_machine;
mod timestamp;

pub use errors::{DomainError, ErrorCode, ValidationError};
pub use ids::{ChatId, DraftToken, MessageId, PhotoRef, UserId};
pub use state_machine::StateMachine;
pub use timestamp::Timestamp;
