//! Draft domain module.
//!
//! The per-token aggregate that carries a listing from submission through
//! publication to approval or rejection.

mod aggregate;
mod status;

pub use aggregate::{Draft, FieldValue, PanelRef, PhotoAppend, PublishLocation, MAX_PHOTOS};
pub use status::DraftStatus;
