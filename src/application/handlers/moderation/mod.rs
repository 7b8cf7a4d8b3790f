//! Moderator-side handlers.

mod apply_edit;
mod approve;
mod begin_edit;
mod reject;

pub use apply_edit::{ApplyEditCommand, ApplyEditHandler, ApplyEditResult};
pub use approve::{ApproveCommand, ApproveHandler, ApproveResult};
pub use begin_edit::{BeginEditCommand, BeginEditHandler, BeginEditResult};
pub use reject::{RejectCommand, RejectHandler, RejectResult};
