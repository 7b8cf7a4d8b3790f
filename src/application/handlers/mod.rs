//! Application handlers.
//!
//! One handler per inbound action. Handlers perform the domain effects and
//! return a result; replies to the acting user are rendered by the
//! dispatcher.

pub mod listing;
pub mod moderation;

pub use listing::{
    FinalizeCommand, FinalizeHandler, FinalizeResult, SubmitFormCommand, SubmitFormHandler,
    SubmitFormResult, UploadPhotoCommand, UploadPhotoHandler, UploadPhotoResult,
};
pub use moderation::{
    ApplyEditCommand, ApplyEditHandler, ApplyEditResult, ApproveCommand, ApproveHandler,
    ApproveResult, BeginEditCommand, BeginEditHandler, BeginEditResult, RejectCommand,
    RejectHandler, RejectResult,
};
