//! Submitter-side handlers.

mod finalize;
mod submit_form;
mod upload_photo;

pub use finalize::{FinalizeCommand, FinalizeHandler, FinalizeResult};
pub use submit_form::{SubmitFormCommand, SubmitFormHandler, SubmitFormResult};
pub use upload_photo::{UploadPhotoCommand, UploadPhotoHandler, UploadPhotoResult};
