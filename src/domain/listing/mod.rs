//! Listing domain module.
//!
//! The content of a vehicle listing: the validated form, the price value
//! object, caption rendering and the workflow error taxonomy.

mod caption;
mod errors;
mod form;
mod price;
pub mod text;

pub use caption::{
    render_moderator_caption, render_panel_text, render_public_caption, ListingStamp,
    PublicContact, Reveal, PANEL_APPLIED_TEXT, PANEL_DESCRIPTION_PREVIEW, PANEL_REJECTED_TEXT,
    PANEL_SETTLED_TEXT, WITHDRAWN_POST_TEXT,
};
pub use errors::ListingError;
pub use form::{EditableField, ListingForm, RawSubmission};
pub use price::{Price, UNITS_PER_MILLION};

#[cfg(test)]
pub(crate) use form::fixtures;
