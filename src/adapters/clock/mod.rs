//! Clock and token-generator adapters.

mod manual;
mod system;

pub use manual::{ManualClock, SequentialTokenGenerator};
pub use system::{RandomTokenGenerator, SystemClock};
