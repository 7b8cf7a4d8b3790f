//! Reference data adapters.
//!
//! - `FileReferenceData` - JSON files in a data directory
//! - `InMemoryReferenceData` - same semantics, no disk

mod file;
mod in_memory;
mod state;

pub use file::FileReferenceData;
pub use in_memory::InMemoryReferenceData;
pub use state::ReferenceBootstrap;
