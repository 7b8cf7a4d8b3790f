//! Application layer - Handlers, Services, and Dispatch.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! Handlers own one inbound action each; services hold the logic several
//! handlers share; the dispatcher routes platform events and reports back.

mod dispatcher;
pub mod handlers;
mod policy;
pub mod services;
pub mod sessions;
mod sweeper;

#[cfg(test)]
pub(crate) mod test_support;

pub use dispatcher::{Actor, DeskDependencies, Dispatcher, InboundEvent};
pub use policy::DeskPolicy;
pub use sweeper::{IdleSweeper, IdleSweeperConfig};
