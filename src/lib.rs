//! Carbank Desk - Moderated Vehicle-Listing Desk
//!
//! A messaging-bot workflow where users submit vehicle listings with photos
//! and a pool of moderators edits, approves or rejects each listing before
//! its public channel post is completed.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
