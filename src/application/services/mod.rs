//! Application services shared by several handlers.

mod membership_gate;
mod moderator_fanout;
mod publish_pipeline;

pub use membership_gate::MembershipGate;
pub use moderator_fanout::{ModeratorFanout, PanelSyncReport};
pub use publish_pipeline::{PostUpdate, PostWithdrawal, PublishPipeline};
