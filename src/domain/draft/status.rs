//! Publication lifecycle of a draft.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Where a draft is in its publication lifecycle.
///
/// A closed draft (approved, rejected or swept) is not represented here: it
/// is removed from the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    /// Accepting photos; not yet finalized.
    #[default]
    Collecting,
    /// A finalize request holds the publish claim.
    Publishing,
    /// Posted to the channel and awaiting moderation.
    Published,
}

impl DraftStatus {
    /// True while photos may still be attached.
    pub fn accepts_photos(&self) -> bool {
        matches!(self, DraftStatus::Collecting)
    }
}

impl StateMachine for DraftStatus {
    /// Valid transitions:
    /// - Collecting -> Publishing
    /// - Publishing -> Collecting (publish failed)
    /// - Publishing -> Published
    fn can_transition_to(&self, target: &DraftStatus) -> bool {
        use DraftStatus::*;
        matches!(
            (self, target),
            (Collecting, Publishing) | (Publishing, Collecting) | (Publishing, Published)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use DraftStatus::*;
        match self {
            Collecting => vec![Publishing],
            Publishing => vec![Collecting, Published],
            Published => vec![],
        }
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DraftStatus::Collecting => "Collecting",
            DraftStatus::Publishing => "Publishing",
            DraftStatus::Published => "Published",
        };
        write!(f, "{}", s)
    }
}
