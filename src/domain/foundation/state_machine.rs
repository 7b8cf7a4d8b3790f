//! State machine trait for lifecycle enums.

use super::ValidationError;

/// A status enum with a fixed transition table.
///
/// Implementors list their legal moves; validated transitions and the
/// terminal check come for free.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if moving from self to target is legal.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Every legal target from the current state.
    fn valid_transitions(&self) -> Vec<Self>;

    /// Moves to `target`, or reports the illegal move on the `status` field.
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            Ok(target)
        } else {
            Err(ValidationError::invalid_format(
                "status",
                format!("cannot transition from {:?} to {:?}", self, target),
            ))
        }
    }

    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}
