//! State machine trait for lifecycle status enums.

use super::ValidationError;

/// Trait for status enums whose transitions are constrained.
///
/// Implementors declare which transitions are legal; `transition_to` then
/// enforces the rules wherever a status changes.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Returns true if the transition from self to target is legal.
    fn can_transition_to(&self, target: &Self) -> bool;

    /// Performs the transition, rejecting illegal ones.
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
}
