use bevy::reflect::Reflect;
use thiserror::Error;

use crate::id::ActorId;

/// Errors raised while updating a single active ragdoll. None of them is fatal to the host:
/// the driver either drops the instance or forces it back to pure animation.
#[non_exhaustive]
#[derive(Debug, Error, Reflect, Clone, PartialEq)]
pub enum RagdollError {
    #[error("{what} for actor {actor:?} has {found} bones, expected {expected}")]
    MalformedSkeleton {
        actor: ActorId,
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Animated pose for actor {0:?} is unavailable")]
    MissingAnimatedPose(ActorId),
    #[error("Physics state for actor {0:?} is unavailable")]
    MissingPhysicsState(ActorId),
    #[error("Could not acquire an ease-constraints action for actor {0:?}")]
    EaseActionUnavailable(ActorId),
}

impl RagdollError {
    /// Whether the instance that produced this error must be removed from the registry.
    pub fn drops_instance(&self) -> bool {
        matches!(
            self,
            RagdollError::MalformedSkeleton { .. }
                | RagdollError::MissingAnimatedPose(_)
                | RagdollError::MissingPhysicsState(_)
        )
    }
}

pub type RagdollResult<T> = Result<T, RagdollError>;
