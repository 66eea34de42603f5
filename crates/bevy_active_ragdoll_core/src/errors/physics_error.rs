use bevy::reflect::Reflect;
use thiserror::Error;

use crate::id::ActorId;

/// Errors reported by a physics collaborator.
#[non_exhaustive]
#[derive(Debug, Error, Reflect, Clone, PartialEq, Eq)]
pub enum PhysicsError {
    #[error("Ease-constraints action allocation failed for actor {0:?}")]
    EaseActionAllocation(ActorId),
    #[error("Actor {0:?} is not known to the physics world")]
    UnknownActor(ActorId),
}
