use bevy::reflect::Reflect;
use thiserror::Error;

use crate::id::{BodyId, NodeIndex};

#[non_exhaustive]
#[derive(Debug, Error, Reflect, Clone, PartialEq, Eq)]
pub enum SkeletonError {
    #[error("A node named {0:?} already exists in the skeleton")]
    DuplicateName(String),
    #[error("Parent node {0:?} does not exist")]
    UnknownParent(NodeIndex),
    #[error("Parent node named {0:?} does not exist")]
    UnknownParentName(String),
    #[error("Skeleton already has a root, cannot add {0:?} as a second one")]
    MultipleRoots(String),
    #[error("Body {0:?} is attached to more than one node")]
    DuplicateBody(BodyId),
    #[error("Constraint references unknown body {0:?}")]
    UnknownBody(BodyId),
    #[error("Skeleton has no nodes")]
    Empty,
}
