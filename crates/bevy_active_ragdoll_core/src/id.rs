use bevy::reflect::{Reflect, std_traits::ReflectDefault};
use serde::{Deserialize, Serialize};

/// Identity of an actor tracked by the ragdoll registry. The host decides what it maps to.
#[derive(
    Reflect,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
)]
#[reflect(Default)]
pub struct ActorId(pub u64);

/// Identity of a rigid body within one actor's ragdoll.
#[derive(
    Reflect,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
)]
#[reflect(Default)]
pub struct BodyId(pub u32);

/// Index of a node in a [`Skeleton`] arena.
///
/// [`Skeleton`]: crate::skeleton::Skeleton
#[derive(
    Reflect,
    Clone,
    Copy,
    Serialize,
    Deserialize,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Debug,
)]
#[reflect(Default)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for NodeIndex {
    fn from(value: usize) -> Self {
        NodeIndex(value as u32)
    }
}
