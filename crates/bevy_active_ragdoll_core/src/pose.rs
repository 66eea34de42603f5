use bevy::{
    reflect::{Reflect, std_traits::ReflectDefault},
    transform::components::Transform,
};
use serde::{Deserialize, Serialize};

use crate::{errors::RagdollError, id::ActorId};

/// Per-bone local transforms for one skeleton, ordered like [`Skeleton::bones`].
///
/// [`Skeleton::bones`]: crate::skeleton::Skeleton::bones
#[derive(Reflect, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[reflect(Default)]
pub struct Pose {
    pub bones: Vec<Transform>,
}

impl Pose {
    pub fn from_bones(bones: Vec<Transform>) -> Self {
        Self { bones }
    }

    pub fn identity(bone_count: usize) -> Self {
        Self {
            bones: vec![Transform::IDENTITY; bone_count],
        }
    }

    pub fn len(&self) -> usize {
        self.bones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Checks the pose against the expected bone count of `actor`'s skeleton.
    pub fn expect_len(
        &self,
        actor: ActorId,
        what: &'static str,
        expected: usize,
    ) -> Result<(), RagdollError> {
        if self.bones.len() == expected {
            Ok(())
        } else {
            Err(RagdollError::MalformedSkeleton {
                actor,
                what,
                expected,
                found: self.bones.len(),
            })
        }
    }
}
