use bevy::{
    ecs::system::Query,
    transform::components::Transform,
};

use crate::components::{BlendedPose, RagdollBones, RagdollDriverEnabled};

/// Copies the blended pose onto the visual bones of every simulated actor. Keyframed actors
/// are left to the animation system.
pub fn apply_blended_poses(
    actors: Query<(&BlendedPose, &RagdollBones, &RagdollDriverEnabled)>,
    mut transforms: Query<&mut Transform>,
) {
    for (pose, bones, enabled) in &actors {
        if !enabled.0 {
            continue;
        }
        for (bone, local) in bones.0.iter().zip(&pose.0.bones) {
            if let Ok(mut transform) = transforms.get_mut(*bone) {
                *transform = *local;
            }
        }
    }
}
