use bevy::{
    asset::Handle,
    ecs::{component::Component, entity::Entity, resource::Resource},
    reflect::Reflect,
};
use bevy_active_ragdoll_core::{
    config::RagdollOptions, host::DriverGains, id::ActorId, pose::Pose, registry::RagdollContext,
    skeleton::Skeleton,
};

/// Marks the entity whose position gates ragdoll activation, usually the camera.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
pub struct RagdollViewpoint;

/// An actor that can be ragdolled. Its [`GlobalTransform`] is the root of the skeleton.
///
/// [`GlobalTransform`]: bevy::transform::components::GlobalTransform
#[derive(Component, Reflect, Debug, Clone, Default)]
#[require(
    AnimatedPose,
    BlendedPose,
    RagdollBodies,
    RagdollDriveGains,
    RagdollDriverEnabled,
    RagdollConstraintStiffness
)]
pub struct RagdollActor {
    pub skeleton: Handle<Skeleton>,
}

/// Animation-driven local transforms of the skeleton's bones, written by the animation system.
#[derive(Component, Reflect, Debug, Clone, Default)]
pub struct AnimatedPose(pub Pose);

/// Local bone transforms produced by the ragdoll driver while the actor is simulated.
#[derive(Component, Reflect, Debug, Clone, Default)]
pub struct BlendedPose(pub Pose);

/// Rigid body entities, one per skeleton bone, in bone order.
#[derive(Component, Reflect, Debug, Clone, Default)]
pub struct RagdollBodies(pub Vec<Entity>);

/// Visual bone entities the blended pose is applied to, in bone order. Optional.
#[derive(Component, Reflect, Debug, Clone, Default)]
pub struct RagdollBones(pub Vec<Entity>);

/// Strength with which the simulated bodies are pulled toward the animated pose.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
pub struct RagdollDriveGains(pub DriverGains);

/// Whether physics currently drives the actor's bodies.
#[derive(Component, Reflect, Debug, Clone, Copy, Default)]
pub struct RagdollDriverEnabled(pub bool);

/// Multiplier on constraint and drive stiffness, lowered while constraints are being eased.
#[derive(Component, Reflect, Debug, Clone, Copy)]
pub struct RagdollConstraintStiffness(pub f32);

impl Default for RagdollConstraintStiffness {
    fn default() -> Self {
        Self(1.0)
    }
}

/// The options snapshot used by the driver. When `source` is set, the loaded asset replaces
/// `options` whenever it changes.
#[derive(Resource, Debug, Clone, Default)]
pub struct ActiveRagdollOptions {
    pub options: RagdollOptions,
    pub source: Option<Handle<RagdollOptions>>,
}

#[derive(Resource, Debug, Default)]
pub struct RagdollContextResource(pub RagdollContext);

pub fn actor_id(entity: Entity) -> ActorId {
    ActorId(entity.to_bits())
}

pub fn actor_entity(actor: ActorId) -> Entity {
    Entity::from_bits(actor.0)
}
