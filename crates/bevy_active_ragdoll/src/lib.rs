//! # Bevy Active Ragdoll
//!
//! Bevy integration for [`bevy_active_ragdoll_core`]: actors switch between animation-driven
//! and physics-driven bones when something hits them, and get back up once they settle.
//!
//! ## Setup
//!
//! Add [`ActiveRagdollPlugin`] after the physics plugins, mark the camera (or whatever should
//! gate activation) with [`RagdollViewpoint`], and give each actor a [`RagdollActor`] with its
//! skeleton asset, plus a [`RagdollBodies`] listing one rigid body per bone.
//!
//! ```ignore
//! app.add_plugins((PhysicsPlugins::default(), ActiveRagdollPlugin::default()));
//!
//! commands.spawn((
//!     RagdollActor { skeleton: asset_server.load("humanoid.skel.ron") },
//!     RagdollBodies(bodies),
//!     Transform::default(),
//! ));
//! ```
//!
//! Each frame the animation system writes [`AnimatedPose`]; while an actor is simulated, the
//! driver writes [`BlendedPose`], which is applied to [`RagdollBones`] if present.
//!
//! Bodies are switched to `RigidBody::Kinematic` when an actor enters activation range and
//! follow the animated pose until a trigger hands them to the simulation.
//!
//! Game events are forwarded with [`RagdollTriggerEvent`]:
//! ```ignore
//! commands.trigger(RagdollTriggerEvent::collision(actor, impact_speed));
//! ```
//!
//! [`ActiveRagdollPlugin`]: plugin::ActiveRagdollPlugin
//! [`RagdollViewpoint`]: components::RagdollViewpoint
//! [`RagdollActor`]: components::RagdollActor
//! [`RagdollBodies`]: components::RagdollBodies
//! [`AnimatedPose`]: components::AnimatedPose
//! [`BlendedPose`]: components::BlendedPose
//! [`RagdollBones`]: components::RagdollBones
//! [`RagdollTriggerEvent`]: triggers::RagdollTriggerEvent

pub mod components;
pub mod ease_constraints;
pub mod errors;
pub mod loaders;
#[cfg(feature = "physics_avian")]
pub mod physics_systems_avian;
pub mod plugin;
pub mod systems;
pub mod triggers;

pub mod prelude {
    pub use super::components::*;
    pub use super::ease_constraints::EaseConstraints;
    #[cfg(feature = "physics_avian")]
    pub use super::physics_systems_avian::AvianRagdollHost;
    pub use super::plugin::{ActiveRagdollPlugin, ActiveRagdollSet};
    pub use super::triggers::RagdollTriggerEvent;
    pub use bevy_active_ragdoll_core::prelude::*;
}
