//! Interfaces to the animation and physics systems the core drives.
//!
//! The core never owns a physics world or an animation graph. Each tick it reads the animated
//! pose and the simulated body states through these traits, and writes back the blended pose,
//! the driver gains and the constraint easing requests.

use bevy::{math::Vec3, reflect::Reflect, transform::components::Transform};

use crate::{errors::PhysicsError, id::ActorId, pose::Pose};

/// Simulated state of one ragdoll body, in bone order.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct BodyState {
    /// Local transform of the bone driven by this body
    pub transform: Transform,
    pub linear_velocity: Vec3,
    pub angular_velocity: Vec3,
}

/// Strength with which simulated bones are pulled toward their animated targets.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq)]
pub struct DriverGains {
    pub hierarchy: f32,
    pub velocity: f32,
    pub position: f32,
}

impl DriverGains {
    pub const ZERO: Self = Self {
        hierarchy: 0.0,
        velocity: 0.0,
        position: 0.0,
    };

    pub fn scaled(self, factor: f32) -> Self {
        let factor = factor.clamp(0.0, 1.0);
        Self {
            hierarchy: self.hierarchy * factor,
            velocity: self.velocity * factor,
            position: self.position * factor,
        }
    }
}

/// Owned reference to a host constraint-easing action. Not `Clone`: exactly one
/// [`ActiveRagdoll`] holds it, and it is handed back to the host by value on release.
///
/// [`ActiveRagdoll`]: crate::active_ragdoll::ActiveRagdoll
#[derive(Debug, PartialEq, Eq)]
#[must_use = "ease-constraints actions must be released through the physics interface"]
pub struct EaseConstraintsHandle {
    actor: ActorId,
    raw: u64,
}

impl EaseConstraintsHandle {
    pub fn new(actor: ActorId, raw: u64) -> Self {
        Self { actor, raw }
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    /// Host-side identifier of the action.
    pub fn raw(&self) -> u64 {
        self.raw
    }
}

pub trait PoseSource {
    /// Current animation-driven local transforms of `actor`'s ragdoll bones.
    fn animated_pose(&self, actor: ActorId) -> Option<Pose>;
}

pub trait PhysicsInterface {
    /// Current simulated state of `actor`'s ragdoll bodies, in bone order.
    fn body_states(&self, actor: ActorId) -> Option<Vec<BodyState>>;

    /// Writes the blended local transforms into the skeletal hierarchy.
    fn write_pose(&mut self, actor: ActorId, pose: &Pose);

    /// Drives the ragdoll bodies hard to `pose`, ignoring simulation for this tick.
    fn keyframe_bodies(&mut self, actor: ActorId, pose: &Pose);

    /// Turns physics simulation of `actor`'s skeleton on or off.
    fn set_driver_enabled(&mut self, actor: ActorId, enabled: bool);

    fn set_gains(&mut self, actor: ActorId, gains: DriverGains);

    fn create_ease_constraints(
        &mut self,
        actor: ActorId,
    ) -> Result<EaseConstraintsHandle, PhysicsError>;

    /// (Re)starts easing: constraint stiffness ramps down and back up over `duration`.
    fn activate_ease_constraints(&mut self, handle: &EaseConstraintsHandle, duration: f64);

    fn release_ease_constraints(&mut self, handle: EaseConstraintsHandle);
}

/// Everything the driver needs from the host.
pub trait RagdollHost: PoseSource + PhysicsInterface {}

impl<T: PoseSource + PhysicsInterface> RagdollHost for T {}
