//! # Bevy Active Ragdoll Core
//!
//! Engine-agnostic core of an active ragdoll: the logic that decides, per actor, when a
//! skeleton moves from animation-driven ("keyframed") to physics-driven and back, and how bone
//! transforms are blended across that change.
//!
//! ## Overview
//!
//! - [`RagdollContext`] owns every [`ActiveRagdoll`]. Each tick the host calls
//!   [`RagdollContext::tick`] with its current time, a viewpoint and the list of loaded actors.
//!   Actors closer than `active_ragdoll_start_distance` become active; they are only
//!   deactivated again once further than `active_ragdoll_end_distance`.
//! - Host events (collisions, grabs, deaths, world changes...) are pushed as
//!   [`RagdollTrigger`]s with [`RagdollContext::push_trigger`] and applied at the start of the
//!   next tick.
//! - Each [`ActiveRagdoll`] runs a [`RagdollStateMachine`] through
//!   `Keyframed → BlendIn → Collide → BlendOut → Keyframed`, using a [`Blender`] for the
//!   blended states and a [`StressTracker`] to detect when the simulated body has settled.
//! - The core never owns a physics world or an animation system. It talks to them through the
//!   [`PoseSource`] and [`PhysicsInterface`] traits.
//!
//! Options are read from `*.ragdoll.ron` files:
//! ```ron
//! (
//!     active_ragdoll_start_distance: 50.0,
//!     active_ragdoll_end_distance: 60.0,
//!     blend_in_time: 0.2,
//!     get_up_blend_time: 0.2,
//!     blend_curve: SmoothStep,
//!     settle_stress_threshold: 0.05,
//!     settle_time: 0.2,
//! )
//! ```
//! Any field left out takes its default value, see [`RagdollOptions`].
//!
//! [`RagdollContext`]: registry::RagdollContext
//! [`RagdollContext::tick`]: registry::RagdollContext::tick
//! [`RagdollContext::push_trigger`]: registry::RagdollContext::push_trigger
//! [`ActiveRagdoll`]: active_ragdoll::ActiveRagdoll
//! [`RagdollTrigger`]: events::RagdollTrigger
//! [`RagdollStateMachine`]: state_machine::RagdollStateMachine
//! [`Blender`]: blend::Blender
//! [`StressTracker`]: stress::StressTracker
//! [`PoseSource`]: host::PoseSource
//! [`PhysicsInterface`]: host::PhysicsInterface
//! [`RagdollOptions`]: config::RagdollOptions

pub mod activation;
pub mod active_ragdoll;
pub mod blend;
pub mod config;
pub mod errors;
pub mod events;
pub mod host;
pub mod id;
pub mod interpolation;
pub mod pose;
pub mod registry;
pub mod skeleton;
pub mod state_machine;
pub mod stress;

#[cfg(test)]
mod test_host;

pub mod prelude {
    pub use super::activation::should_be_active;
    pub use super::active_ragdoll::ActiveRagdoll;
    pub use super::blend::{BlendStep, Blender};
    pub use super::config::{OptionsFile, RagdollOptions};
    pub use super::errors::*;
    pub use super::events::{Hand, RagdollTrigger, TriggerQueue};
    pub use super::host::{
        BodyState, DriverGains, EaseConstraintsHandle, PhysicsInterface, PoseSource, RagdollHost,
    };
    pub use super::id::{ActorId, BodyId, NodeIndex};
    pub use super::interpolation::{easing::BlendCurve, linear::InterpolateLinear};
    pub use super::pose::Pose;
    pub use super::registry::{
        ActiveRagdollRegistry, Candidate, RagdollContext, TickInput, TickReport,
    };
    pub use super::skeleton::{
        Constraint, NodeKind, Skeleton, SkeletonBuilder, SkeletonNode, serial::SkeletonSerial,
    };
    pub use super::state_machine::{
        MachineInputs, RagdollState, RagdollStateMachine, Transition, TransitionReason,
    };
    pub use super::stress::StressTracker;
}
