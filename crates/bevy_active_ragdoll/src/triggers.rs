use bevy::{
    ecs::{entity::Entity, event::Event, observer::On, system::ResMut},
    log::{debug, warn},
};
use bevy_active_ragdoll_core::events::{Hand, RagdollTrigger};

use crate::components::{RagdollContextResource, actor_id};

/// Host-side event that asks the ragdoll driver to react on its next tick.
///
/// ```ignore
/// commands.trigger(RagdollTriggerEvent::collision(actor_entity, impact_speed));
/// ```
#[derive(Event, Debug, Clone, PartialEq)]
pub struct RagdollTriggerEvent(pub RagdollTrigger);

impl RagdollTriggerEvent {
    pub fn collision(actor: Entity, separating_velocity: f32) -> Self {
        Self(RagdollTrigger::Collision {
            actor: actor_id(actor),
            separating_velocity,
        })
    }

    pub fn grabbed(actor: Entity, hand: Hand) -> Self {
        Self(RagdollTrigger::Grabbed {
            actor: actor_id(actor),
            hand,
        })
    }

    pub fn dropped(actor: Entity, hand: Hand) -> Self {
        Self(RagdollTrigger::Dropped {
            actor: actor_id(actor),
            hand,
        })
    }

    pub fn shoved(actor: Entity) -> Self {
        Self(RagdollTrigger::Shoved {
            actor: actor_id(actor),
        })
    }

    pub fn died(actor: Entity) -> Self {
        Self(RagdollTrigger::Died {
            actor: actor_id(actor),
        })
    }

    pub fn force_keyframe(actor: Entity) -> Self {
        Self(RagdollTrigger::ForceKeyframe {
            actor: actor_id(actor),
        })
    }

    pub fn unloaded(actor: Entity) -> Self {
        Self(RagdollTrigger::ActorUnloaded {
            actor: actor_id(actor),
        })
    }

    pub fn world_changed() -> Self {
        Self(RagdollTrigger::WorldChanged)
    }

    /// Only queues the trigger; the driver applies it on its next tick.
    pub fn observe(event: On<RagdollTriggerEvent>, mut context: ResMut<RagdollContextResource>) {
        debug!("Queueing ragdoll trigger {:?}", event.0);
        if let Err(err) = context.0.push_trigger(event.0.clone()) {
            warn!("Dropping ragdoll trigger: {}", err);
        }
    }
}
