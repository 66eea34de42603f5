//! Discrete triggers delivered by the host, queued until the next driver tick.
//!
//! Host callbacks (collisions, grabs, deaths...) fire in the middle of the host's own update.
//! They only push into a [`TriggerQueue`]; the driver drains it once per tick so that every
//! state change happens in one place.

use std::collections::VecDeque;

use bevy::reflect::Reflect;
use serde::{Deserialize, Serialize};

use crate::{errors::TriggerQueueError, id::ActorId};

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hand {
    Left,
    Right,
}

impl Hand {
    pub fn from_is_left(is_left: bool) -> Self {
        if is_left { Hand::Left } else { Hand::Right }
    }
}

#[derive(Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RagdollTrigger {
    Collision {
        actor: ActorId,
        separating_velocity: f32,
    },
    Grabbed {
        actor: ActorId,
        hand: Hand,
    },
    Dropped {
        actor: ActorId,
        hand: Hand,
    },
    Shoved {
        actor: ActorId,
    },
    Died {
        actor: ActorId,
    },
    /// The actor must return to its animated pose as soon as possible
    ForceKeyframe {
        actor: ActorId,
    },
    ActorUnloaded {
        actor: ActorId,
    },
    WorldChanged,
}

impl RagdollTrigger {
    pub fn actor(&self) -> Option<ActorId> {
        match self {
            RagdollTrigger::Collision { actor, .. }
            | RagdollTrigger::Grabbed { actor, .. }
            | RagdollTrigger::Dropped { actor, .. }
            | RagdollTrigger::Shoved { actor }
            | RagdollTrigger::Died { actor }
            | RagdollTrigger::ForceKeyframe { actor }
            | RagdollTrigger::ActorUnloaded { actor } => Some(*actor),
            RagdollTrigger::WorldChanged => None,
        }
    }
}

/// Bounded FIFO of pending triggers.
#[derive(Debug, Clone)]
pub struct TriggerQueue {
    pending: VecDeque<RagdollTrigger>,
    capacity: usize,
}

impl Default for TriggerQueue {
    fn default() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }
}

impl TriggerQueue {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            pending: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Changing the capacity never discards triggers already queued.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn push(&mut self, trigger: RagdollTrigger) -> Result<(), TriggerQueueError> {
        if self.pending.len() >= self.capacity {
            return Err(TriggerQueueError::QueueFull {
                capacity: self.capacity,
                trigger,
            });
        }
        self.pending.push_back(trigger);
        Ok(())
    }

    pub fn drain(&mut self) -> impl Iterator<Item = RagdollTrigger> + '_ {
        self.pending.drain(..)
    }
}
