use thiserror::Error;

use crate::events::RagdollTrigger;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum TriggerQueueError {
    #[error("Trigger queue is full (capacity {capacity}), dropped {trigger:?}")]
    QueueFull {
        capacity: usize,
        trigger: RagdollTrigger,
    },
}
