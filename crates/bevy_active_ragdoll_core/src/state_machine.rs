//! Lifecycle of one active ragdoll: Keyframed → BlendIn → Collide → BlendOut → Keyframed.
//!
//! Triggers only raise request flags on the machine. The flags are consumed by
//! [`RagdollStateMachine::evaluate`], which the driver calls once per tick after it has advanced
//! the blend and the stress tracker.

use bevy::reflect::{Reflect, std_traits::ReflectDefault};
use serde::{Deserialize, Serialize};

use crate::{blend::TIME_EPSILON, config::RagdollOptions, events::Hand};

#[derive(
    Reflect,
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
#[reflect(Default)]
pub enum RagdollState {
    /// Fully animation driven, no physics write-back
    #[default]
    Keyframed,
    BlendIn,
    /// Fully physics driven
    Collide,
    BlendOut,
}

impl RagdollState {
    /// Whether the blend engine produces the output pose in this state.
    pub fn is_blending(self) -> bool {
        matches!(self, RagdollState::BlendIn | RagdollState::BlendOut)
    }
}

#[derive(Reflect, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransitionReason {
    Triggered,
    BlendComplete,
    BlendingDisabled,
    Settled,
    Forced,
    Timeout,
    Retriggered,
    Reset,
}

#[derive(Reflect, Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    pub from: RagdollState,
    pub to: RagdollState,
    pub reason: TransitionReason,
    pub time: f64,
}

/// Per-tick observations the machine decides on.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MachineInputs {
    /// The blend running in BlendIn or BlendOut reached its target this tick
    pub blend_complete: bool,
    pub avg_stress: f32,
}

#[derive(Reflect, Debug, Clone, Default)]
pub struct RagdollStateMachine {
    state: RagdollState,
    state_changed_time: f64,
    low_stress_since: Option<f64>,
    activation_requested: bool,
    force_keyframe: bool,
    held: [bool; 2],
}

impl RagdollStateMachine {
    pub fn new(now: f64) -> Self {
        Self {
            state_changed_time: now,
            ..Default::default()
        }
    }

    pub fn state(&self) -> RagdollState {
        self.state
    }

    pub fn state_changed_time(&self) -> f64 {
        self.state_changed_time
    }

    pub fn time_in_state(&self, now: f64) -> f64 {
        (now - self.state_changed_time).max(0.0)
    }

    /// Start of the current run of low average stress while colliding.
    pub fn low_stress_since(&self) -> Option<f64> {
        self.low_stress_since
    }

    pub fn request_activation(&mut self) {
        self.activation_requested = true;
    }

    pub fn activation_requested(&self) -> bool {
        self.activation_requested
    }

    pub fn request_force_keyframe(&mut self) {
        self.force_keyframe = true;
    }

    pub fn force_keyframe_requested(&self) -> bool {
        self.force_keyframe
    }

    pub fn set_held(&mut self, hand: Hand, held: bool) {
        self.held[hand_slot(hand)] = held;
    }

    pub fn is_held(&self) -> bool {
        self.held.iter().any(|held| *held)
    }

    /// Applies at most one transition. Callers that run entry actions re-evaluate after each
    /// returned transition so that chains like BlendIn → Collide with blending disabled finish
    /// within the same tick.
    pub fn evaluate(
        &mut self,
        now: f64,
        inputs: &MachineInputs,
        options: &RagdollOptions,
    ) -> Option<Transition> {
        match self.state {
            RagdollState::Keyframed => {
                // Nothing to return to the animated pose from
                self.force_keyframe = false;
                if std::mem::take(&mut self.activation_requested) {
                    return Some(self.enter(
                        RagdollState::BlendIn,
                        TransitionReason::Triggered,
                        now,
                    ));
                }
                None
            }
            RagdollState::BlendIn => {
                self.activation_requested = false;
                if !options.do_blending {
                    Some(self.enter(
                        RagdollState::Collide,
                        TransitionReason::BlendingDisabled,
                        now,
                    ))
                } else if inputs.blend_complete {
                    Some(self.enter(RagdollState::Collide, TransitionReason::BlendComplete, now))
                } else {
                    None
                }
            }
            RagdollState::Collide => self.evaluate_collide(now, inputs, options),
            RagdollState::BlendOut => {
                self.force_keyframe = false;
                // Only a new activation interrupts the get-up
                if std::mem::take(&mut self.activation_requested) {
                    Some(self.enter(RagdollState::BlendIn, TransitionReason::Retriggered, now))
                } else if !options.do_blending {
                    Some(self.enter(
                        RagdollState::Keyframed,
                        TransitionReason::BlendingDisabled,
                        now,
                    ))
                } else if inputs.blend_complete {
                    Some(self.enter(RagdollState::Keyframed, TransitionReason::BlendComplete, now))
                } else {
                    None
                }
            }
        }
    }

    fn evaluate_collide(
        &mut self,
        now: f64,
        inputs: &MachineInputs,
        options: &RagdollOptions,
    ) -> Option<Transition> {
        if std::mem::take(&mut self.activation_requested) {
            // A fresh hit restarts the settle countdown
            self.low_stress_since = None;
        }

        if std::mem::take(&mut self.force_keyframe) || options.force_anim_pose {
            return Some(self.enter(RagdollState::BlendOut, TransitionReason::Forced, now));
        }

        if let Some(timeout) = options.collide_timeout
            && self.time_in_state(now) + TIME_EPSILON >= timeout
        {
            return Some(self.enter(RagdollState::BlendOut, TransitionReason::Timeout, now));
        }

        if self.is_held() || options.force_ragdoll_pose {
            self.low_stress_since = None;
            return None;
        }

        if inputs.avg_stress < options.settle_stress_threshold {
            let since = *self.low_stress_since.get_or_insert(now);
            if now - since + TIME_EPSILON >= options.settle_time {
                return Some(self.enter(RagdollState::BlendOut, TransitionReason::Settled, now));
            }
        } else {
            self.low_stress_since = None;
        }
        None
    }

    /// Drops straight back to Keyframed, bypassing any blend. Clears every pending request.
    pub fn force_reset(&mut self, now: f64) -> Option<Transition> {
        self.activation_requested = false;
        self.force_keyframe = false;
        self.held = [false; 2];
        if self.state == RagdollState::Keyframed {
            return None;
        }
        Some(self.enter(RagdollState::Keyframed, TransitionReason::Reset, now))
    }

    fn enter(&mut self, to: RagdollState, reason: TransitionReason, now: f64) -> Transition {
        let transition = Transition {
            from: self.state,
            to,
            reason,
            time: now,
        };
        self.state = to;
        self.state_changed_time = now;
        self.low_stress_since = None;
        transition
    }
}

fn hand_slot(hand: Hand) -> usize {
    match hand {
        Hand::Left => 0,
        Hand::Right => 1,
    }
}
