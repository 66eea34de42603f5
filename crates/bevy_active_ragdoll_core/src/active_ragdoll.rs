use bevy::log::{debug, warn};

use crate::{
    blend::Blender,
    config::RagdollOptions,
    errors::{RagdollError, RagdollResult},
    events::Hand,
    host::{BodyState, DriverGains, EaseConstraintsHandle, RagdollHost},
    id::ActorId,
    pose::Pose,
    state_machine::{MachineInputs, RagdollState, RagdollStateMachine, Transition},
    stress::StressTracker,
};

/// Upper bound on transitions applied in one update. The longest chain, with blending disabled,
/// is Keyframed → BlendIn → Collide → BlendOut → Keyframed.
const MAX_TRANSITIONS_PER_UPDATE: usize = 4;

/// One actor under animation/physics arbitration.
#[derive(Debug)]
pub struct ActiveRagdoll {
    actor: ActorId,
    bone_count: usize,
    machine: RagdollStateMachine,
    /// Physics simulation is driving the skeleton
    is_on: bool,
    anim_pose: Pose,
    physics_pose: Pose,
    output_pose: Pose,
    bodies: Vec<BodyState>,
    stress: StressTracker,
    blender: Blender,
    ease_constraints: Option<EaseConstraintsHandle>,
    frame_time: f64,
    last_collision_time: Option<f64>,
}

impl ActiveRagdoll {
    pub fn new(actor: ActorId, bone_count: usize, now: f64) -> Self {
        Self {
            actor,
            bone_count,
            machine: RagdollStateMachine::new(now),
            is_on: false,
            anim_pose: Pose::identity(bone_count),
            physics_pose: Pose::identity(bone_count),
            output_pose: Pose::identity(bone_count),
            bodies: Vec::new(),
            stress: StressTracker::new(bone_count),
            blender: Blender::default(),
            ease_constraints: None,
            frame_time: now,
            last_collision_time: None,
        }
    }

    /// Puts the actor's bodies in the Keyframed configuration. Called once when the instance
    /// is registered, before the first update.
    pub fn attach(&self, host: &mut impl RagdollHost) {
        host.set_driver_enabled(self.actor, false);
    }

    pub fn actor(&self) -> ActorId {
        self.actor
    }

    pub fn bone_count(&self) -> usize {
        self.bone_count
    }

    pub fn state(&self) -> RagdollState {
        self.machine.state()
    }

    pub fn state_changed_time(&self) -> f64 {
        self.machine.state_changed_time()
    }

    pub fn machine(&self) -> &RagdollStateMachine {
        &self.machine
    }

    pub fn is_on(&self) -> bool {
        self.is_on
    }

    pub fn anim_pose(&self) -> &Pose {
        &self.anim_pose
    }

    pub fn physics_pose(&self) -> &Pose {
        &self.physics_pose
    }

    /// Pose written into the skeletal hierarchy on the last update.
    pub fn output_pose(&self) -> &Pose {
        &self.output_pose
    }

    pub fn stress(&self) -> &StressTracker {
        &self.stress
    }

    pub fn blender(&self) -> &Blender {
        &self.blender
    }

    pub fn frame_time(&self) -> f64 {
        self.frame_time
    }

    pub fn has_ease_constraints(&self) -> bool {
        self.ease_constraints.is_some()
    }

    pub fn request_activation(&mut self) {
        self.machine.request_activation();
    }

    pub fn request_force_keyframe(&mut self) {
        self.machine.request_force_keyframe();
    }

    pub fn set_held(&mut self, hand: Hand, held: bool) {
        self.machine.set_held(hand, held);
    }

    /// Accepts a collision unless another one was accepted less than `cooldown` seconds ago.
    pub fn accept_collision(&mut self, now: f64, cooldown: f64) -> bool {
        if let Some(last) = self.last_collision_time
            && now - last < cooldown
        {
            return false;
        }
        self.last_collision_time = Some(now);
        true
    }

    /// Clamped time since the previous update.
    fn delta_time(&self, now: f64, max_delta_time: f64) -> f64 {
        let dt = now - self.frame_time;
        if dt.is_finite() {
            dt.clamp(0.0, max_delta_time.max(0.0))
        } else {
            0.0
        }
    }

    /// Advances this ragdoll by one driver tick, appending every transition it applied to
    /// `transitions`. Transitions applied before an error are kept.
    ///
    /// Errors for which [`RagdollError::drops_instance`] holds leave the instance in an
    /// unspecified state and it should be torn down. Other errors have already forced the
    /// instance back to Keyframed.
    pub fn update(
        &mut self,
        now: f64,
        options: &RagdollOptions,
        host: &mut impl RagdollHost,
        transitions: &mut Vec<Transition>,
    ) -> RagdollResult<()> {
        let dt = self.delta_time(now, options.max_delta_time);
        self.frame_time = now;

        if self.state() != RagdollState::Collide {
            self.sample_animated(&*host)?;
        }
        if self.is_on {
            self.sample_physics(&*host)?;
            self.stress.observe(
                &self.bodies,
                options.stress_decay,
                options.angular_stress_weight,
            );
        }

        let mut inputs = MachineInputs {
            blend_complete: false,
            avg_stress: self.stress.avg_stress(),
        };
        match self.state() {
            RagdollState::BlendIn | RagdollState::BlendOut => {
                let target = if self.state() == RagdollState::BlendIn {
                    &self.physics_pose
                } else {
                    &self.anim_pose
                };
                self.blender.set_target(target.clone());
                let step = self.blender.advance(dt);
                inputs.blend_complete = step.is_complete;
                self.output_pose.clone_from(step.pose);
            }
            RagdollState::Collide => self.output_pose.clone_from(&self.physics_pose),
            RagdollState::Keyframed => self.output_pose.clone_from(&self.anim_pose),
        }

        let mut applied = 0;
        while applied < MAX_TRANSITIONS_PER_UPDATE
            && let Some(transition) = self.machine.evaluate(now, &inputs, options)
        {
            applied += 1;
            log_transition(self.actor, &transition);
            transitions.push(transition);
            self.enter(transition, options, host, transitions)?;
            // The blend that just started has not advanced yet
            inputs.blend_complete = false;
        }

        if self.is_on {
            host.write_pose(self.actor, &self.output_pose);
            host.set_gains(self.actor, self.drive_gains(options));

            if self.state() == RagdollState::BlendIn
                && options.enable_keyframes
                && self.machine.time_in_state(now) < options.blend_in_keyframe_time
            {
                host.keyframe_bodies(self.actor, &self.anim_pose);
            }
        }

        Ok(())
    }

    fn enter(
        &mut self,
        transition: Transition,
        options: &RagdollOptions,
        host: &mut impl RagdollHost,
        transitions: &mut Vec<Transition>,
    ) -> RagdollResult<()> {
        match transition.to {
            RagdollState::BlendIn => {
                self.enter_blend_in(transition, options, host, transitions)?;
            }
            RagdollState::Collide => {
                self.output_pose.clone_from(&self.physics_pose);
            }
            RagdollState::BlendOut => {
                self.stress.snapshot_rest();
                self.sample_animated(&*host)?;
                self.blender.start(
                    self.physics_pose.clone(),
                    self.anim_pose.clone(),
                    options.get_up_blend_time,
                    options.blend_curve,
                );
                self.output_pose.clone_from(self.blender.current());
            }
            RagdollState::Keyframed => {
                self.switch_off(host);
                self.output_pose.clone_from(&self.anim_pose);
            }
        }
        Ok(())
    }

    fn enter_blend_in(
        &mut self,
        transition: Transition,
        options: &RagdollOptions,
        host: &mut impl RagdollHost,
        transitions: &mut Vec<Transition>,
    ) -> RagdollResult<()> {
        if self.ease_constraints.is_none() {
            match host.create_ease_constraints(self.actor) {
                Ok(handle) => self.ease_constraints = Some(handle),
                Err(err) => {
                    warn!("Ragdoll {:?}: {}, staying keyframed", self.actor, err);
                    if let Some(reset) = self.machine.force_reset(transition.time) {
                        log_transition(self.actor, &reset);
                        transitions.push(reset);
                    }
                    self.switch_off(host);
                    self.output_pose.clone_from(&self.anim_pose);
                    return Err(RagdollError::EaseActionUnavailable(self.actor));
                }
            }
        }
        if let Some(handle) = &self.ease_constraints {
            host.activate_ease_constraints(handle, options.blend_in_time);
        }

        let from = if transition.from == RagdollState::BlendOut {
            // Continue from whatever was on screen
            self.blender.current().clone()
        } else {
            self.anim_pose.clone()
        };

        if !self.is_on {
            host.set_driver_enabled(self.actor, true);
            self.is_on = true;
            self.stress.reset(self.bone_count);
            self.sample_physics(&*host)?;
        }

        self.blender.start(
            from,
            self.physics_pose.clone(),
            options.blend_in_time,
            options.blend_curve,
        );
        self.output_pose.clone_from(self.blender.current());
        Ok(())
    }

    fn switch_off(&mut self, host: &mut impl RagdollHost) {
        if self.is_on {
            host.set_driver_enabled(self.actor, false);
            host.set_gains(self.actor, DriverGains::ZERO);
        }
        self.is_on = false;
    }

    /// Configured gains scaled by how much the animation still contributes.
    pub fn drive_gains(&self, options: &RagdollOptions) -> DriverGains {
        let animation_weight = match self.state() {
            RagdollState::Keyframed => 1.0,
            RagdollState::BlendIn => 1.0 - self.blender.factor(),
            RagdollState::Collide => 0.0,
            RagdollState::BlendOut => self.blender.factor(),
        };
        options.gains().scaled(animation_weight)
    }

    fn sample_animated(&mut self, host: &impl RagdollHost) -> RagdollResult<()> {
        let pose = host
            .animated_pose(self.actor)
            .ok_or(RagdollError::MissingAnimatedPose(self.actor))?;
        pose.expect_len(self.actor, "Animated pose", self.bone_count)?;
        self.anim_pose = pose;
        Ok(())
    }

    fn sample_physics(&mut self, host: &impl RagdollHost) -> RagdollResult<()> {
        let bodies = host
            .body_states(self.actor)
            .ok_or(RagdollError::MissingPhysicsState(self.actor))?;
        if bodies.len() != self.bone_count {
            return Err(RagdollError::MalformedSkeleton {
                actor: self.actor,
                what: "Physics state",
                expected: self.bone_count,
                found: bodies.len(),
            });
        }
        self.physics_pose.bones.clear();
        self.physics_pose
            .bones
            .extend(bodies.iter().map(|body| body.transform));
        self.bodies = bodies;
        Ok(())
    }

    /// Forces the instance back to Keyframed and hands every host resource back. Consumes the
    /// instance so that the ease action cannot outlive it.
    pub fn teardown(mut self, now: f64, host: &mut impl RagdollHost) -> Option<Transition> {
        let transition = self.machine.force_reset(now);
        if let Some(transition) = &transition {
            log_transition(self.actor, transition);
        }
        self.switch_off(host);
        if let Some(handle) = self.ease_constraints.take() {
            host.release_ease_constraints(handle);
        }
        transition
    }
}

fn log_transition(actor: ActorId, transition: &Transition) {
    debug!(
        "Ragdoll {:?}: {:?} -> {:?} ({:?})",
        actor, transition.from, transition.to, transition.reason
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{state_machine::TransitionReason, test_host::MockHost};

    const ACTOR: ActorId = ActorId(1);

    fn reasons(transitions: &[Transition]) -> Vec<TransitionReason> {
        transitions.iter().map(|t| t.reason).collect()
    }

    fn update(
        ragdoll: &mut ActiveRagdoll,
        now: f64,
        options: &RagdollOptions,
        host: &mut MockHost,
    ) -> RagdollResult<Vec<Transition>> {
        let mut transitions = Vec::new();
        ragdoll.update(now, options, host, &mut transitions)?;
        Ok(transitions)
    }

    #[test]
    fn disabled_blending_chains_within_one_update() {
        let options = RagdollOptions {
            do_blending: false,
            ..Default::default()
        };
        let mut host = MockHost::default().with_actor(ACTOR, 3);
        let mut ragdoll = ActiveRagdoll::new(ACTOR, 3, 0.0);

        ragdoll.request_activation();
        let transitions = update(&mut ragdoll, 0.1, &options, &mut host).unwrap();
        assert_eq!(
            reasons(&transitions),
            vec![TransitionReason::Triggered, TransitionReason::BlendingDisabled]
        );
        assert_eq!(ragdoll.state(), RagdollState::Collide);
        assert_eq!(ragdoll.output_pose(), ragdoll.physics_pose());
        assert!(host.actor(ACTOR).driver_enabled);

        ragdoll.request_force_keyframe();
        let transitions = update(&mut ragdoll, 0.2, &options, &mut host).unwrap();
        assert_eq!(
            reasons(&transitions),
            vec![TransitionReason::Forced, TransitionReason::BlendingDisabled]
        );
        assert_eq!(ragdoll.state(), RagdollState::Keyframed);
        assert!(!ragdoll.is_on());
        assert!(!host.actor(ACTOR).driver_enabled);
    }

    #[test]
    fn collision_cooldown() {
        let mut ragdoll = ActiveRagdoll::new(ACTOR, 1, 0.0);
        assert!(ragdoll.accept_collision(0.0, 0.7));
        assert!(!ragdoll.accept_collision(0.5, 0.7));
        assert!(ragdoll.accept_collision(0.7, 0.7));
        assert!(!ragdoll.accept_collision(1.0, 0.7));
    }

    #[test]
    fn missing_physics_state_is_reported() {
        let options = RagdollOptions::default();
        let mut host = MockHost::default().with_actor(ACTOR, 2);
        let mut ragdoll = ActiveRagdoll::new(ACTOR, 2, 0.0);
        ragdoll.request_activation();
        update(&mut ragdoll, 0.1, &options, &mut host).unwrap();

        host.actor_mut(ACTOR).bodies = None;
        let err = update(&mut ragdoll, 0.2, &options, &mut host).unwrap_err();
        assert_eq!(err, RagdollError::MissingPhysicsState(ACTOR));
        assert!(err.drops_instance());

        // Teardown still hands the ease action back
        ragdoll.teardown(0.3, &mut host);
        assert!(host.live_ease_actions.is_empty());
    }

    #[test]
    fn failed_blend_in_keeps_its_transitions() {
        let options = RagdollOptions::default();
        let mut host = MockHost {
            fail_ease_allocation: true,
            ..Default::default()
        }
        .with_actor(ACTOR, 2);
        let mut ragdoll = ActiveRagdoll::new(ACTOR, 2, 0.0);
        ragdoll.request_activation();

        let mut transitions = Vec::new();
        let err = ragdoll
            .update(0.1, &options, &mut host, &mut transitions)
            .unwrap_err();
        assert_eq!(err, RagdollError::EaseActionUnavailable(ACTOR));
        assert!(!err.drops_instance());
        assert_eq!(
            reasons(&transitions),
            vec![TransitionReason::Triggered, TransitionReason::Reset]
        );
        assert_eq!(transitions[0].to, RagdollState::BlendIn);
        assert_eq!(transitions[1].from, RagdollState::BlendIn);
        assert_eq!(transitions[1].to, RagdollState::Keyframed);
        assert_eq!(ragdoll.state(), RagdollState::Keyframed);
    }
}
