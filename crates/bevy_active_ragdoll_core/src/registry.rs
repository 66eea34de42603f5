//! Ownership of every active ragdoll, and the per-tick driver that advances them.

use bevy::{
    log::{debug, info, warn},
    math::Vec3,
    platform::collections::HashSet,
};
use indexmap::IndexMap;

use crate::{
    activation::should_be_active,
    active_ragdoll::ActiveRagdoll,
    config::RagdollOptions,
    errors::{RagdollError, TriggerQueueError},
    events::{RagdollTrigger, TriggerQueue},
    host::RagdollHost,
    id::ActorId,
    state_machine::Transition,
};

/// An actor the host is willing to simulate this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub actor: ActorId,
    pub position: Vec3,
    pub bone_count: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct TickInput<'a> {
    pub now: f64,
    /// Reference point for distance-gated activation, usually the camera
    pub viewpoint: Vec3,
    /// Every loaded actor. Active actors missing from this list are treated as unloaded.
    pub candidates: &'a [Candidate],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickReport {
    pub activated: Vec<ActorId>,
    pub deactivated: Vec<ActorId>,
    pub dropped: Vec<(ActorId, RagdollError)>,
    pub transitions: Vec<(ActorId, Transition)>,
}

impl TickReport {
    pub fn is_empty(&self) -> bool {
        self.activated.is_empty()
            && self.deactivated.is_empty()
            && self.dropped.is_empty()
            && self.transitions.is_empty()
    }
}

/// Sole owner of the [`ActiveRagdoll`] instances, one per actor, in activation order.
#[derive(Debug, Default)]
pub struct ActiveRagdollRegistry {
    instances: IndexMap<ActorId, ActiveRagdoll>,
}

impl ActiveRagdollRegistry {
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    pub fn contains(&self, actor: ActorId) -> bool {
        self.instances.contains_key(&actor)
    }

    pub fn get(&self, actor: ActorId) -> Option<&ActiveRagdoll> {
        self.instances.get(&actor)
    }

    pub fn get_mut(&mut self, actor: ActorId) -> Option<&mut ActiveRagdoll> {
        self.instances.get_mut(&actor)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ActorId, &ActiveRagdoll)> {
        self.instances.iter()
    }

    pub fn actors(&self) -> impl Iterator<Item = ActorId> + '_ {
        self.instances.keys().copied()
    }

    fn insert(&mut self, ragdoll: ActiveRagdoll) {
        self.instances.insert(ragdoll.actor(), ragdoll);
    }

    fn remove(&mut self, actor: ActorId) -> Option<ActiveRagdoll> {
        self.instances.shift_remove(&actor)
    }
}

/// Everything the driver keeps between ticks. Hosts construct one per world; nothing is global.
#[derive(Debug, Default)]
pub struct RagdollContext {
    registry: ActiveRagdollRegistry,
    triggers: TriggerQueue,
    world_changed_time: Option<f64>,
    /// Actors unloaded by trigger. They stay inactive until they leave the candidate list.
    unloaded: HashSet<ActorId>,
    last_tick_time: Option<f64>,
}

impl RagdollContext {
    pub fn new(options: &RagdollOptions) -> Self {
        Self {
            triggers: TriggerQueue::with_capacity(options.trigger_queue_capacity),
            ..Default::default()
        }
    }

    pub fn registry(&self) -> &ActiveRagdollRegistry {
        &self.registry
    }

    pub fn triggers(&self) -> &TriggerQueue {
        &self.triggers
    }

    pub fn last_tick_time(&self) -> Option<f64> {
        self.last_tick_time
    }

    /// Queues a trigger for the next tick. Safe to call from host event callbacks.
    pub fn push_trigger(&mut self, trigger: RagdollTrigger) -> Result<(), TriggerQueueError> {
        self.triggers.push(trigger)
    }

    /// Advances the driver by one tick: applies world and unload triggers, activates and
    /// deactivates actors, applies the remaining triggers, then updates every active instance
    /// exactly once.
    pub fn tick(
        &mut self,
        input: &TickInput,
        options: &RagdollOptions,
        host: &mut impl RagdollHost,
    ) -> TickReport {
        let mut report = TickReport::default();
        let now = input.now;
        self.triggers.set_capacity(options.trigger_queue_capacity);

        let actor_triggers = self.apply_lifecycle_triggers(now, host, &mut report);
        self.update_activation(input, options, host, &mut report);
        self.apply_actor_triggers(actor_triggers, now, options);

        let mut dropped = Vec::new();
        let mut transitions = Vec::new();
        for (actor, ragdoll) in self.registry.instances.iter_mut() {
            let result = ragdoll.update(now, options, host, &mut transitions);
            report
                .transitions
                .extend(transitions.drain(..).map(|t| (*actor, t)));
            match result {
                Ok(()) => {}
                Err(err) if err.drops_instance() => dropped.push((*actor, err)),
                Err(err) => warn!("Ragdoll {:?}: {}", actor, err),
            }
        }
        for (actor, err) in dropped {
            warn!("Dropping active ragdoll {:?}: {}", actor, err);
            self.teardown(actor, now, host, &mut report);
            report.dropped.push((actor, err));
        }

        self.last_tick_time = Some(now);
        report
    }

    /// Drains the queue, handling world changes and unloads. Returns the per-actor triggers in
    /// queue order, to be applied once this tick's activations are known.
    fn apply_lifecycle_triggers(
        &mut self,
        now: f64,
        host: &mut impl RagdollHost,
        report: &mut TickReport,
    ) -> Vec<RagdollTrigger> {
        let pending: Vec<RagdollTrigger> = self.triggers.drain().collect();
        let mut actor_triggers = Vec::with_capacity(pending.len());
        for trigger in pending {
            match trigger {
                RagdollTrigger::WorldChanged => {
                    info!("World changed, tearing down {} active ragdolls", self.registry.len());
                    self.teardown_all(now, host, report);
                    self.world_changed_time = Some(now);
                }
                RagdollTrigger::ActorUnloaded { actor } => {
                    self.unloaded.insert(actor);
                    if self.registry.contains(actor) {
                        self.teardown(actor, now, host, report);
                        report.deactivated.push(actor);
                    }
                }
                other => actor_triggers.push(other),
            }
        }
        actor_triggers
    }

    fn apply_actor_triggers(
        &mut self,
        triggers: Vec<RagdollTrigger>,
        now: f64,
        options: &RagdollOptions,
    ) {
        for trigger in triggers {
            let Some(actor) = trigger.actor() else {
                continue;
            };
            let Some(ragdoll) = self.registry.get_mut(actor) else {
                debug!("Ignoring {:?}, actor is not active", trigger);
                continue;
            };
            apply_actor_trigger(ragdoll, &trigger, now, options);
        }
    }

    fn update_activation(
        &mut self,
        input: &TickInput,
        options: &RagdollOptions,
        host: &mut impl RagdollHost,
        report: &mut TickReport,
    ) {
        let now = input.now;
        let may_activate = self
            .world_changed_time
            .is_none_or(|changed| now - changed >= options.world_changed_wait_time);

        let mut loaded: HashSet<ActorId> = HashSet::default();
        for candidate in input.candidates {
            loaded.insert(candidate.actor);
            if self.unloaded.contains(&candidate.actor) {
                continue;
            }
            let was_active = self.registry.contains(candidate.actor);
            let distance = candidate.position.distance(input.viewpoint);
            let active = should_be_active(
                was_active,
                distance,
                options.active_ragdoll_start_distance,
                options.active_ragdoll_end_distance,
            );

            if active && !was_active && may_activate {
                info!(
                    "Activating ragdoll {:?} at distance {:.1}",
                    candidate.actor, distance
                );
                let ragdoll = ActiveRagdoll::new(candidate.actor, candidate.bone_count, now);
                ragdoll.attach(host);
                self.registry.insert(ragdoll);
                report.activated.push(candidate.actor);
            } else if !active && was_active {
                info!(
                    "Deactivating ragdoll {:?} at distance {:.1}",
                    candidate.actor, distance
                );
                self.teardown(candidate.actor, now, host, report);
                report.deactivated.push(candidate.actor);
            }
        }
        // Leaving the candidate list clears an unload
        self.unloaded.retain(|actor| loaded.contains(actor));

        let missing: Vec<ActorId> = self
            .registry
            .actors()
            .filter(|actor| !loaded.contains(actor))
            .collect();
        for actor in missing {
            info!("Deactivating ragdoll {:?}, actor is no longer loaded", actor);
            self.teardown(actor, now, host, report);
            report.deactivated.push(actor);
        }
    }

    /// Tears down every instance, e.g. when the host leaves the area.
    pub fn teardown_all(&mut self, now: f64, host: &mut impl RagdollHost, report: &mut TickReport) {
        let actors: Vec<ActorId> = self.registry.actors().collect();
        for actor in actors {
            self.teardown(actor, now, host, report);
            report.deactivated.push(actor);
        }
    }

    fn teardown(
        &mut self,
        actor: ActorId,
        now: f64,
        host: &mut impl RagdollHost,
        report: &mut TickReport,
    ) {
        if let Some(ragdoll) = self.registry.remove(actor)
            && let Some(transition) = ragdoll.teardown(now, host)
        {
            report.transitions.push((actor, transition));
        }
    }
}

fn apply_actor_trigger(
    ragdoll: &mut ActiveRagdoll,
    trigger: &RagdollTrigger,
    now: f64,
    options: &RagdollOptions,
) {
    match *trigger {
        RagdollTrigger::Collision {
            separating_velocity,
            ..
        } => {
            if separating_velocity.abs() < options.collision_min_speed {
                return;
            }
            if ragdoll.accept_collision(now, options.collision_cooldown_time) {
                ragdoll.request_activation();
            }
        }
        RagdollTrigger::Grabbed { hand, .. } => {
            ragdoll.set_held(hand, true);
            ragdoll.request_activation();
        }
        RagdollTrigger::Dropped { hand, .. } => ragdoll.set_held(hand, false),
        RagdollTrigger::Shoved { .. } => {
            if options.enable_actor_shove {
                ragdoll.request_activation();
            }
        }
        RagdollTrigger::Died { .. } => ragdoll.request_activation(),
        RagdollTrigger::ForceKeyframe { .. } => ragdoll.request_force_keyframe(),
        RagdollTrigger::ActorUnloaded { .. } | RagdollTrigger::WorldChanged => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        events::Hand,
        host::DriverGains,
        state_machine::{RagdollState, TransitionReason},
        test_host::MockHost,
    };

    const ACTOR: ActorId = ActorId(7);
    const OTHER: ActorId = ActorId(8);

    struct Harness {
        ctx: RagdollContext,
        host: MockHost,
        options: RagdollOptions,
        candidates: Vec<Candidate>,
    }

    impl Harness {
        fn new(options: RagdollOptions) -> Self {
            Self {
                ctx: RagdollContext::new(&options),
                host: MockHost::default().with_actor(ACTOR, 3),
                options,
                candidates: vec![candidate(ACTOR, 40.0)],
            }
        }

        fn tick(&mut self, now: f64) -> TickReport {
            let input = TickInput {
                now,
                viewpoint: Vec3::ZERO,
                candidates: &self.candidates,
            };
            self.ctx.tick(&input, &self.options, &mut self.host)
        }

        fn push(&mut self, trigger: RagdollTrigger) {
            self.ctx.push_trigger(trigger).unwrap();
        }

        fn ragdoll(&self) -> &ActiveRagdoll {
            self.ctx.registry().get(ACTOR).unwrap()
        }

        fn state(&self) -> RagdollState {
            self.ragdoll().state()
        }

        /// Activates at t=0 and triggers at t=1, leaving the actor in BlendIn.
        fn blend_in(&mut self) {
            self.tick(0.0);
            self.push(RagdollTrigger::Collision {
                actor: ACTOR,
                separating_velocity: 5.0,
            });
            self.tick(1.0);
            assert_eq!(self.state(), RagdollState::BlendIn);
        }

        /// Drives the actor into Collide at t=1.25.
        fn collide(&mut self) {
            self.blend_in();
            for now in [1.05, 1.1, 1.25] {
                self.tick(now);
            }
            assert_eq!(self.state(), RagdollState::Collide);
        }
    }

    fn candidate(actor: ActorId, distance: f32) -> Candidate {
        Candidate {
            actor,
            position: Vec3::X * distance,
            bone_count: 3,
        }
    }

    #[test]
    fn collision_blends_in_then_collides() {
        let mut harness = Harness::new(RagdollOptions::default());

        let report = harness.tick(0.0);
        assert_eq!(report.activated, vec![ACTOR]);
        assert_eq!(harness.state(), RagdollState::Keyframed);
        // Bodies start kinematic
        assert_eq!(harness.host.actor(ACTOR).driver_switches, vec![false]);

        harness.push(RagdollTrigger::Collision {
            actor: ACTOR,
            separating_velocity: 5.0,
        });
        let report = harness.tick(1.0);
        assert_eq!(report.transitions.len(), 1);
        let (actor, transition) = report.transitions[0];
        assert_eq!(actor, ACTOR);
        assert_eq!(transition.from, RagdollState::Keyframed);
        assert_eq!(transition.to, RagdollState::BlendIn);
        assert_eq!(transition.reason, TransitionReason::Triggered);
        assert!(harness.host.actor(ACTOR).driver_enabled);
        assert_eq!(harness.host.live_ease_actions.len(), 1);
        assert_eq!(harness.host.ease_activations, vec![(1, 0.2)]);
        assert_eq!(harness.host.actor(ACTOR).keyframed, 1);

        harness.tick(1.05);
        harness.tick(1.1);
        assert_eq!(harness.state(), RagdollState::BlendIn);
        let factor = harness.ragdoll().blender().factor();
        assert!((factor - 0.5).abs() < 1e-3, "factor {factor}");
        let bone = harness.ragdoll().output_pose().bones[0];
        assert!((bone.translation.x - 1.0).abs() < 1e-2);
        assert!((harness.host.actor(ACTOR).gains.hierarchy - 0.3).abs() < 1e-3);

        let report = harness.tick(1.25);
        assert_eq!(harness.state(), RagdollState::Collide);
        assert_eq!(report.transitions[0].1.reason, TransitionReason::BlendComplete);
        assert_eq!(harness.host.actor(ACTOR).gains, DriverGains::ZERO);
        let written = harness.host.actor(ACTOR).written.last().unwrap();
        assert_eq!(written, harness.ragdoll().physics_pose());
    }

    #[test]
    fn settles_and_returns_to_animation() {
        let mut harness = Harness::new(RagdollOptions::default());
        harness
            .host
            .set_velocities(ACTOR, Vec3::new(5., 0., 0.), Vec3::ZERO);
        harness.collide();
        assert!(harness.ragdoll().stress().avg_stress() > 1.0);
        harness.host.set_velocities(ACTOR, Vec3::ZERO, Vec3::ZERO);

        let mut reasons = Vec::new();
        for i in 1..200 {
            let report = harness.tick(1.25 + i as f64 * 0.05);
            reasons.extend(report.transitions.iter().map(|(_, t)| t.reason));
            if harness.state() == RagdollState::Keyframed {
                break;
            }
        }
        assert_eq!(
            reasons,
            vec![TransitionReason::Settled, TransitionReason::BlendComplete]
        );
        assert!(!harness.ragdoll().is_on());
        assert!(!harness.host.actor(ACTOR).driver_enabled);
        assert_eq!(harness.ragdoll().output_pose(), harness.ragdoll().anim_pose());
        // Kept until the instance goes away
        assert_eq!(harness.host.live_ease_actions.len(), 1);

        harness.candidates = vec![candidate(ACTOR, 70.0)];
        let report = harness.tick(20.0);
        assert_eq!(report.deactivated, vec![ACTOR]);
        assert!(harness.host.live_ease_actions.is_empty());
        assert_eq!(harness.host.released_ease_actions, vec![1]);
    }

    #[test]
    fn retrigger_during_blend_out_continues_from_current_pose() {
        let mut harness = Harness::new(RagdollOptions::default());
        harness.collide();

        harness.push(RagdollTrigger::ForceKeyframe { actor: ACTOR });
        let report = harness.tick(1.35);
        assert_eq!(report.transitions[0].1.reason, TransitionReason::Forced);
        harness.tick(1.45);
        assert_eq!(harness.state(), RagdollState::BlendOut);

        harness.push(RagdollTrigger::Shoved { actor: ACTOR });
        let report = harness.tick(1.5);
        let transition = report.transitions[0].1;
        assert_eq!(transition.from, RagdollState::BlendOut);
        assert_eq!(transition.to, RagdollState::BlendIn);
        assert_eq!(transition.reason, TransitionReason::Retriggered);

        // BlendOut had reached 0.75 of the way back: smoothstep(0.75) = 0.84375
        let x = harness.ragdoll().output_pose().bones[0].translation.x;
        assert!((x - 0.3125).abs() < 1e-2, "x {x}");
        // Same action, activated again
        assert_eq!(harness.host.live_ease_actions.len(), 1);
        assert_eq!(harness.host.ease_activations.len(), 2);
        assert_eq!(harness.host.ease_activations[0].0, harness.host.ease_activations[1].0);
    }

    #[test]
    fn long_pause_cannot_skip_a_blend() {
        let mut harness = Harness::new(RagdollOptions::default());
        harness.blend_in();
        harness.tick(100.0);
        assert_eq!(harness.state(), RagdollState::BlendIn);
        assert!((harness.ragdoll().blender().elapsed() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn activation_uses_hysteresis() {
        let mut harness = Harness::new(RagdollOptions::default());
        harness.candidates = vec![candidate(ACTOR, 55.0)];
        harness.tick(0.0);
        assert!(harness.ctx.registry().is_empty());

        harness.candidates = vec![candidate(ACTOR, 45.0)];
        assert_eq!(harness.tick(0.1).activated, vec![ACTOR]);

        harness.candidates = vec![candidate(ACTOR, 55.0)];
        assert!(harness.tick(0.2).is_empty());
        assert!(harness.ctx.registry().contains(ACTOR));

        harness.candidates = vec![candidate(ACTOR, 60.5)];
        assert_eq!(harness.tick(0.3).deactivated, vec![ACTOR]);
        assert!(harness.ctx.registry().is_empty());
    }

    #[test]
    fn unloaded_actors_are_torn_down() {
        let mut harness = Harness::new(RagdollOptions::default());
        harness.blend_in();

        harness.push(RagdollTrigger::ActorUnloaded { actor: ACTOR });
        harness.candidates.clear();
        let report = harness.tick(1.1);
        assert_eq!(report.deactivated, vec![ACTOR]);
        assert_eq!(report.transitions[0].1.reason, TransitionReason::Reset);
        assert!(harness.ctx.registry().is_empty());
        assert!(!harness.host.actor(ACTOR).driver_enabled);
        assert_eq!(harness.host.released_ease_actions, vec![1]);

        // Missing from the candidate list counts as unloaded too
        harness.candidates = vec![candidate(ACTOR, 10.0)];
        harness.tick(2.0);
        harness.candidates.clear();
        assert_eq!(harness.tick(2.1).deactivated, vec![ACTOR]);
    }

    #[test]
    fn unloaded_actor_stays_inactive_while_still_listed() {
        let mut harness = Harness::new(RagdollOptions::default());
        harness.candidates = vec![candidate(ACTOR, 10.0)];
        harness.tick(0.0);
        assert!(harness.ctx.registry().contains(ACTOR));

        harness.push(RagdollTrigger::ActorUnloaded { actor: ACTOR });
        let report = harness.tick(0.1);
        assert_eq!(report.deactivated, vec![ACTOR]);
        assert!(report.activated.is_empty());
        assert!(!harness.ctx.registry().contains(ACTOR));
        assert!(harness.tick(0.2).is_empty());
        assert!(!harness.ctx.registry().contains(ACTOR));

        // Leaving the list and coming back clears the unload
        harness.candidates.clear();
        harness.tick(0.3);
        harness.candidates = vec![candidate(ACTOR, 10.0)];
        assert_eq!(harness.tick(0.4).activated, vec![ACTOR]);
    }

    #[test]
    fn triggers_reach_actors_activated_in_the_same_tick() {
        let mut harness = Harness::new(RagdollOptions::default());
        harness.push(RagdollTrigger::Grabbed {
            actor: ACTOR,
            hand: Hand::Left,
        });
        let report = harness.tick(0.0);
        assert_eq!(report.activated, vec![ACTOR]);
        assert_eq!(report.transitions.len(), 1);
        assert_eq!(report.transitions[0].1.reason, TransitionReason::Triggered);
        assert_eq!(harness.state(), RagdollState::BlendIn);
        assert!(harness.ragdoll().machine().is_held());
    }

    #[test]
    fn malformed_skeleton_drops_only_that_actor() {
        let mut harness = Harness::new(RagdollOptions::default());
        harness.host = MockHost::default()
            .with_actor(ACTOR, 3)
            .with_actor(OTHER, 3);
        harness.host.actor_mut(ACTOR).animated = Some(crate::test_host::animated_pose(2));
        harness.candidates = vec![candidate(ACTOR, 10.0), candidate(OTHER, 20.0)];

        let report = harness.tick(0.0);
        assert_eq!(report.activated, vec![ACTOR, OTHER]);
        assert_eq!(report.dropped.len(), 1);
        assert_eq!(report.dropped[0].0, ACTOR);
        assert!(matches!(
            report.dropped[0].1,
            RagdollError::MalformedSkeleton {
                expected: 3,
                found: 2,
                ..
            }
        ));
        assert!(!harness.ctx.registry().contains(ACTOR));
        assert!(harness.ctx.registry().contains(OTHER));

        harness.host.actor_mut(OTHER).animated = None;
        let report = harness.tick(0.1);
        assert!(
            report
                .dropped
                .iter()
                .any(|(actor, err)| *actor == OTHER
                    && *err == RagdollError::MissingAnimatedPose(OTHER))
        );
    }

    #[test]
    fn missing_ease_action_stays_keyframed_and_retries() {
        let mut harness = Harness::new(RagdollOptions::default());
        harness.host.fail_ease_allocation = true;
        harness.tick(0.0);
        harness.push(RagdollTrigger::Shoved { actor: ACTOR });
        let report = harness.tick(0.1);
        assert!(report.dropped.is_empty());
        let reasons: Vec<_> = report.transitions.iter().map(|(_, t)| t.reason).collect();
        assert_eq!(
            reasons,
            vec![TransitionReason::Triggered, TransitionReason::Reset]
        );
        assert_eq!(harness.state(), RagdollState::Keyframed);
        assert!(!harness.ragdoll().is_on());
        assert!(!harness.host.actor(ACTOR).driver_enabled);

        harness.host.fail_ease_allocation = false;
        harness.push(RagdollTrigger::Shoved { actor: ACTOR });
        harness.tick(0.2);
        assert_eq!(harness.state(), RagdollState::BlendIn);
        assert!(harness.ragdoll().has_ease_constraints());
    }

    #[test]
    fn world_change_tears_down_and_waits() {
        let mut harness = Harness::new(RagdollOptions::default());
        harness.host = MockHost::default()
            .with_actor(ACTOR, 3)
            .with_actor(OTHER, 3);
        harness.candidates = vec![candidate(ACTOR, 10.0), candidate(OTHER, 20.0)];
        harness.blend_in();

        harness.push(RagdollTrigger::WorldChanged);
        let report = harness.tick(2.0);
        assert_eq!(report.deactivated, vec![ACTOR, OTHER]);
        assert!(report.activated.is_empty());
        assert!(harness.ctx.registry().is_empty());
        assert_eq!(harness.host.released_ease_actions, vec![1]);

        harness.tick(2.2);
        assert!(harness.ctx.registry().is_empty());
        assert_eq!(harness.tick(2.5).activated, vec![ACTOR, OTHER]);
    }

    #[test]
    fn trigger_filters() {
        let options = RagdollOptions {
            collision_min_speed: 1.0,
            enable_actor_shove: false,
            ..Default::default()
        };
        let mut harness = Harness::new(options);
        harness.tick(0.0);

        harness.push(RagdollTrigger::Collision {
            actor: ACTOR,
            separating_velocity: 0.5,
        });
        harness.push(RagdollTrigger::Shoved { actor: ACTOR });
        harness.push(RagdollTrigger::Dropped {
            actor: ACTOR,
            hand: Hand::Left,
        });
        harness.tick(0.1);
        assert_eq!(harness.state(), RagdollState::Keyframed);

        harness.push(RagdollTrigger::Grabbed {
            actor: ACTOR,
            hand: Hand::Right,
        });
        harness.tick(0.2);
        assert_eq!(harness.state(), RagdollState::BlendIn);
        assert!(harness.ragdoll().machine().is_held());
    }

    #[test]
    fn full_queue_rejects_triggers() {
        let options = RagdollOptions {
            trigger_queue_capacity: 2,
            ..Default::default()
        };
        let mut ctx = RagdollContext::new(&options);
        assert!(ctx.push_trigger(RagdollTrigger::WorldChanged).is_ok());
        assert!(ctx.push_trigger(RagdollTrigger::WorldChanged).is_ok());
        assert!(matches!(
            ctx.push_trigger(RagdollTrigger::Died { actor: ACTOR }),
            Err(TriggerQueueError::QueueFull { capacity: 2, .. })
        ));
        assert_eq!(ctx.triggers().len(), 2);
    }
}
