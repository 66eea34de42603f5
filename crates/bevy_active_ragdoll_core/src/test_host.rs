use bevy::{
    math::{Quat, Vec3},
    platform::collections::HashMap,
    transform::components::Transform,
};

use crate::{
    errors::PhysicsError,
    host::{BodyState, DriverGains, EaseConstraintsHandle, PhysicsInterface, PoseSource},
    id::ActorId,
    pose::Pose,
};

#[derive(Debug, Clone, Default)]
pub struct MockActor {
    pub animated: Option<Pose>,
    pub bodies: Option<Vec<BodyState>>,
    pub driver_enabled: bool,
    /// Every driver switch requested, in order
    pub driver_switches: Vec<bool>,
    pub gains: DriverGains,
    pub written: Vec<Pose>,
    pub keyframed: usize,
}

/// In-memory stand-in for the animation and physics systems.
#[derive(Debug, Default)]
pub struct MockHost {
    pub actors: HashMap<ActorId, MockActor>,
    pub fail_ease_allocation: bool,
    pub live_ease_actions: Vec<(ActorId, u64)>,
    pub ease_activations: Vec<(u64, f64)>,
    pub released_ease_actions: Vec<u64>,
    pub(crate) next_ease_action: u64,
}

impl MockHost {
    /// Adds an actor whose animated pose stands straight and whose bodies hang rotated and
    /// displaced, so blends between the two are observable.
    pub fn with_actor(mut self, actor: ActorId, bone_count: usize) -> Self {
        self.actors.insert(
            actor,
            MockActor {
                animated: Some(animated_pose(bone_count)),
                bodies: Some(vec![simulated_body(); bone_count]),
                ..Default::default()
            },
        );
        self
    }

    pub fn actor(&self, actor: ActorId) -> &MockActor {
        &self.actors[&actor]
    }

    pub fn actor_mut(&mut self, actor: ActorId) -> &mut MockActor {
        self.actors.entry(actor).or_default()
    }

    pub fn set_velocities(&mut self, actor: ActorId, linear: Vec3, angular: Vec3) {
        if let Some(bodies) = &mut self.actor_mut(actor).bodies {
            for body in bodies {
                body.linear_velocity = linear;
                body.angular_velocity = angular;
            }
        }
    }
}

pub fn animated_pose(bone_count: usize) -> Pose {
    Pose::from_bones(
        (0..bone_count)
            .map(|i| Transform::from_xyz(0., i as f32, 0.))
            .collect(),
    )
}

pub fn simulated_body() -> BodyState {
    BodyState {
        transform: Transform::from_xyz(2., 0., 0.).with_rotation(Quat::from_rotation_z(1.0)),
        ..Default::default()
    }
}

impl PoseSource for MockHost {
    fn animated_pose(&self, actor: ActorId) -> Option<Pose> {
        self.actors.get(&actor)?.animated.clone()
    }
}

impl PhysicsInterface for MockHost {
    fn body_states(&self, actor: ActorId) -> Option<Vec<BodyState>> {
        self.actors.get(&actor)?.bodies.clone()
    }

    fn write_pose(&mut self, actor: ActorId, pose: &Pose) {
        self.actor_mut(actor).written.push(pose.clone());
    }

    fn keyframe_bodies(&mut self, actor: ActorId, _pose: &Pose) {
        self.actor_mut(actor).keyframed += 1;
    }

    fn set_driver_enabled(&mut self, actor: ActorId, enabled: bool) {
        let mock = self.actor_mut(actor);
        mock.driver_enabled = enabled;
        mock.driver_switches.push(enabled);
    }

    fn set_gains(&mut self, actor: ActorId, gains: DriverGains) {
        self.actor_mut(actor).gains = gains;
    }

    fn create_ease_constraints(
        &mut self,
        actor: ActorId,
    ) -> Result<EaseConstraintsHandle, PhysicsError> {
        if self.fail_ease_allocation {
            return Err(PhysicsError::EaseActionAllocation(actor));
        }
        self.next_ease_action += 1;
        self.live_ease_actions.push((actor, self.next_ease_action));
        Ok(EaseConstraintsHandle::new(actor, self.next_ease_action))
    }

    fn activate_ease_constraints(&mut self, handle: &EaseConstraintsHandle, duration: f64) {
        self.ease_activations.push((handle.raw(), duration));
    }

    fn release_ease_constraints(&mut self, handle: EaseConstraintsHandle) {
        self.live_ease_actions.retain(|(_, raw)| *raw != handle.raw());
        self.released_ease_actions.push(handle.raw());
    }
}
