use avian3d::prelude::{AngularVelocity, LinearVelocity, Position, RigidBody, Rotation};
use bevy::asset::Assets;
use bevy::ecs::entity::Entity;
use bevy::ecs::query::With;
use bevy::ecs::system::{Commands, Query, Res, ResMut, SystemParam};
use bevy::log::debug;
use bevy::math::{Quat, Vec3};
use bevy::time::Time;
use bevy::transform::components::{GlobalTransform, Transform};
use bevy_active_ragdoll_core::{
    errors::PhysicsError,
    host::{BodyState, DriverGains, EaseConstraintsHandle, PhysicsInterface, PoseSource},
    id::ActorId,
    pose::Pose,
    registry::{Candidate, TickInput},
    skeleton::Skeleton,
};

use crate::{
    components::{
        ActiveRagdollOptions, AnimatedPose, BlendedPose, RagdollActor, RagdollBodies,
        RagdollConstraintStiffness, RagdollContextResource, RagdollDriveGains,
        RagdollDriverEnabled, RagdollViewpoint, actor_entity, actor_id,
    },
    ease_constraints::EaseConstraints,
};

/// Avian-backed host for the ragdoll driver: reads animated poses and simulated bodies from the
/// ECS and writes the driver's requests back as components.
#[derive(SystemParam)]
pub struct AvianRagdollHost<'w, 's> {
    actors: Query<
        'w,
        's,
        (
            Entity,
            &'static RagdollActor,
            &'static AnimatedPose,
            &'static RagdollBodies,
            &'static GlobalTransform,
            &'static mut BlendedPose,
            &'static mut RagdollDriveGains,
            &'static mut RagdollDriverEnabled,
            &'static mut RagdollConstraintStiffness,
        ),
    >,
    bodies: Query<
        'w,
        's,
        (
            &'static mut Position,
            &'static mut Rotation,
            &'static mut LinearVelocity,
            &'static mut AngularVelocity,
        ),
        With<RigidBody>,
    >,
    ease_actions: Query<'w, 's, &'static mut EaseConstraints>,
    skeletons: Res<'w, Assets<Skeleton>>,
    commands: Commands<'w, 's>,
}

impl AvianRagdollHost<'_, '_> {
    /// Actors whose skeleton asset has finished loading.
    pub fn candidates(&self) -> Vec<Candidate> {
        self.actors
            .iter()
            .filter_map(|(entity, actor, _, _, global, ..)| {
                let skeleton = self.skeletons.get(&actor.skeleton)?;
                Some(Candidate {
                    actor: actor_id(entity),
                    position: global.translation(),
                    bone_count: skeleton.bone_count(),
                })
            })
            .collect()
    }
}

impl PoseSource for AvianRagdollHost<'_, '_> {
    fn animated_pose(&self, actor: ActorId) -> Option<Pose> {
        let (_, _, animated, ..) = self.actors.get(actor_entity(actor)).ok()?;
        Some(animated.0.clone())
    }
}

impl PhysicsInterface for AvianRagdollHost<'_, '_> {
    fn body_states(&self, actor: ActorId) -> Option<Vec<BodyState>> {
        let (_, ragdoll_actor, _, bodies, global, ..) =
            self.actors.get(actor_entity(actor)).ok()?;
        let skeleton = self.skeletons.get(&ragdoll_actor.skeleton)?;

        let mut worlds = Vec::with_capacity(bodies.0.len());
        let mut velocities = Vec::with_capacity(bodies.0.len());
        for body in &bodies.0 {
            let (pos, rot, linvel, angvel) = self.bodies.get(*body).ok()?;
            worlds.push(Transform::from_translation(pos.0).with_rotation(rot.0));
            velocities.push((linvel.0, angvel.0));
        }

        // A body count that disagrees with the skeleton is passed through so the driver can
        // report the mismatch
        let pose = skeleton.pose_from_bone_world_transforms(&worlds, global.compute_transform());
        Some(
            worlds
                .iter()
                .zip(velocities)
                .enumerate()
                .map(|(i, (world, (linear_velocity, angular_velocity)))| BodyState {
                    transform: pose.bones.get(i).copied().unwrap_or(*world),
                    linear_velocity,
                    angular_velocity,
                })
                .collect(),
        )
    }

    fn write_pose(&mut self, actor: ActorId, pose: &Pose) {
        if let Ok((_, _, _, _, _, mut blended, ..)) = self.actors.get_mut(actor_entity(actor)) {
            blended.0.clone_from(pose);
        }
    }

    fn keyframe_bodies(&mut self, actor: ActorId, pose: &Pose) {
        let Ok((_, ragdoll_actor, _, bodies, global, ..)) = self.actors.get(actor_entity(actor))
        else {
            return;
        };
        let Some(skeleton) = self.skeletons.get(&ragdoll_actor.skeleton) else {
            return;
        };
        let targets = skeleton.bone_world_transforms(pose, global.compute_transform());
        for (body, target) in bodies.0.iter().zip(&targets) {
            if let Ok((mut pos, mut rot, mut linvel, mut angvel)) = self.bodies.get_mut(*body) {
                pos.0 = target.translation;
                rot.0 = target.rotation;
                linvel.0 = Vec3::ZERO;
                angvel.0 = Vec3::ZERO;
            }
        }
    }

    fn set_driver_enabled(&mut self, actor: ActorId, enabled: bool) {
        let Ok((_, _, _, bodies, _, _, _, mut driver_enabled, _)) =
            self.actors.get_mut(actor_entity(actor))
        else {
            return;
        };
        driver_enabled.0 = enabled;
        let target_mode = if enabled {
            RigidBody::Dynamic
        } else {
            RigidBody::Kinematic
        };
        for body in &bodies.0 {
            self.commands.entity(*body).insert(target_mode);
        }
    }

    fn set_gains(&mut self, actor: ActorId, gains: DriverGains) {
        if let Ok((_, _, _, _, _, _, mut drive_gains, ..)) =
            self.actors.get_mut(actor_entity(actor))
        {
            drive_gains.0 = gains;
        }
    }

    fn create_ease_constraints(
        &mut self,
        actor: ActorId,
    ) -> Result<EaseConstraintsHandle, PhysicsError> {
        let entity = actor_entity(actor);
        if !self.actors.contains(entity) {
            return Err(PhysicsError::UnknownActor(actor));
        }
        let action = self.commands.spawn(EaseConstraints::new(entity)).id();
        Ok(EaseConstraintsHandle::new(actor, action.to_bits()))
    }

    fn activate_ease_constraints(&mut self, handle: &EaseConstraintsHandle, duration: f64) {
        let action = Entity::from_bits(handle.raw());
        if let Ok(mut ease) = self.ease_actions.get_mut(action) {
            ease.restart(duration);
        } else {
            // Spawned this tick, not visible to the query yet
            let mut ease = EaseConstraints::new(actor_entity(handle.actor()));
            ease.restart(duration);
            self.commands.entity(action).insert(ease);
        }
    }

    fn release_ease_constraints(&mut self, handle: EaseConstraintsHandle) {
        if let Ok((_, _, _, _, _, _, _, _, mut stiffness)) =
            self.actors.get_mut(actor_entity(handle.actor()))
        {
            stiffness.0 = 1.0;
        }
        self.commands.entity(Entity::from_bits(handle.raw())).despawn();
    }
}

/// Runs one driver tick for every ragdoll actor, before the physics step.
pub fn drive_active_ragdolls(
    mut context: ResMut<RagdollContextResource>,
    options: Res<ActiveRagdollOptions>,
    time: Res<Time>,
    viewpoints: Query<&GlobalTransform, With<RagdollViewpoint>>,
    mut host: AvianRagdollHost,
) {
    let Some(viewpoint) = viewpoints.iter().next() else {
        debug!("No ragdoll viewpoint, skipping active ragdoll update");
        return;
    };
    let candidates = host.candidates();
    let input = TickInput {
        now: time.elapsed_secs_f64(),
        viewpoint: viewpoint.translation(),
        candidates: &candidates,
    };
    context.0.tick(&input, &options.options, &mut host);
}

/// Velocities that carry a body from its current placement onto `target` in `dt`.
pub fn velocities_toward(
    position: Vec3,
    rotation: Quat,
    target: &Transform,
    dt: f32,
) -> (Vec3, Vec3) {
    let linvel = (target.translation - position) / dt;

    let start = rotation;
    let mut end = target.rotation;
    // Take the short way around
    if start.dot(end) < 0.0 {
        end = -end;
    }
    let quat_diff = (end * start.conjugate()).normalize();
    let angvel = quat_diff.to_scaled_axis() / dt;

    (linvel, angvel)
}

/// Pulls the simulated bodies toward the animated pose. Kinematic bodies follow it exactly;
/// dynamic ones are corrected by the actor's drive gains, scaled by its constraint stiffness.
pub fn drive_ragdoll_bodies(
    actors: Query<(
        &RagdollActor,
        &AnimatedPose,
        &RagdollBodies,
        &GlobalTransform,
        &RagdollDriveGains,
        &RagdollDriverEnabled,
        &RagdollConstraintStiffness,
    )>,
    mut bodies: Query<(
        &mut Position,
        &Rotation,
        &RigidBody,
        &mut LinearVelocity,
        &mut AngularVelocity,
    )>,
    skeletons: Res<Assets<Skeleton>>,
    time: Res<Time>,
) {
    let dt = time.delta_secs();
    if dt <= 0.0 {
        return;
    }

    for (actor, animated, ragdoll_bodies, global, gains, enabled, stiffness) in &actors {
        let Some(skeleton) = skeletons.get(&actor.skeleton) else {
            continue;
        };
        let targets = skeleton.bone_world_transforms(&animated.0, global.compute_transform());
        let gains = gains.0.scaled(stiffness.0);

        for (body, target) in ragdoll_bodies.0.iter().zip(&targets) {
            let Ok((mut pos, rot, rigid_body, mut linvel, mut angvel)) = bodies.get_mut(*body)
            else {
                continue;
            };
            let (target_linvel, target_angvel) = velocities_toward(pos.0, rot.0, target, dt);

            if rigid_body.is_kinematic() {
                linvel.0 = target_linvel;
                angvel.0 = target_angvel;
            } else if enabled.0 {
                angvel.0 = angvel.0.lerp(target_angvel, gains.hierarchy);
                linvel.0 = linvel.0.lerp(target_linvel, gains.velocity);
                pos.0 = pos.0.lerp(target.translation, gains.position);
            }
        }
    }
}
