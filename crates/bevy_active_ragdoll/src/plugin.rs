use bevy::{
    app::{App, FixedPostUpdate, Plugin, PostUpdate},
    asset::AssetApp,
    ecs::{
        intern::Interned,
        schedule::{IntoScheduleConfigs, ScheduleLabel, SystemSet},
    },
    transform::TransformSystems,
};
use bevy_active_ragdoll_core::{
    config::RagdollOptions,
    events::{Hand, RagdollTrigger},
    host::{BodyState, DriverGains},
    interpolation::easing::BlendCurve,
    pose::Pose,
    registry::RagdollContext,
    skeleton::Skeleton,
    state_machine::RagdollState,
};

use crate::{
    components::{
        ActiveRagdollOptions, AnimatedPose, BlendedPose, RagdollActor, RagdollBodies,
        RagdollBones, RagdollConstraintStiffness, RagdollContextResource, RagdollDriveGains,
        RagdollDriverEnabled, RagdollViewpoint,
    },
    ease_constraints::{EaseConstraints, ramp_ease_constraints},
    loaders::{RagdollOptionsLoader, SkeletonLoader, sync_ragdoll_options},
    systems::apply_blended_poses,
    triggers::RagdollTriggerEvent,
};

/// Adds active ragdoll support to an app
pub struct ActiveRagdollPlugin {
    /// Schedule the driver runs in. Should be the schedule physics runs in.
    pub physics_schedule: Interned<dyn ScheduleLabel>,
    pub final_schedule: Interned<dyn ScheduleLabel>,
    /// Initial options. Point [`ActiveRagdollOptions::source`] at a `*.ragdoll.ron` asset to
    /// replace them at runtime.
    pub options: RagdollOptions,
}

impl Default for ActiveRagdollPlugin {
    fn default() -> Self {
        Self {
            physics_schedule: FixedPostUpdate.intern(),
            final_schedule: PostUpdate.intern(),
            options: RagdollOptions::default(),
        }
    }
}

impl ActiveRagdollPlugin {
    pub fn with_options(mut self, options: RagdollOptions) -> Self {
        self.options = options;
        self
    }
}

#[derive(Clone, Debug, Copy, PartialEq, Eq, Hash, SystemSet)]
pub enum ActiveRagdollSet {
    /// Runs in the physics schedule, before the driver. Picks up reloaded options and advances
    /// constraint easing.
    Sync,
    /// Runs in the physics schedule, before the physics update
    Drive,
    /// Runs at the end of the frame, before transform propagation
    Apply,
}

impl Plugin for ActiveRagdollPlugin {
    fn build(&self, app: &mut App) {
        self.register_assets(app);
        self.register_types(app);

        app.insert_resource(ActiveRagdollOptions {
            options: self.options.clone(),
            source: None,
        });
        app.insert_resource(RagdollContextResource(RagdollContext::new(&self.options)));

        app.configure_sets(
            self.physics_schedule,
            (ActiveRagdollSet::Sync, ActiveRagdollSet::Drive).chain(),
        );
        app.configure_sets(
            self.final_schedule,
            ActiveRagdollSet::Apply.before(TransformSystems::Propagate),
        );

        app.add_systems(
            self.physics_schedule,
            (sync_ragdoll_options, ramp_ease_constraints)
                .chain()
                .in_set(ActiveRagdollSet::Sync),
        );

        #[cfg(feature = "physics_avian")]
        {
            use avian3d::prelude::{PhysicsSchedule, PhysicsSystems, SolverSystems};

            use crate::physics_systems_avian::{drive_active_ragdolls, drive_ragdoll_bodies};

            app.configure_sets(
                self.physics_schedule,
                ActiveRagdollSet::Drive.before(PhysicsSystems::First),
            );

            app.add_systems(
                self.physics_schedule,
                drive_active_ragdolls.in_set(ActiveRagdollSet::Drive),
            );

            app.add_systems(
                PhysicsSchedule,
                drive_ragdoll_bodies
                    .after(SolverSystems::PreSubstep)
                    .before(SolverSystems::Substep),
            );
        }

        app.add_systems(
            self.final_schedule,
            apply_blended_poses.in_set(ActiveRagdollSet::Apply),
        );

        app.add_observer(RagdollTriggerEvent::observe);
    }
}

impl ActiveRagdollPlugin {
    /// Registers asset types and their loaders
    fn register_assets(&self, app: &mut App) {
        app.init_asset::<RagdollOptions>()
            .init_asset_loader::<RagdollOptionsLoader>()
            .register_asset_reflect::<RagdollOptions>();
        app.init_asset::<Skeleton>()
            .init_asset_loader::<SkeletonLoader>()
            .register_asset_reflect::<Skeleton>();
    }

    /// "Other" reflect registrations
    fn register_types(&self, app: &mut App) {
        app //
            .register_type::<Pose>()
            .register_type::<BodyState>()
            .register_type::<DriverGains>()
            .register_type::<BlendCurve>()
            .register_type::<Hand>()
            .register_type::<RagdollTrigger>()
            .register_type::<RagdollState>()
            .register_type::<RagdollViewpoint>()
            .register_type::<RagdollActor>()
            .register_type::<AnimatedPose>()
            .register_type::<BlendedPose>()
            .register_type::<RagdollBodies>()
            .register_type::<RagdollBones>()
            .register_type::<RagdollDriveGains>()
            .register_type::<RagdollDriverEnabled>()
            .register_type::<RagdollConstraintStiffness>()
            .register_type::<EaseConstraints>();
    }
}
