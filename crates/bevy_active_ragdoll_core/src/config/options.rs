use bevy::{
    asset::Asset,
    reflect::{Reflect, std_traits::ReflectDefault},
};
use serde::{Deserialize, Serialize};

use crate::{errors::ConfigError, host::DriverGains, interpolation::easing::BlendCurve};

/// Tunables for activation, blending and settle detection. The driver treats one value as an
/// immutable snapshot per tick; hosts may swap it between ticks.
#[derive(Asset, Reflect, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[reflect(Default)]
#[serde(default)]
pub struct RagdollOptions {
    /// Actors closer than this to the viewpoint become active
    pub active_ragdoll_start_distance: f32,
    /// Active actors further than this from the viewpoint are deactivated
    pub active_ragdoll_end_distance: f32,

    pub blend_in_time: f64,
    pub get_up_blend_time: f64,
    pub blend_curve: BlendCurve,
    /// When false, blend-in and blend-out complete immediately
    pub do_blending: bool,
    /// Hard-keyframe the bodies to the animated pose at the start of blend-in
    pub enable_keyframes: bool,
    pub blend_in_keyframe_time: f64,

    pub settle_stress_threshold: f32,
    /// How long average stress must stay below the threshold before blending out
    pub settle_time: f64,
    /// Maximum time spent colliding before blending out regardless of stress
    pub collide_timeout: Option<f64>,
    /// Per-tick retention of the running stress value, in (0, 1)
    pub stress_decay: f32,
    pub angular_stress_weight: f32,

    pub collision_cooldown_time: f64,
    pub collision_min_speed: f32,
    pub world_changed_wait_time: f64,
    pub enable_actor_shove: bool,

    pub hierarchy_gain: f32,
    pub velocity_gain: f32,
    pub position_gain: f32,

    /// Upper bound on the per-tick delta, so a stall cannot skip a blend
    pub max_delta_time: f64,
    pub trigger_queue_capacity: usize,

    pub force_anim_pose: bool,
    pub force_ragdoll_pose: bool,
}

impl Default for RagdollOptions {
    fn default() -> Self {
        Self {
            active_ragdoll_start_distance: 50.0,
            active_ragdoll_end_distance: 60.0,
            blend_in_time: 0.2,
            get_up_blend_time: 0.2,
            blend_curve: BlendCurve::SmoothStep,
            do_blending: true,
            enable_keyframes: true,
            blend_in_keyframe_time: 0.05,
            settle_stress_threshold: 0.05,
            settle_time: 0.2,
            collide_timeout: None,
            stress_decay: 0.9,
            angular_stress_weight: 0.25,
            collision_cooldown_time: 0.7,
            collision_min_speed: 0.0,
            world_changed_wait_time: 0.4,
            enable_actor_shove: true,
            hierarchy_gain: 0.6,
            velocity_gain: 0.6,
            position_gain: 0.05,
            max_delta_time: 0.1,
            trigger_queue_capacity: 256,
            force_anim_pose: false,
            force_ragdoll_pose: false,
        }
    }
}

impl RagdollOptions {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let options: RagdollOptions = ron::de::from_str(source)?;
        options.validate()?;
        Ok(options)
    }

    pub fn from_ron_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let options: RagdollOptions = ron::de::from_bytes(bytes)?;
        options.validate()?;
        Ok(options)
    }

    pub fn gains(&self) -> DriverGains {
        DriverGains {
            hierarchy: self.hierarchy_gain,
            velocity: self.velocity_gain,
            position: self.position_gain,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.active_ragdoll_start_distance < self.active_ragdoll_end_distance) {
            return Err(invalid(
                "active_ragdoll_start_distance",
                format!(
                    "must be less than active_ragdoll_end_distance ({} >= {})",
                    self.active_ragdoll_start_distance, self.active_ragdoll_end_distance
                ),
            ));
        }

        let durations = [
            ("blend_in_time", self.blend_in_time),
            ("get_up_blend_time", self.get_up_blend_time),
            ("blend_in_keyframe_time", self.blend_in_keyframe_time),
            ("settle_time", self.settle_time),
            ("collision_cooldown_time", self.collision_cooldown_time),
            ("world_changed_wait_time", self.world_changed_wait_time),
            ("max_delta_time", self.max_delta_time),
        ];
        for (field, value) in durations {
            if !(value >= 0.0) {
                return Err(invalid(field, format!("must be a non-negative time, got {value}")));
            }
        }
        if let Some(timeout) = self.collide_timeout
            && !(timeout > 0.0)
        {
            return Err(invalid(
                "collide_timeout",
                format!("must be positive when set, got {timeout}"),
            ));
        }

        if !(self.stress_decay > 0.0 && self.stress_decay < 1.0) {
            return Err(invalid(
                "stress_decay",
                format!("must be in (0, 1), got {}", self.stress_decay),
            ));
        }

        let gains = [
            ("hierarchy_gain", self.hierarchy_gain),
            ("velocity_gain", self.velocity_gain),
            ("position_gain", self.position_gain),
        ];
        for (field, value) in gains {
            if !(0.0..=1.0).contains(&value) {
                return Err(invalid(field, format!("must be in [0, 1], got {value}")));
            }
        }

        if self.trigger_queue_capacity == 0 {
            return Err(invalid("trigger_queue_capacity", "must be at least 1".into()));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: String) -> ConfigError {
    ConfigError::Invalid { field, reason }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(RagdollOptions::default().validate().is_ok());
    }

    #[test]
    fn partial_ron_fills_defaults() {
        let options = RagdollOptions::from_ron_str(
            "(blend_in_time: 0.5, blend_curve: Linear, collide_timeout: Some(4.0))",
        )
        .unwrap();
        assert_eq!(options.blend_in_time, 0.5);
        assert_eq!(options.blend_curve, BlendCurve::Linear);
        assert_eq!(options.collide_timeout, Some(4.0));
        assert_eq!(options.active_ragdoll_start_distance, 50.0);
        assert_eq!(options.hierarchy_gain, 0.6);
    }

    #[test]
    fn rejects_inverted_distances() {
        let err = RagdollOptions::from_ron_str(
            "(active_ragdoll_start_distance: 70.0, active_ragdoll_end_distance: 60.0)",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "active_ragdoll_start_distance",
                ..
            }
        ));
    }

    #[test]
    fn rejects_out_of_range_values() {
        let cases = [
            ("(blend_in_time: -0.1)", "blend_in_time"),
            ("(stress_decay: 1.0)", "stress_decay"),
            ("(velocity_gain: 1.5)", "velocity_gain"),
            ("(collide_timeout: Some(0.0))", "collide_timeout"),
            ("(trigger_queue_capacity: 0)", "trigger_queue_capacity"),
        ];
        for (source, expected) in cases {
            match RagdollOptions::from_ron_str(source) {
                Err(ConfigError::Invalid { field, .. }) => assert_eq!(field, expected),
                other => panic!("{source}: expected invalid {expected}, got {other:?}"),
            }
        }
    }

    #[test]
    fn malformed_ron_is_a_parse_error() {
        assert!(matches!(
            RagdollOptions::from_ron_str("(blend_in_time: )"),
            Err(ConfigError::Ron(_))
        ));
    }
}
