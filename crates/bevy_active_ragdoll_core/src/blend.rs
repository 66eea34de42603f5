//! Timed interpolation between two skeleton poses.

use bevy::{reflect::Reflect, transform::components::Transform};

use crate::{
    interpolation::{easing::BlendCurve, linear::InterpolateLinear},
    pose::Pose,
};

/// Tolerance on elapsed time so that deltas summing to the duration finish the blend on the
/// last step despite floating point accumulation.
pub const TIME_EPSILON: f64 = 1e-9;

/// Result of one [`Blender::advance`] call.
#[derive(Debug, Clone, Copy)]
pub struct BlendStep<'a> {
    pub pose: &'a Pose,
    /// Eased blend factor, 0 at the "from" pose and 1 at the "to" pose
    pub factor: f32,
    pub is_complete: bool,
}

#[derive(Reflect, Debug, Clone, Default)]
pub struct Blender {
    from: Pose,
    to: Pose,
    current: Pose,
    duration: f64,
    elapsed: f64,
    curve: BlendCurve,
    factor: f32,
    complete: bool,
}

impl Blender {
    /// Starts a new blend, discarding any progress of a blend that is still running.
    pub fn start(&mut self, from: Pose, to: Pose, duration: f64, curve: BlendCurve) {
        self.current = from.clone();
        self.from = from;
        self.to = to;
        self.duration = duration;
        self.elapsed = 0.0;
        self.curve = curve;
        self.factor = 0.0;
        self.complete = false;
    }

    /// Replaces the "to" endpoint, keeping progress. The target of a ragdoll blend is a live
    /// pose that moves every frame.
    pub fn set_target(&mut self, to: Pose) {
        self.to = to;
    }

    pub fn advance(&mut self, delta_time: f64) -> BlendStep<'_> {
        if delta_time.is_finite() && delta_time > 0.0 {
            self.elapsed += delta_time;
        }

        let progress = if self.duration.is_nan()
            || self.duration <= 0.0
            || self.elapsed + TIME_EPSILON >= self.duration
        {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        };

        if progress >= 1.0 {
            self.factor = 1.0;
            self.complete = true;
            self.current = self.to.clone();
        } else {
            self.factor = self.curve.apply(progress as f32);
            self.complete = false;
            self.current = self.from.interpolate_linear(&self.to, self.factor);
        }

        BlendStep {
            pose: &self.current,
            factor: self.factor,
            is_complete: self.complete,
        }
    }

    /// Last pose produced by [`Blender::advance`], or the "from" pose right after a start.
    pub fn current(&self) -> &Pose {
        &self.current
    }

    pub fn target(&self) -> &Pose {
        &self.to
    }

    pub fn factor(&self) -> f32 {
        self.factor
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }
}

/// Blends a single bone's local transform.
pub fn blend_bone(from: &Transform, to: &Transform, factor: f32) -> Transform {
    from.interpolate_linear(to, factor)
}
