use bevy::prelude::*;

use crate::pose::Pose;

pub trait InterpolateLinear {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self;
}

impl InterpolateLinear for Vec3 {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        self.lerp(*other, f)
    }
}

/// Spherical interpolation along the shortest arc. `q` and `-q` are the same rotation, so the
/// target is flipped into the source's hemisphere before interpolating.
impl InterpolateLinear for Quat {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        let mut end = *other;
        if self.dot(end) < 0.0 {
            end = -end;
        }
        self.slerp(end, f).normalize()
    }
}

impl InterpolateLinear for Transform {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        Transform {
            translation: self.translation.interpolate_linear(&other.translation, f),
            rotation: self.rotation.interpolate_linear(&other.rotation, f),
            scale: self.scale.interpolate_linear(&other.scale, f),
        }
    }
}

/// Bones missing from either side are taken from the pose that has them.
impl InterpolateLinear for Pose {
    fn interpolate_linear(&self, other: &Self, f: f32) -> Self {
        let len = self.bones.len().max(other.bones.len());
        let bones = (0..len)
            .map(|i| match (self.bones.get(i), other.bones.get(i)) {
                (Some(a), Some(b)) => a.interpolate_linear(b, f),
                (Some(a), None) => *a,
                (None, Some(b)) => *b,
                (None, None) => Transform::IDENTITY,
            })
            .collect();

        Pose { bones }
    }
}
