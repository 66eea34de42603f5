use bevy::reflect::{Reflect, std_traits::ReflectDefault};
use serde::{Deserialize, Serialize};

/// Timing curve applied to normalized blend progress.
#[derive(Reflect, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[reflect(Default)]
pub enum BlendCurve {
    Linear,
    #[default]
    SmoothStep,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl BlendCurve {
    /// Maps progress in [0, 1] to a blend factor in [0, 1]. Input outside the range, including
    /// NaN, is clamped first.
    pub fn apply(self, t: f32) -> f32 {
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };
        match self {
            BlendCurve::Linear => t,
            BlendCurve::SmoothStep => t * t * (3.0 - 2.0 * t),
            BlendCurve::EaseIn => t * t,
            BlendCurve::EaseOut => t * (2.0 - t),
            BlendCurve::EaseInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
        }
    }
}
