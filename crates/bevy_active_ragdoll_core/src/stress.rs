//! Running estimate of how much a simulated skeleton is still moving.

use bevy::reflect::Reflect;

use crate::host::BodyState;

#[derive(Reflect, Debug, Clone, Default)]
pub struct StressTracker {
    stress: Vec<f32>,
    rest_stress: Vec<f32>,
    avg_stress: f32,
}

impl StressTracker {
    pub fn new(bone_count: usize) -> Self {
        Self {
            stress: vec![0.0; bone_count],
            rest_stress: vec![0.0; bone_count],
            avg_stress: 0.0,
        }
    }

    pub fn reset(&mut self, bone_count: usize) {
        self.stress.clear();
        self.stress.resize(bone_count, 0.0);
        self.rest_stress.clear();
        self.rest_stress.resize(bone_count, 0.0);
        self.avg_stress = 0.0;
    }

    pub fn bone_count(&self) -> usize {
        self.stress.len()
    }

    pub fn stress(&self) -> &[f32] {
        &self.stress
    }

    pub fn rest_stress(&self) -> &[f32] {
        &self.rest_stress
    }

    pub fn avg_stress(&self) -> f32 {
        self.avg_stress
    }

    /// Blends this tick's body motion into the running stress values. `bodies` must be in bone
    /// order; extra bodies are ignored and missing ones count as still.
    pub fn observe(&mut self, bodies: &[BodyState], decay: f32, angular_weight: f32) {
        let decay = decay.clamp(0.0, 1.0);
        for (i, stress) in self.stress.iter_mut().enumerate() {
            let magnitude = bodies
                .get(i)
                .map(|body| motion_magnitude(body, angular_weight))
                .unwrap_or(0.0);
            *stress = *stress * decay + (1.0 - decay) * magnitude;
        }
        self.avg_stress = mean(&self.stress);
    }

    /// Records the current stress as the settled baseline.
    pub fn snapshot_rest(&mut self) {
        self.rest_stress.clone_from(&self.stress);
    }

    /// Mean stress in excess of the rest baseline.
    pub fn stress_above_rest(&self) -> f32 {
        if self.stress.is_empty() {
            return 0.0;
        }
        let excess: f32 = self
            .stress
            .iter()
            .zip(&self.rest_stress)
            .map(|(stress, rest)| (stress - rest).max(0.0))
            .sum();
        excess / self.stress.len() as f32
    }
}

fn motion_magnitude(body: &BodyState, angular_weight: f32) -> f32 {
    let magnitude =
        body.linear_velocity.length() + angular_weight * body.angular_velocity.length();
    if magnitude.is_finite() { magnitude } else { 0.0 }
}

fn mean(values: &[f32]) -> f32 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f32>() / values.len() as f32
    }
}
