use bevy::{
    ecs::{component::Component, entity::Entity, system::Query, system::Res},
    reflect::Reflect,
    time::Time,
};

use crate::components::RagdollConstraintStiffness;

/// Lowest stiffness multiplier reached halfway through an easing action.
pub const MIN_EASED_STIFFNESS: f32 = 0.1;

/// A constraint easing action owned by one active ragdoll. While active, the actor's
/// [`RagdollConstraintStiffness`] dips toward [`MIN_EASED_STIFFNESS`] and recovers to `1.0` by the
/// end of `duration`.
#[derive(Component, Reflect, Debug, Clone, PartialEq)]
pub struct EaseConstraints {
    pub actor: Entity,
    pub duration: f64,
    pub elapsed: f64,
    pub active: bool,
}

impl EaseConstraints {
    pub fn new(actor: Entity) -> Self {
        Self {
            actor,
            duration: 0.0,
            elapsed: 0.0,
            active: false,
        }
    }

    pub fn restart(&mut self, duration: f64) {
        self.duration = duration.max(0.0);
        self.elapsed = 0.0;
        self.active = true;
    }

    pub fn advance(&mut self, dt: f64) {
        if !self.active {
            return;
        }
        self.elapsed += dt.max(0.0);
        if self.elapsed >= self.duration {
            self.active = false;
        }
    }

    pub fn stiffness(&self) -> f32 {
        if !self.active || self.duration <= 0.0 {
            return 1.0;
        }
        let t = (self.elapsed / self.duration).clamp(0.0, 1.0) as f32;
        MIN_EASED_STIFFNESS + (1.0 - MIN_EASED_STIFFNESS) * (2.0 * t - 1.0).abs()
    }
}

pub fn ramp_ease_constraints(
    time: Res<Time>,
    mut actions: Query<&mut EaseConstraints>,
    mut actors: Query<&mut RagdollConstraintStiffness>,
) {
    for mut action in &mut actions {
        if !action.active {
            continue;
        }
        action.advance(time.delta_secs_f64());
        if let Ok(mut stiffness) = actors.get_mut(action.actor) {
            stiffness.0 = action.stiffness();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stiffness_dips_then_recovers() {
        let mut action = EaseConstraints::new(Entity::PLACEHOLDER);
        assert_eq!(action.stiffness(), 1.0);

        action.restart(1.0);
        assert!((action.stiffness() - 1.0).abs() < 1e-6);

        action.advance(0.5);
        assert!((action.stiffness() - MIN_EASED_STIFFNESS).abs() < 1e-6);

        action.advance(0.25);
        let three_quarters = action.stiffness();
        assert!(three_quarters > MIN_EASED_STIFFNESS && three_quarters < 1.0);

        action.advance(0.25);
        assert!(!action.active);
        assert_eq!(action.stiffness(), 1.0);
    }

    #[test]
    fn restart_rewinds_an_active_action() {
        let mut action = EaseConstraints::new(Entity::PLACEHOLDER);
        action.restart(0.2);
        action.advance(0.1);
        action.restart(0.4);
        assert_eq!(action.elapsed, 0.0);
        assert_eq!(action.duration, 0.4);
        assert!(action.active);
    }

    #[test]
    fn zero_duration_ends_on_first_step() {
        let mut action = EaseConstraints::new(Entity::PLACEHOLDER);
        action.restart(0.0);
        action.advance(0.016);
        assert!(!action.active);
        assert_eq!(action.stiffness(), 1.0);
    }
}
