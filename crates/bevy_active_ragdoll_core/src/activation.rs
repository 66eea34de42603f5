/// Distance-gated activation with hysteresis. Actors activate inside `start` and only deactivate
/// beyond `end`; in between they keep whatever state they had.
pub fn should_be_active(was_active: bool, distance: f32, start: f32, end: f32) -> bool {
    if distance.is_nan() {
        return false;
    }
    if was_active {
        distance <= end
    } else {
        distance < start
    }
}
