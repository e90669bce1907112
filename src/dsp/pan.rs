use std::f32::consts::FRAC_PI_4;

/// Equal-power pan law. `pan` runs from -1 (hard left) to +1 (hard right).
///
/// Returns `(left, right)` gains with `left² + right² = 1`.
#[inline]
pub fn equal_power(pan: f32) -> (f32, f32) {
    let angle = (pan.clamp(-1.0, 1.0) + 1.0) * FRAC_PI_4;
    (angle.cos(), angle.sin())
}

/// Inverse-distance attenuation, clamped to [0, 1].
///
/// `ref / (ref + rolloff · max(0, distance - ref))`
#[inline]
pub fn distance_gain(distance: f32, ref_distance: f32, rolloff: f32) -> f32 {
    let ref_distance = ref_distance.max(f32::EPSILON);
    let excess = (distance - ref_distance).max(0.0);
    (ref_distance / (ref_distance + rolloff.max(0.0) * excess)).clamp(0.0, 1.0)
}

#[inline]
pub fn hard_clip(x: f32) -> f32 {
    x.clamp(-1.0, 1.0)
}
