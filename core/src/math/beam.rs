//! Effective-Earth-radius beam height model.
//!
//! Standard refraction is approximated by bending the Earth instead of the
//! ray: the radius is scaled by 4/3. This is not ray tracing and will not
//! agree with soundings in anomalous propagation.

/// Mean Earth radius used by the beam height model, in meters.
pub const EARTH_RADIUS: f64 = 6_378_100.0;

pub const EFFECTIVE_RADIUS_FACTOR: f64 = 4.0 / 3.0;

pub fn effective_radius() -> f64 {
    EARTH_RADIUS * EFFECTIVE_RADIUS_FACTOR
}

/// Height of the beam centre above the antenna, in meters, at a
/// ground-projected distance `ground_range` (m) for elevation `elevation_deg`.
pub fn beam_height_above_radar(ground_range: f64, elevation_deg: f64) -> f64 {
    let re = effective_radius();
    let el = elevation_deg.to_radians();
    let r = ground_range / el.cos();
    (r * r + re * re + 2.0 * r * re * el.sin()).sqrt() - re
}
