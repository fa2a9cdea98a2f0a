//! Azimuthal equidistant projection about the radar location.
//!
//! Distances from the origin along great circles are preserved, which keeps
//! ground range consistent with the beam geometry out to typical radar
//! ranges. A spherical Earth is assumed.

use crate::volume::Origin;

/// Sphere radius for the projection, in meters.
pub const PROJECTION_EARTH_RADIUS: f64 = 6_370_997.0;

/// Projects `(lon, lat)` in degrees onto `(x, y)` meters east/north of `origin`.
pub fn geographic_to_local_cartesian(lon: f64, lat: f64, origin: &Origin) -> (f64, f64) {
    let lat = lat.to_radians();
    let lat0 = origin.latitude.to_radians();
    let dlon = (lon - origin.longitude).to_radians();

    let cos_c = (lat0.sin() * lat.sin() + lat0.cos() * lat.cos() * dlon.cos()).clamp(-1.0, 1.0);
    let c = cos_c.acos();
    let k = if c == 0.0 { 1.0 } else { c / c.sin() };

    let x = PROJECTION_EARTH_RADIUS * k * lat.cos() * dlon.sin();
    let y = PROJECTION_EARTH_RADIUS * k * (lat0.cos() * lat.sin() - lat0.sin() * lat.cos() * dlon.cos());
    (x, y)
}

/// Inverse of [`geographic_to_local_cartesian`]; longitude wrapped to `[-180, 180]`.
pub fn local_cartesian_to_geographic(x: f64, y: f64, origin: &Origin) -> (f64, f64) {
    let lat0 = origin.latitude.to_radians();
    let rho = x.hypot(y);
    if rho == 0.0 {
        return (origin.longitude, origin.latitude);
    }
    let c = rho / PROJECTION_EARTH_RADIUS;

    let lat = (c.cos() * lat0.sin() + y * c.sin() * lat0.cos() / rho)
        .clamp(-1.0, 1.0)
        .asin();
    let x1 = x * c.sin();
    let x2 = rho * lat0.cos() * c.cos() - y * lat0.sin() * c.sin();
    let mut lon = origin.longitude + x1.atan2(x2).to_degrees();
    if lon > 180.0 {
        lon -= 360.0;
    } else if lon < -180.0 {
        lon += 360.0;
    }
    (lon, lat.to_degrees())
}
