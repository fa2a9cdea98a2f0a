//! Straight-line conversion between antenna coordinates and the local
//! Cartesian frame centred on the radar (x east, y north, z up).
//!
//! Beam curvature is not applied here; see [`super::beam`].

use serde::{Deserialize, Serialize};

/// Radar-relative position. Angles in degrees, range in meters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AntennaCoords {
    pub azimuth: f64,
    pub elevation: f64,
    pub range: f64,
}

impl AntennaCoords {
    pub fn new(azimuth: f64, elevation: f64, range: f64) -> Self {
        Self {
            azimuth,
            elevation,
            range,
        }
    }
}

/// Converts a local offset (m) to antenna coordinates; azimuth in `[0, 360)`.
pub fn local_cartesian_to_antenna(x: f64, y: f64, height_above_radar: f64) -> AntennaCoords {
    let ground = x.hypot(y);
    let range = (ground * ground + height_above_radar * height_above_radar).sqrt();
    let elevation = height_above_radar.atan2(ground).to_degrees();
    let mut azimuth = x.atan2(y).to_degrees();
    if azimuth < 0.0 {
        azimuth += 360.0;
    }
    if azimuth >= 360.0 {
        azimuth -= 360.0;
    }
    AntennaCoords {
        azimuth,
        elevation,
        range,
    }
}

/// Returns `(x, y, height_above_radar)` in meters.
pub fn antenna_to_local_cartesian(range: f64, azimuth: f64, elevation: f64) -> (f64, f64, f64) {
    let az = azimuth.to_radians();
    let el = elevation.to_radians();
    let ground = range * el.cos();
    (ground * az.sin(), ground * az.cos(), range * el.sin())
}
