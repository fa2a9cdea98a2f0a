use crate::math::AntennaCoords;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub longitude: f64,
    pub latitude: f64,
    /// Meters above mean sea level.
    pub altitude: f64,
}

/// Value of the bin nearest a point of interest, with the coordinates that
/// were asked for and those of the bin actually read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointRecord {
    /// `None` when the bin holds a masked value.
    pub value: Option<f64>,
    pub datatype: String,
    pub field: String,
    pub time: DateTime<Utc>,
    pub requested_geographic: GeoPoint,
    pub requested_antenna: AntennaCoords,
    pub used_antenna: AntennaCoords,
    pub ray_index: usize,
    pub bin_index: usize,
}
