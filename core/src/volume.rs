use chrono::{DateTime, Duration, NaiveDateTime, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum VolumeError {
    #[error("{axis} has {found} entries, expected {expected} (one per ray)")]
    RayCountMismatch {
        axis: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("field {field} is shaped {rays}x{bins}, expected {expected_rays}x{expected_bins}")]
    FieldShape {
        field: String,
        rays: usize,
        bins: usize,
        expected_rays: usize,
        expected_bins: usize,
    },
    #[error("unsupported time units {0:?}")]
    TimeUnits(String),
    #[error("unsupported calendar {0:?}")]
    Calendar(String),
    #[error("ray {0} has no time entry")]
    MissingRayTime(usize),
}

/// Geographic location of the radar antenna.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Origin {
    pub longitude: f64,
    pub latitude: f64,
    /// Meters above mean sea level.
    pub altitude: f64,
}

/// Per-ray acquisition time with CF-style units, e.g.
/// `"seconds since 2024-05-01T12:00:00Z"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeAxis {
    pub data: Vec<f64>,
    pub units: String,
    #[serde(default = "default_calendar")]
    pub calendar: String,
}

fn default_calendar() -> String {
    "standard".to_string()
}

impl TimeAxis {
    /// Decodes the offset stored for `ray` into a UTC timestamp.
    pub fn decode(&self, ray: usize) -> Result<DateTime<Utc>, VolumeError> {
        let offset = *self.data.get(ray).ok_or(VolumeError::MissingRayTime(ray))?;
        match self.calendar.to_ascii_lowercase().as_str() {
            "standard" | "gregorian" | "proleptic_gregorian" => {}
            _ => return Err(VolumeError::Calendar(self.calendar.clone())),
        }

        let (unit, reference) = self
            .units
            .split_once(" since ")
            .ok_or_else(|| VolumeError::TimeUnits(self.units.clone()))?;
        let seconds_per_unit = match unit.trim().to_ascii_lowercase().as_str() {
            "seconds" | "second" | "secs" | "s" => 1.0,
            "minutes" | "minute" | "mins" => 60.0,
            "hours" | "hour" | "h" => 3_600.0,
            "days" | "day" | "d" => 86_400.0,
            _ => return Err(VolumeError::TimeUnits(self.units.clone())),
        };
        let epoch = parse_reference(reference.trim())
            .ok_or_else(|| VolumeError::TimeUnits(self.units.clone()))?;

        let micros = (offset * seconds_per_unit * 1e6).round();
        if !micros.is_finite() || micros.abs() >= i64::MAX as f64 {
            return Err(VolumeError::TimeUnits(self.units.clone()));
        }
        epoch
            .checked_add_signed(Duration::microseconds(micros as i64))
            .ok_or_else(|| VolumeError::TimeUnits(self.units.clone()))
    }
}

fn parse_reference(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in [
        "%Y-%m-%dT%H:%M:%SZ",
        "%Y-%m-%dT%H:%M:%S%.fZ",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
    ] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// One measured quantity laid out as `[ray][bin]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    pub data: Array2<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub units: Option<String>,
}

impl Field {
    pub fn new(data: Array2<f64>) -> Self {
        Self {
            data,
            fill_value: None,
            units: None,
        }
    }

    /// Value at `[ray, bin]`, or `None` when masked (NaN or fill value).
    pub fn value(&self, ray: usize, bin: usize) -> Option<f64> {
        let value = *self.data.get((ray, bin))?;
        if value.is_nan() || self.fill_value == Some(value) {
            None
        } else {
            Some(value)
        }
    }
}

/// A complete radar scan: geometry per ray and bin plus named fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Volume {
    pub origin: Origin,
    /// Degrees, one entry per ray.
    pub azimuth: Vec<f64>,
    /// Degrees, one entry per ray.
    pub elevation: Vec<f64>,
    /// Meters to the bin centres, shared by every ray.
    pub range: Vec<f64>,
    pub time: TimeAxis,
    #[serde(default)]
    pub fields: BTreeMap<String, Field>,
}

impl Volume {
    pub fn new(
        origin: Origin,
        azimuth: Vec<f64>,
        elevation: Vec<f64>,
        range: Vec<f64>,
        time: TimeAxis,
    ) -> Result<Self, VolumeError> {
        let volume = Self {
            origin,
            azimuth,
            elevation,
            range,
            time,
            fields: BTreeMap::new(),
        };
        volume.validate()?;
        Ok(volume)
    }

    pub fn nrays(&self) -> usize {
        self.azimuth.len()
    }

    pub fn nbins(&self) -> usize {
        self.range.len()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn insert_field(&mut self, name: &str, field: Field) -> Result<(), VolumeError> {
        self.check_field(name, &field)?;
        self.fields.insert(name.to_string(), field);
        Ok(())
    }

    /// Checks the per-ray and per-bin shape invariants.
    pub fn validate(&self) -> Result<(), VolumeError> {
        let rays = self.nrays();
        for (axis, found) in [
            ("elevation", self.elevation.len()),
            ("time", self.time.data.len()),
        ] {
            if found != rays {
                return Err(VolumeError::RayCountMismatch {
                    axis,
                    expected: rays,
                    found,
                });
            }
        }
        for (name, field) in &self.fields {
            self.check_field(name, field)?;
        }
        Ok(())
    }

    fn check_field(&self, name: &str, field: &Field) -> Result<(), VolumeError> {
        let (rays, bins) = field.data.dim();
        if rays != self.nrays() || bins != self.nbins() {
            return Err(VolumeError::FieldShape {
                field: name.to_string(),
                rays,
                bins,
                expected_rays: self.nrays(),
                expected_bins: self.nbins(),
            });
        }
        Ok(())
    }
}
