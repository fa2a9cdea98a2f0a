//! Point-of-interest extraction.
//!
//! A target given geographically or in antenna coordinates is resolved to
//! antenna coordinates, each axis is gated against its tolerance, and the
//! value of the single nearest bin is returned together with the bin's own
//! coordinates.

use crate::datatype::DataDescriptor;
use crate::math::{
    antenna_to_local_cartesian, beam_height_above_radar, geographic_to_local_cartesian,
    local_cartesian_to_antenna, local_cartesian_to_geographic, AntennaCoords, StatsHelper,
};
use crate::prelude::{
    Axis, Diagnostic, Phase, ProcessingRoutine, ProductOutput, StepConfig, StepError,
    StepOutcome, StepResult,
};
use crate::product::{GeoPoint, PointRecord};
use crate::telemetry::log::LogManager;
use crate::volume::{Origin, Volume};

/// How the target altitude is obtained in geographic mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AltitudePolicy {
    /// Meters above mean sea level, used as given.
    True(f64),
    /// Altitude of a beam at this elevation (degrees) above the target.
    /// A configured `reported` altitude replaces the derived one in the
    /// record; the geometry always uses the beam altitude.
    AtElevation { elevation: f64, reported: Option<f64> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointQuery {
    Geographic {
        longitude: f64,
        latitude: f64,
        altitude: AltitudePolicy,
    },
    Antenna(AntennaCoords),
}

/// Maximum accepted distance per axis: degrees for angles, meters for range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tolerances {
    pub azimuth: f64,
    pub elevation: f64,
    pub range: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PointRequest {
    pub descriptor: DataDescriptor,
    pub field: &'static str,
    pub query: PointQuery,
    pub tolerances: Tolerances,
}

impl PointRequest {
    /// Reads `datatype`, `latlon`, `truealt`, `lon`, `lat`, `alt`, `ele`,
    /// `azi`, `rng`, `AziTol`, `EleTol` and `RngTol`.
    pub fn from_config(config: &StepConfig) -> StepResult<Self> {
        let descriptor = DataDescriptor::parse(config.datatype()?)?;
        let field = descriptor.field_name()?;

        let query = if config.flag_or("latlon", false)? {
            let altitude = if config.flag_or("truealt", true)? {
                AltitudePolicy::True(config.number("alt")?)
            } else {
                let reported = match config.get("alt") {
                    Some(_) => Some(config.number("alt")?),
                    None => None,
                };
                AltitudePolicy::AtElevation {
                    elevation: config.number("ele")?,
                    reported,
                }
            };
            PointQuery::Geographic {
                longitude: config.number("lon")?,
                latitude: config.number("lat")?,
                altitude,
            }
        } else {
            PointQuery::Antenna(AntennaCoords::new(
                config.number("azi")?,
                config.number("ele")?,
                config.number("rng")?,
            ))
        };

        let tolerances = Tolerances {
            azimuth: config.number("AziTol")?,
            elevation: config.number("EleTol")?,
            range: config.number("RngTol")?,
        };

        Ok(Self {
            descriptor,
            field,
            query,
            tolerances,
        })
    }
}

/// Target position expressed in both coordinate systems.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub geographic: GeoPoint,
    pub antenna: AntennaCoords,
}

/// Resolves a query to geographic and antenna coordinates relative to `origin`.
pub fn resolve_target(query: &PointQuery, origin: &Origin) -> Target {
    match *query {
        PointQuery::Geographic {
            longitude,
            latitude,
            altitude,
        } => {
            let (x, y) = geographic_to_local_cartesian(longitude, latitude, origin);
            let (altitude, reported) = match altitude {
                AltitudePolicy::True(altitude) => (altitude, altitude),
                AltitudePolicy::AtElevation {
                    elevation,
                    reported,
                } => {
                    let beam = origin.altitude + beam_height_above_radar(x.hypot(y), elevation);
                    (beam, reported.unwrap_or(beam))
                }
            };
            Target {
                geographic: GeoPoint {
                    longitude,
                    latitude,
                    altitude: reported,
                },
                antenna: local_cartesian_to_antenna(x, y, altitude - origin.altitude),
            }
        }
        PointQuery::Antenna(antenna) => {
            let (x, y, z) =
                antenna_to_local_cartesian(antenna.range, antenna.azimuth, antenna.elevation);
            let (longitude, latitude) = local_cartesian_to_geographic(x, y, origin);
            Target {
                geographic: GeoPoint {
                    longitude,
                    latitude,
                    altitude: origin.altitude + z,
                },
                antenna,
            }
        }
    }
}

/// Extracts the bin nearest the requested point.
pub fn extract_point(volume: &Volume, request: &PointRequest) -> Result<PointRecord, Diagnostic> {
    let field = volume
        .field(request.field)
        .ok_or_else(|| Diagnostic::FieldUnavailable {
            datatype: request.descriptor.datatype.clone(),
            field: request.field.to_string(),
        })?;

    let target = resolve_target(&request.query, &volume.origin);
    let AntennaCoords {
        azimuth,
        elevation,
        range,
    } = target.antenna;
    let exceeded = |axis, distance, tolerance| Diagnostic::ToleranceExceeded {
        axis,
        azimuth,
        elevation,
        range,
        distance,
        tolerance,
    };

    let tol = request.tolerances;
    for (axis, values, wanted, tolerance) in [
        (Axis::Azimuth, &volume.azimuth, azimuth, tol.azimuth),
        (Axis::Elevation, &volume.elevation, elevation, tol.elevation),
        (Axis::Range, &volume.range, range, tol.range),
    ] {
        let distance = StatsHelper::min_abs_distance(values, wanted);
        if distance > tolerance {
            return Err(exceeded(axis, distance, tolerance));
        }
    }

    // Joint azimuth + elevation distance; may pick a ray that neither axis
    // alone would have picked.
    let ray = StatsHelper::argmin_combined(&volume.azimuth, azimuth, &volume.elevation, elevation)
        .ok_or_else(|| exceeded(Axis::Azimuth, f64::INFINITY, tol.azimuth))?;
    let bin = StatsHelper::argmin_abs_distance(&volume.range, range)
        .ok_or_else(|| exceeded(Axis::Range, f64::INFINITY, tol.range))?;

    let time = volume
        .time
        .decode(ray)
        .map_err(|err| Diagnostic::TimeUnavailable(err.to_string()))?;

    Ok(PointRecord {
        value: field.value(ray, bin),
        datatype: request.descriptor.datatype.clone(),
        field: request.field.to_string(),
        time,
        requested_geographic: target.geographic,
        requested_antenna: target.antenna,
        used_antenna: AntennaCoords::new(
            volume.azimuth[ray],
            volume.elevation[ray],
            volume.range[bin],
        ),
        ray_index: ray,
        bin_index: bin,
    })
}

/// Routine behind `POINT_MEASUREMENT`.
pub struct PointMeasurement {
    logger: LogManager,
}

impl PointMeasurement {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new(),
        }
    }
}

impl Default for PointMeasurement {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingRoutine for PointMeasurement {
    fn run(
        &mut self,
        phase: Phase,
        volume: Option<&Volume>,
        config: &StepConfig,
    ) -> StepResult<StepOutcome> {
        if phase != Phase::Process {
            return Ok(StepOutcome::Idle);
        }
        let volume = volume.ok_or(StepError::MissingVolume(phase))?;
        let request = PointRequest::from_config(config)?;

        match extract_point(volume, &request) {
            Ok(record) => {
                self.logger.record(&format!(
                    "point {} at (az {:.2}, el {:.2}, r {:.0}) -> {:?}",
                    record.field,
                    record.used_antenna.azimuth,
                    record.used_antenna.elevation,
                    record.used_antenna.range,
                    record.value
                ));
                Ok(StepOutcome::Output(ProductOutput::Point(record)))
            }
            Err(diagnostic) => {
                self.logger.diagnostic("point_measurement", &diagnostic);
                Ok(StepOutcome::Skipped(diagnostic))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prelude::OptionValue;
    use crate::volume::{Field, TimeAxis};
    use approx::assert_abs_diff_eq;
    use chrono::{TimeZone, Utc};
    use ndarray::Array2;

    const ORIGIN: Origin = Origin {
        longitude: 8.0,
        latitude: 46.0,
        altitude: 500.0,
    };

    fn volume_with(rays: &[(f64, f64)], range: &[f64]) -> Volume {
        let mut volume = Volume::new(
            ORIGIN,
            rays.iter().map(|&(az, _)| az).collect(),
            rays.iter().map(|&(_, el)| el).collect(),
            range.to_vec(),
            TimeAxis {
                data: (0..rays.len()).map(|i| i as f64 * 10.0).collect(),
                units: "seconds since 2024-06-01T00:00:00Z".into(),
                calendar: "gregorian".into(),
            },
        )
        .unwrap();
        let data = Array2::from_shape_fn((rays.len(), range.len()), |(ray, bin)| {
            (ray * 100 + bin) as f64
        });
        volume.insert_field("reflectivity", Field::new(data)).unwrap();
        volume
    }

    fn antenna_request(azimuth: f64, elevation: f64, range: f64, tol: Tolerances) -> PointRequest {
        PointRequest {
            descriptor: DataDescriptor::parse("RAINBOW:dBZ").unwrap(),
            field: "reflectivity",
            query: PointQuery::Antenna(AntennaCoords::new(azimuth, elevation, range)),
            tolerances: tol,
        }
    }

    fn generous() -> Tolerances {
        Tolerances {
            azimuth: 10.0,
            elevation: 10.0,
            range: 1_000.0,
        }
    }

    fn antenna_config(azimuth: f64, azimuth_tol: f64) -> StepConfig {
        StepConfig::new()
            .with("datatype", OptionValue::Text("dBZ".into()))
            .with("latlon", OptionValue::Bool(false))
            .with("azi", OptionValue::Number(azimuth))
            .with("ele", OptionValue::Number(1.0))
            .with("rng", OptionValue::Number(1_000.0))
            .with("AziTol", OptionValue::Number(azimuth_tol))
            .with("EleTol", OptionValue::Number(1.0))
            .with("RngTol", OptionValue::Number(100.0))
    }

    #[test]
    fn azimuth_tolerance_gates_extraction() {
        let volume = volume_with(&[(10.0, 1.0), (20.0, 1.0), (30.0, 1.0)], &[1_000.0]);

        let tight = Tolerances {
            azimuth: 3.0,
            ..generous()
        };
        match extract_point(&volume, &antenna_request(25.0, 1.0, 1_000.0, tight)) {
            Err(Diagnostic::ToleranceExceeded {
                axis,
                azimuth,
                distance,
                tolerance,
                ..
            }) => {
                assert_eq!(axis, Axis::Azimuth);
                assert_eq!(azimuth, 25.0);
                assert_eq!(distance, 5.0);
                assert_eq!(tolerance, 3.0);
            }
            other => panic!("expected azimuth failure, got {:?}", other),
        }

        let wide = Tolerances {
            azimuth: 6.0,
            ..generous()
        };
        let record = extract_point(&volume, &antenna_request(25.0, 1.0, 1_000.0, wide)).unwrap();
        assert_eq!(record.used_antenna.azimuth, 20.0);

        // A distance equal to the tolerance is still accepted.
        let exact = Tolerances {
            azimuth: 5.0,
            ..generous()
        };
        let record = extract_point(&volume, &antenna_request(25.0, 1.0, 1_000.0, exact)).unwrap();
        assert_eq!(record.used_antenna.azimuth, 20.0);
    }

    #[test]
    fn elevation_and_range_are_gated_independently() {
        let volume = volume_with(&[(10.0, 1.0), (10.0, 5.0)], &[500.0, 1_500.0]);

        let tol = Tolerances {
            elevation: 0.5,
            ..generous()
        };
        let err = extract_point(&volume, &antenna_request(10.0, 3.0, 500.0, tol)).unwrap_err();
        assert!(matches!(
            err,
            Diagnostic::ToleranceExceeded { axis: Axis::Elevation, distance, .. } if distance == 2.0
        ));

        let tol = Tolerances {
            range: 50.0,
            ..generous()
        };
        let err = extract_point(&volume, &antenna_request(10.0, 1.0, 1_000.0, tol)).unwrap_err();
        assert!(matches!(
            err,
            Diagnostic::ToleranceExceeded { axis: Axis::Range, distance, .. } if distance == 500.0
        ));

        let tol = Tolerances {
            range: 500.0,
            ..generous()
        };
        let record = extract_point(&volume, &antenna_request(10.0, 1.0, 1_000.0, tol)).unwrap();
        assert_eq!(record.bin_index, 0);
        assert_eq!(record.used_antenna.range, 500.0);
    }

    #[test]
    fn undecodable_ray_time_is_reported() {
        let mut volume = volume_with(&[(10.0, 1.0)], &[1_000.0]);
        volume.time.data[0] = 1.0e15;
        let err = extract_point(&volume, &antenna_request(10.0, 1.0, 1_000.0, generous()))
            .unwrap_err();
        assert!(matches!(err, Diagnostic::TimeUnavailable(_)));
    }

    #[test]
    fn selects_nearest_bin_and_reports_used_coordinates() {
        let volume = volume_with(&[(10.0, 1.0), (10.0, 5.0)], &[500.0, 1_500.0]);
        let record =
            extract_point(&volume, &antenna_request(10.0, 4.0, 1_600.0, generous())).unwrap();

        assert_eq!(record.ray_index, 1);
        assert_eq!(record.bin_index, 1);
        assert_eq!(record.used_antenna, AntennaCoords::new(10.0, 5.0, 1_500.0));
        assert_eq!(record.requested_antenna, AntennaCoords::new(10.0, 4.0, 1_600.0));
        assert_eq!(record.value, Some(101.0));
        assert_eq!(
            record.time,
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 10).unwrap()
        );
    }

    #[test]
    fn ray_choice_uses_combined_distance_not_per_axis_optima() {
        // Ray 0 is nearest in azimuth, ray 1 nearest in elevation; ray 2
        // minimises the summed distance and is the one read.
        let volume = volume_with(&[(10.0, 9.0), (14.0, 5.0), (11.0, 6.0)], &[1_000.0]);
        let record =
            extract_point(&volume, &antenna_request(10.0, 5.0, 1_000.0, generous())).unwrap();
        assert_eq!(record.ray_index, 2);
        assert_eq!(record.used_antenna.azimuth, 11.0);
        assert_eq!(record.used_antenna.elevation, 6.0);
    }

    #[test]
    fn missing_field_fails_before_geometry() {
        // Empty axes would fail every tolerance; the field check comes first.
        let volume = volume_with(&[], &[]);
        let mut request = antenna_request(0.0, 0.0, 0.0, generous());
        request.field = "differential_reflectivity";
        request.descriptor = DataDescriptor::parse("ZDR").unwrap();

        assert_eq!(
            extract_point(&volume, &request),
            Err(Diagnostic::FieldUnavailable {
                datatype: "ZDR".into(),
                field: "differential_reflectivity".into(),
            })
        );
    }

    #[test]
    fn empty_axes_exceed_any_tolerance() {
        let volume = volume_with(&[], &[]);
        let err = extract_point(&volume, &antenna_request(0.0, 0.0, 0.0, generous())).unwrap_err();
        assert!(matches!(
            err,
            Diagnostic::ToleranceExceeded { axis: Axis::Azimuth, distance, .. } if distance.is_infinite()
        ));
    }

    #[test]
    fn masked_bin_yields_record_without_value() {
        let mut volume = volume_with(&[(10.0, 1.0)], &[1_000.0]);
        volume.fields.get_mut("reflectivity").unwrap().data[[0, 0]] = f64::NAN;
        let record =
            extract_point(&volume, &antenna_request(10.0, 1.0, 1_000.0, generous())).unwrap();
        assert_eq!(record.value, None);
    }

    #[test]
    fn geographic_true_altitude_recovers_antenna_coordinates() {
        let (x, y, z) = antenna_to_local_cartesian(20_000.0, 45.0, 2.0);
        let (lon, lat) = local_cartesian_to_geographic(x, y, &ORIGIN);
        let query = PointQuery::Geographic {
            longitude: lon,
            latitude: lat,
            altitude: AltitudePolicy::True(ORIGIN.altitude + z),
        };

        let target = resolve_target(&query, &ORIGIN);
        assert_abs_diff_eq!(target.antenna.azimuth, 45.0, epsilon = 1e-6);
        assert_abs_diff_eq!(target.antenna.elevation, 2.0, epsilon = 1e-6);
        assert_abs_diff_eq!(target.antenna.range, 20_000.0, epsilon = 1e-3);
        assert_abs_diff_eq!(target.geographic.altitude, ORIGIN.altitude + z, epsilon = 1e-9);

        let volume = volume_with(
            &[(44.0, 2.0), (45.0, 2.0), (46.0, 2.0)],
            &[19_900.0, 20_000.0, 20_100.0],
        );
        let request = PointRequest {
            query,
            ..antenna_request(0.0, 0.0, 0.0, generous())
        };
        let record = extract_point(&volume, &request).unwrap();
        assert_eq!(record.used_antenna, AntennaCoords::new(45.0, 2.0, 20_000.0));
        assert_abs_diff_eq!(record.requested_geographic.longitude, lon, epsilon = 1e-12);
    }

    #[test]
    fn elevation_relative_altitude_follows_beam_height() {
        let (x, y, _) = antenna_to_local_cartesian(20_000.0, 45.0, 2.0);
        let (lon, lat) = local_cartesian_to_geographic(x, y, &ORIGIN);
        let query = PointQuery::Geographic {
            longitude: lon,
            latitude: lat,
            altitude: AltitudePolicy::AtElevation {
                elevation: 1.0,
                reported: None,
            },
        };

        let target = resolve_target(&query, &ORIGIN);
        let expected_height = beam_height_above_radar(x.hypot(y), 1.0);
        assert_abs_diff_eq!(
            target.geographic.altitude,
            ORIGIN.altitude + expected_height,
            epsilon = 1e-6
        );
        // Curvature lifts the target above the straight 1 degree line.
        assert!(target.antenna.elevation > 1.0);
        assert!(target.antenna.elevation < 1.2);
        assert_abs_diff_eq!(target.antenna.azimuth, 45.0, epsilon = 1e-6);

        let configured = PointQuery::Geographic {
            longitude: lon,
            latitude: lat,
            altitude: AltitudePolicy::AtElevation {
                elevation: 1.0,
                reported: Some(1_234.0),
            },
        };
        let reported = resolve_target(&configured, &ORIGIN);
        assert_eq!(reported.geographic.altitude, 1_234.0);
        assert_eq!(reported.antenna, target.antenna);
    }

    #[test]
    fn antenna_query_reports_derived_geographic_position() {
        let query = PointQuery::Antenna(AntennaCoords::new(90.0, 0.0, 10_000.0));
        let target = resolve_target(&query, &ORIGIN);
        assert!(target.geographic.longitude > ORIGIN.longitude);
        assert_abs_diff_eq!(target.geographic.altitude, ORIGIN.altitude, epsilon = 1e-9);

        let (x, y) = geographic_to_local_cartesian(
            target.geographic.longitude,
            target.geographic.latitude,
            &ORIGIN,
        );
        assert_abs_diff_eq!(x, 10_000.0, epsilon = 1e-6);
        assert_abs_diff_eq!(y, 0.0, epsilon = 1e-6);
    }

    #[test]
    fn request_from_config_reads_geographic_options() {
        let config = StepConfig::new()
            .with("datatype", OptionValue::List(vec!["RAINBOW:ZDR".into()]))
            .with("latlon", OptionValue::Bool(true))
            .with("truealt", OptionValue::Bool(false))
            .with("lon", OptionValue::Number(8.1))
            .with("lat", OptionValue::Number(46.1))
            .with("ele", OptionValue::Number(0.5))
            .with("AziTol", OptionValue::Number(1.0))
            .with("EleTol", OptionValue::Number(0.5))
            .with("RngTol", OptionValue::Number(100.0));

        let request = PointRequest::from_config(&config).unwrap();
        assert_eq!(request.field, "differential_reflectivity");
        assert_eq!(
            request.query,
            PointQuery::Geographic {
                longitude: 8.1,
                latitude: 46.1,
                altitude: AltitudePolicy::AtElevation {
                    elevation: 0.5,
                    reported: None,
                },
            }
        );
        assert_eq!(request.tolerances.range, 100.0);

        let request =
            PointRequest::from_config(&config.with("alt", OptionValue::Number(750.0))).unwrap();
        assert!(matches!(
            request.query,
            PointQuery::Geographic {
                altitude: AltitudePolicy::AtElevation {
                    reported: Some(alt),
                    ..
                },
                ..
            } if alt == 750.0
        ));
    }

    #[test]
    fn routine_follows_lifecycle() {
        let mut routine = PointMeasurement::new();
        let volume = volume_with(&[(10.0, 1.0), (20.0, 1.0), (30.0, 1.0)], &[1_000.0]);

        let config = antenna_config(25.0, 3.0);
        assert!(routine.run(Phase::Init, None, &config).unwrap().is_idle());
        assert!(matches!(
            routine.run(Phase::Process, Some(&volume), &config).unwrap(),
            StepOutcome::Skipped(Diagnostic::ToleranceExceeded { axis: Axis::Azimuth, .. })
        ));

        let config = antenna_config(25.0, 6.0);
        let outcome = routine.run(Phase::Process, Some(&volume), &config).unwrap();
        assert!(matches!(outcome.output(), Some(ProductOutput::Point(_))));
        assert!(routine.run(Phase::Post, None, &config).unwrap().is_idle());
    }

    #[test]
    fn routine_skips_when_field_absent() {
        let mut routine = PointMeasurement::new();
        let volume = volume_with(&[(10.0, 1.0)], &[1_000.0]);
        let config = antenna_config(10.0, 1.0).with("datatype", OptionValue::Text("KDP".into()));

        let outcome = routine.run(Phase::Process, Some(&volume), &config).unwrap();
        assert!(matches!(
            outcome,
            StepOutcome::Skipped(Diagnostic::FieldUnavailable { .. })
        ));
    }

    #[test]
    fn routine_rejects_incomplete_configuration() {
        let mut routine = PointMeasurement::new();
        let volume = volume_with(&[(10.0, 1.0)], &[1_000.0]);
        let config = StepConfig::new()
            .with("datatype", OptionValue::Text("dBZ".into()))
            .with("azi", OptionValue::Number(10.0))
            .with("ele", OptionValue::Number(1.0))
            .with("rng", OptionValue::Number(1_000.0));

        assert!(matches!(
            routine.run(Phase::Process, Some(&volume), &config),
            Err(StepError::MissingOption(key)) if key == "AziTol"
        ));

        let config = antenna_config(10.0, 1.0).with("datatype", OptionValue::Text("nope".into()));
        assert!(matches!(
            routine.run(Phase::Process, Some(&volume), &config),
            Err(StepError::UnknownDatatype(_))
        ));
    }
}
