//! Operation name → handler and output format.
//!
//! Every recognised name resolves to exactly one [`Operation`]. Output
//! format defaults to [`OutputFormat::Volume`]; only scalar/point products
//! deviate from it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Shape of the result a step hands to product export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OutputFormat {
    Volume,
    PointRecord,
    TimeSeries,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tag = match self {
            OutputFormat::Volume => "VOLUME",
            OutputFormat::PointRecord => "POINT_RECORD",
            OutputFormat::TimeSeries => "TIME_SERIES",
        };
        f.write_str(tag)
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("unknown operation {0}")]
    UnknownOperation(String),
}

macro_rules! operations {
    ($($variant:ident => $name:literal, $handler:literal;)+) => {
        /// A recognised processing operation.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Operation {
            $($variant,)+
        }

        impl Operation {
            pub const ALL: &'static [Operation] = &[$(Operation::$variant,)+];

            pub fn name(self) -> &'static str {
                match self {
                    $(Operation::$variant => $name,)+
                }
            }

            pub fn handler_id(self) -> &'static str {
                match self {
                    $(Operation::$variant => $handler,)+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $($name => Some(Operation::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

operations! {
    Raw => "RAW", "process_raw";
    SaveVolume => "NCVOL", "process_save_radar";
    SignalPower => "PWR", "process_signal_power";
    Snr => "SNR", "process_snr";
    RhohvCorrection => "RHOHV_CORRECTION", "process_correct_noise_rhohv";
    BiasCorrection => "BIAS_CORRECTION", "process_correct_bias";
    LinearDepolarization => "L", "process_l";
    CircularDepolarization => "CDR", "process_cdr";
    EchoId => "SAN", "process_echo_id";
    EchoFilter => "ECHO_FILTER", "process_echo_filter";
    SnrFilter => "SNR_FILTER", "process_filter_snr";
    VisibilityFilter => "VIS_FILTER", "process_filter_visibility";
    Phidp0Estimate => "PHIDP0_ESTIMATE", "process_estimate_phidp0";
    Phidp0Correction => "PHIDP0_CORRECTION", "process_correct_phidp0";
    PhidpSmoothSingleWindow => "PHIDP_SMOOTH_1W", "process_smooth_phidp_single_window";
    PhidpSmoothDoubleWindow => "PHIDP_SMOOTH_2W", "process_smooth_phidp_double_window";
    PhidpKdpMaesaka => "PHIDP_KDP_MAESAKA", "process_phidp_kdp_Maesaka";
    PhidpKdpLp => "PHIDP_KDP_LP", "process_phidp_kdp_lp";
    KdpLeastSquareSingleWindow => "KDP_LEASTSQUARE_1W", "process_kdp_leastsquare_single_window";
    KdpLeastSquareDoubleWindow => "KDP_LEASTSQUARE_2W", "process_kdp_leastsquare_double_window";
    Attenuation => "ATTENUATION", "process_attenuation";
    RainRate => "RAINRATE", "process_rainrate";
    HydroClass => "HYDROCLASS", "process_hydroclass";
    SelfConsistencyKdpPhidp => "SELFCONSISTENCY_KDP_PHIDP", "process_selfconsistency_kdp_phidp";
    SelfConsistencyBias => "SELFCONSISTENCY_BIAS", "process_selfconsistency_bias";
    RhohvRain => "RHOHV_RAIN", "process_rhohv_rain";
    ZdrRain => "ZDR_RAIN", "process_zdr_rain";
    MonitoringRhohv => "MONITORING_RHOHV", "process_monitoring_rhohv";
    MonitoringZdr => "MONITORING_ZDR", "process_monitoring_zdr";
    SunHits => "SUN_HITS", "process_sun_hits";
    PointMeasurement => "POINT_MEASUREMENT", "process_point_measurement";
}

impl Operation {
    pub fn output_format(self) -> OutputFormat {
        match self {
            Operation::PointMeasurement => OutputFormat::PointRecord,
            Operation::SunHits => OutputFormat::TimeSeries,
            _ => OutputFormat::Volume,
        }
    }

    pub fn descriptor(self) -> OperationDescriptor {
        OperationDescriptor {
            operation: self,
            handler_id: self.handler_id(),
            output_format: self.output_format(),
        }
    }
}

impl FromStr for Operation {
    type Err = RegistryError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        Operation::from_name(name).ok_or_else(|| RegistryError::UnknownOperation(name.to_string()))
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperationDescriptor {
    pub operation: Operation,
    pub handler_id: &'static str,
    pub output_format: OutputFormat,
}

/// Resolves a configured operation name.
pub fn resolve(name: &str) -> Result<OperationDescriptor, RegistryError> {
    name.parse::<Operation>().map(Operation::descriptor)
}
