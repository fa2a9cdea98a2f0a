//! Data-type descriptors as written in step configurations.
//!
//! A descriptor reads `GROUP:datatype[,dataset[,product]]`. A bare datatype
//! belongs to the `RAINBOW` group.

use crate::prelude::{StepError, StepResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataDescriptor {
    pub group: String,
    pub datatype: String,
    pub dataset: Option<String>,
    pub product: Option<String>,
}

impl DataDescriptor {
    pub fn parse(descriptor: &str) -> StepResult<Self> {
        let descriptor = descriptor.trim();
        let (group, rest) = match descriptor.split_once(':') {
            Some((group, rest)) => (group.trim(), rest),
            None => ("RAINBOW", descriptor),
        };

        let mut parts = rest.split(',').map(str::trim);
        let datatype = parts
            .next()
            .filter(|datatype| !datatype.is_empty())
            .ok_or_else(|| StepError::UnknownDatatype(descriptor.to_string()))?;
        let dataset = parts.next().map(str::to_string);
        let product = parts.next().map(str::to_string);

        Ok(Self {
            group: group.to_string(),
            datatype: datatype.to_string(),
            dataset,
            product,
        })
    }

    pub fn field_name(&self) -> StepResult<&'static str> {
        field_name(&self.datatype).ok_or_else(|| StepError::UnknownDatatype(self.datatype.clone()))
    }
}

/// Canonical volume field name for a short datatype.
pub fn field_name(datatype: &str) -> Option<&'static str> {
    let name = match datatype {
        "dBZ" => "reflectivity",
        "dBZc" => "corrected_reflectivity",
        "dBuZ" => "unfiltered_reflectivity",
        "dBZv" => "reflectivity_vv",
        "ZDR" => "differential_reflectivity",
        "ZDRc" => "corrected_differential_reflectivity",
        "RhoHV" => "cross_correlation_ratio",
        "RhoHVc" => "corrected_cross_correlation_ratio",
        "PhiDP" => "differential_phase",
        "PhiDPc" => "corrected_differential_phase",
        "KDP" => "specific_differential_phase",
        "KDPc" => "corrected_specific_differential_phase",
        "V" => "velocity",
        "Vc" => "corrected_velocity",
        "W" => "spectrum_width",
        "SNRh" => "signal_to_noise_ratio_hh",
        "SNRv" => "signal_to_noise_ratio_vv",
        "dBm" => "signal_power_hh",
        "dBmV" => "signal_power_vv",
        "LDR" => "linear_polarization_ratio",
        "CDR" => "circular_depolarization_ratio",
        "Ah" => "specific_attenuation",
        "PIA" => "path_integrated_attenuation",
        "RR" => "radar_estimated_rain_rate",
        "hydro" => "radar_echo_classification",
        "echoID" => "radar_echo_id",
        "TEMP" => "temperature",
        "ISO0" => "iso0",
        "VIS" => "visibility",
        _ => return None,
    };
    Some(name)
}
