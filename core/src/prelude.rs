use crate::processing::{OutputFormat, RegistryError};
use crate::product::PointRecord;
use crate::volume::{Volume, VolumeError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle phase a routine is invoked in. Codes match the legacy
/// integer processing status (0 init, 1 process, 2 post).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Init,
    Process,
    Post,
}

impl Phase {
    pub fn code(self) -> u8 {
        match self {
            Phase::Init => 0,
            Phase::Process => 1,
            Phase::Post => 2,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Phase::Init => "INIT",
            Phase::Process => "PROCESS",
            Phase::Post => "POST",
        };
        f.write_str(label)
    }
}

/// Scalar or string option carried by a step configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
    Text(String),
    List(Vec<String>),
}

impl OptionValue {
    fn kind(&self) -> &'static str {
        match self {
            OptionValue::Bool(_) => "boolean",
            OptionValue::Number(_) => "number",
            OptionValue::Text(_) => "string",
            OptionValue::List(_) => "list",
        }
    }
}

/// Named options for a single processing step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepConfig {
    options: BTreeMap<String, OptionValue>,
}

impl StepConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: &str, value: OptionValue) -> Self {
        self.options.insert(key.to_string(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&OptionValue> {
        self.options.get(key)
    }

    pub fn number(&self, key: &str) -> StepResult<f64> {
        match self.options.get(key) {
            Some(OptionValue::Number(value)) => Ok(*value),
            Some(other) => Err(StepError::InvalidOption {
                key: key.to_string(),
                expected: "number",
                found: other.kind(),
            }),
            None => Err(StepError::MissingOption(key.to_string())),
        }
    }

    pub fn number_or(&self, key: &str, default: f64) -> StepResult<f64> {
        if self.options.contains_key(key) {
            self.number(key)
        } else {
            Ok(default)
        }
    }

    pub fn flag_or(&self, key: &str, default: bool) -> StepResult<bool> {
        match self.options.get(key) {
            Some(OptionValue::Bool(value)) => Ok(*value),
            Some(other) => Err(StepError::InvalidOption {
                key: key.to_string(),
                expected: "boolean",
                found: other.kind(),
            }),
            None => Ok(default),
        }
    }

    /// The `datatype` selector; a list selects its first entry.
    pub fn datatype(&self) -> StepResult<&str> {
        match self.options.get("datatype") {
            Some(OptionValue::Text(value)) => Ok(value),
            Some(OptionValue::List(values)) => values
                .first()
                .map(String::as_str)
                .ok_or_else(|| StepError::MissingOption("datatype".into())),
            Some(other) => Err(StepError::InvalidOption {
                key: "datatype".into(),
                expected: "string",
                found: other.kind(),
            }),
            None => Err(StepError::MissingOption("datatype".into())),
        }
    }
}

/// Result shapes a routine may hand to product export.
#[derive(Debug, Clone)]
pub enum ProductOutput {
    Volume(Volume),
    Point(PointRecord),
}

/// What a routine produced for one phase invocation.
#[derive(Debug, Clone)]
pub enum StepOutcome {
    /// The phase has nothing to emit.
    Idle,
    Output(ProductOutput),
    /// A recoverable failure; export is skipped for this phase.
    Skipped(Diagnostic),
}

impl ProductOutput {
    pub fn format(&self) -> OutputFormat {
        match self {
            ProductOutput::Volume(_) => OutputFormat::Volume,
            ProductOutput::Point(_) => OutputFormat::PointRecord,
        }
    }
}

impl StepOutcome {
    pub fn output(&self) -> Option<&ProductOutput> {
        match self {
            StepOutcome::Output(output) => Some(output),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, StepOutcome::Idle)
    }
}

/// Axis checked during point bin resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Axis {
    Azimuth,
    Elevation,
    Range,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Axis::Azimuth => "azimuth",
            Axis::Elevation => "elevation",
            Axis::Range => "range bin",
        };
        f.write_str(label)
    }
}

/// Recoverable failures. Reported, never raised.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Diagnostic {
    #[error("field {field} ({datatype}) not available in volume")]
    FieldUnavailable { datatype: String, field: String },
    #[error(
        "no radar bin found for point (az, el, r):({azimuth}, {elevation}, {range}). \
         Minimum distance to radar {axis} {distance} larger than tolerance {tolerance}"
    )]
    ToleranceExceeded {
        axis: Axis,
        azimuth: f64,
        elevation: f64,
        range: f64,
        distance: f64,
        tolerance: f64,
    },
    #[error("observation time unavailable: {0}")]
    TimeUnavailable(String),
}

/// Errors that stop a single step.
#[derive(thiserror::Error, Debug)]
pub enum StepError {
    #[error("unknown operation {0}")]
    UnknownOperation(String),
    #[error("handler {0} is not available in this build")]
    UnsupportedHandler(&'static str),
    #[error("{handler} produced {found} output, registry declares {declared}")]
    FormatMismatch {
        handler: &'static str,
        declared: OutputFormat,
        found: OutputFormat,
    },
    #[error("missing option {0}")]
    MissingOption(String),
    #[error("option {key}: expected {expected}, found {found}")]
    InvalidOption {
        key: String,
        expected: &'static str,
        found: &'static str,
    },
    #[error("unknown datatype {0}")]
    UnknownDatatype(String),
    #[error("{0} phase requires a volume")]
    MissingVolume(Phase),
    #[error(transparent)]
    Volume(#[from] VolumeError),
}

impl From<RegistryError> for StepError {
    fn from(err: RegistryError) -> Self {
        match err {
            RegistryError::UnknownOperation(name) => StepError::UnknownOperation(name),
        }
    }
}

pub type StepResult<T> = Result<T, StepError>;

/// A processing routine driven through the INIT / PROCESS / POST lifecycle.
///
/// Routines must never mutate the input volume; anything they return is an
/// independently owned value.
pub trait ProcessingRoutine {
    fn run(
        &mut self,
        phase: Phase,
        volume: Option<&Volume>,
        config: &StepConfig,
    ) -> StepResult<StepOutcome>;
}
