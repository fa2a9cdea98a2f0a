pub mod passthrough;
pub mod point;
pub mod registry;

pub use passthrough::PassThrough;
pub use point::{extract_point, PointMeasurement, PointRequest};
pub use registry::{resolve, Operation, OperationDescriptor, OutputFormat, RegistryError};

use crate::prelude::{ProcessingRoutine, StepError, StepResult};

/// Instantiates the routine behind `operation`.
///
/// Operations whose handler is not part of this crate fail with
/// [`StepError::UnsupportedHandler`].
pub fn routine_for(operation: Operation) -> StepResult<Box<dyn ProcessingRoutine>> {
    match operation {
        Operation::Raw | Operation::SaveVolume => Ok(Box::new(PassThrough::new())),
        Operation::PointMeasurement => Ok(Box::new(PointMeasurement::new())),
        other => Err(StepError::UnsupportedHandler(other.handler_id())),
    }
}

/// Resolves `name` and instantiates its routine in one step.
pub fn prepare(name: &str) -> StepResult<(OperationDescriptor, Box<dyn ProcessingRoutine>)> {
    let descriptor = resolve(name)?;
    let routine = routine_for(descriptor.operation)?;
    Ok((descriptor, routine))
}
