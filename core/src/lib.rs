//! Processing core for radar volume workflows.
//!
//! Operation names resolve through a static registry to routines driven by
//! an INIT / PROCESS / POST lifecycle. The point-measurement routine maps a
//! geographic or antenna-relative target onto the nearest measurement bin.

pub mod datatype;
pub mod math;
pub mod prelude;
pub mod processing;
pub mod product;
pub mod telemetry;
pub mod volume;

pub use prelude::{Phase, ProcessingRoutine, StepConfig, StepOutcome};
pub use volume::Volume;
