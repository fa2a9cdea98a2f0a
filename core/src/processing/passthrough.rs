use crate::prelude::{
    Phase, ProcessingRoutine, ProductOutput, StepConfig, StepError, StepOutcome, StepResult,
};
use crate::telemetry::log::LogManager;
use crate::volume::Volume;

/// Hands an independent copy of the incoming volume to product export.
/// Backs both the `RAW` and the `NCVOL` operations.
pub struct PassThrough {
    logger: LogManager,
}

impl PassThrough {
    pub fn new() -> Self {
        Self {
            logger: LogManager::new(),
        }
    }
}

impl Default for PassThrough {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingRoutine for PassThrough {
    fn run(
        &mut self,
        phase: Phase,
        volume: Option<&Volume>,
        _config: &StepConfig,
    ) -> StepResult<StepOutcome> {
        if phase != Phase::Process {
            return Ok(StepOutcome::Idle);
        }
        let volume = volume.ok_or(StepError::MissingVolume(phase))?;
        volume.validate()?;

        self.logger.record(&format!(
            "pass-through volume {} rays x {} bins, {} fields",
            volume.nrays(),
            volume.nbins(),
            volume.fields.len()
        ));
        Ok(StepOutcome::Output(ProductOutput::Volume(volume.clone())))
    }
}
