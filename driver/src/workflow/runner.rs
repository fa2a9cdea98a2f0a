use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use radcore::prelude::{
    Phase, ProcessingRoutine, StepConfig, StepError, StepOutcome, StepResult,
};
use radcore::processing::{prepare, OperationDescriptor};
use radcore::product::ProductSink;
use radcore::telemetry::{LogManager, Metrics, MetricsRecorder};
use radcore::volume::Volume;

struct PreparedStep {
    name: String,
    descriptor: OperationDescriptor,
    config: StepConfig,
    routine: Box<dyn ProcessingRoutine>,
}

impl PreparedStep {
    fn run(&mut self, phase: Phase, volume: Option<&Volume>) -> StepResult<StepOutcome> {
        let outcome = self.routine.run(phase, volume, &self.config)?;
        if let Some(output) = outcome.output() {
            if output.format() != self.descriptor.output_format {
                return Err(StepError::FormatMismatch {
                    handler: self.descriptor.handler_id,
                    declared: self.descriptor.output_format,
                    found: output.format(),
                });
            }
        }
        Ok(outcome)
    }
}

/// Drives every configured step through INIT, PROCESS (once per volume)
/// and POST, forwarding outputs to a product sink.
pub struct Runner {
    steps: Vec<PreparedStep>,
    logger: LogManager,
    metrics: MetricsRecorder,
}

impl Runner {
    /// Resolves every step. An unknown operation or a handler missing from
    /// this build aborts construction.
    pub fn new(config: &WorkflowConfig) -> anyhow::Result<Self> {
        let mut steps = Vec::with_capacity(config.steps.len());
        for spec in &config.steps {
            let (descriptor, routine) = prepare(&spec.operation)
                .with_context(|| format!("preparing step {}", spec.name))?;
            steps.push(PreparedStep {
                name: spec.name.clone(),
                descriptor,
                config: spec.options.clone(),
                routine,
            });
        }
        Ok(Self {
            steps,
            logger: LogManager::new(),
            metrics: MetricsRecorder::new(),
        })
    }

    pub fn execute<S>(&mut self, volumes: &[Volume], sink: &mut S) -> anyhow::Result<Metrics>
    where
        S: ProductSink,
        S::Error: Send + Sync + 'static,
    {
        for idx in 0..self.steps.len() {
            self.run_phase(idx, Phase::Init, None, sink)?;
        }
        for volume in volumes {
            for idx in 0..self.steps.len() {
                self.run_phase(idx, Phase::Process, Some(volume), sink)?;
            }
        }
        for idx in 0..self.steps.len() {
            self.run_phase(idx, Phase::Post, None, sink)?;
        }

        let metrics = self.metrics.snapshot();
        self.logger.record(&format!(
            "workflow done: {} outputs, {} skipped, {} errors",
            metrics.produced, metrics.skipped, metrics.errors
        ));
        Ok(metrics)
    }

    /// Step failures are logged and counted; only sink failures propagate.
    fn run_phase<S>(
        &mut self,
        idx: usize,
        phase: Phase,
        volume: Option<&Volume>,
        sink: &mut S,
    ) -> anyhow::Result<()>
    where
        S: ProductSink,
        S::Error: Send + Sync + 'static,
    {
        let step = &mut self.steps[idx];
        match step.run(phase, volume) {
            Ok(StepOutcome::Idle) => {}
            Ok(StepOutcome::Skipped(_)) => self.metrics.record_skipped(),
            Ok(StepOutcome::Output(output)) => {
                sink.export(&step.name, &output).with_context(|| {
                    format!("exporting {} output of step {}", phase, step.name)
                })?;
                self.metrics.record_produced();
            }
            Err(err) => {
                self.logger.failure(&phase_label(&step.name, phase), &err);
                self.metrics.record_error();
            }
        }
        Ok(())
    }
}

/// `step (PHASE/status)`, the status being the phase's numeric code.
fn phase_label(step: &str, phase: Phase) -> String {
    format!("{} ({}/{})", step, phase, phase.code())
}
