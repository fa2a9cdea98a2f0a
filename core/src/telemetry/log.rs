use crate::prelude::{Diagnostic, StepError};
use log::{error, info, warn};

/// Routes step messages to the `log` facade.
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record(&self, message: &str) {
        info!("{}", message);
    }

    /// Recoverable condition: the step continues without output.
    pub fn diagnostic(&self, step: &str, diagnostic: &Diagnostic) {
        warn!("[{}] {}", step, diagnostic);
    }

    pub fn failure(&self, step: &str, err: &StepError) {
        error!("[{}] {}", step, err);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
