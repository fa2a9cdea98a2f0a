use anyhow::Context;
use radcore::prelude::StepConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// One configured processing step.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StepSpec {
    pub name: String,
    pub operation: String,
    #[serde(default)]
    pub options: StepConfig,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkflowConfig {
    pub steps: Vec<StepSpec>,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        Self::from_yaml(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))
    }

    pub fn from_yaml(contents: &str) -> anyhow::Result<Self> {
        let config: WorkflowConfig = serde_yaml::from_str(contents)?;
        Ok(config)
    }
}
