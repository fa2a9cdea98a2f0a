use anyhow::Context;
use clap::Parser;
use export::JsonLinesSink;
use generator::profile::{build_volumes, GeneratorConfig};
use log::info;
use radcore::volume::Volume;
use std::fs;
use std::path::{Path, PathBuf};
use workflow::config::WorkflowConfig;
use workflow::runner::Runner;

mod export;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "Offline radar processing workflow driver")]
struct Args {
    /// Workflow config (YAML) listing the processing steps
    #[arg(long)]
    workflow: PathBuf,
    /// Radar volume in JSON form; may be repeated
    #[arg(long = "volume")]
    volumes: Vec<PathBuf>,
    /// Number of synthetic volumes to generate when no volume is given
    #[arg(long, default_value_t = 1)]
    synthetic: usize,
    #[arg(long, default_value_t = 0)]
    seed: u64,
    /// JSON-lines file receiving exported products
    #[arg(long, default_value = "tools/data/products.jsonl")]
    output: PathBuf,
}

fn load_volume(path: &Path) -> anyhow::Result<Volume> {
    let contents = fs::read_to_string(path)
        .with_context(|| format!("reading volume {}", path.display()))?;
    let volume: Volume = serde_json::from_str(&contents)
        .with_context(|| format!("parsing volume {}", path.display()))?;
    volume
        .validate()
        .with_context(|| format!("validating volume {}", path.display()))?;
    Ok(volume)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let workflow_config = WorkflowConfig::load(&args.workflow)?;
    let mut runner = Runner::new(&workflow_config)?;

    let volumes = if args.volumes.is_empty() {
        let generator = GeneratorConfig {
            seed: args.seed,
            ..Default::default()
        };
        build_volumes(&generator, args.synthetic)?
    } else {
        args.volumes
            .iter()
            .map(|path| load_volume(path))
            .collect::<anyhow::Result<Vec<_>>>()?
    };

    info!(
        "running {} steps over {} volumes",
        workflow_config.steps.len(),
        volumes.len()
    );

    let mut sink = JsonLinesSink::create(&args.output)
        .with_context(|| format!("opening product file {}", args.output.display()))?;
    let metrics = runner.execute(&volumes, &mut sink)?;
    sink.flush().context("flushing product file")?;

    println!(
        "Workflow run -> volumes {}, steps {}, outputs {}, skipped {}, errors {}",
        volumes.len(),
        workflow_config.steps.len(),
        metrics.produced,
        metrics.skipped,
        metrics.errors
    );
    Ok(())
}
