use anyhow::Context;
use ndarray::Array2;
use radcore::volume::{Field, Origin, TimeAxis, Volume};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

pub const FILL_VALUE: f64 = -9999.0;

/// Configuration for generating synthetic PPI volumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub origin: Origin,
    pub elevations: Vec<f64>,
    pub rays_per_sweep: usize,
    pub bins: usize,
    pub first_bin: f64,
    pub bin_spacing: f64,
    /// Seconds between consecutive volumes.
    pub scan_interval: f64,
    pub start: String,
    /// Storm cell centre as (azimuth deg, range m).
    pub cell: (f64, f64),
    pub noise: f64,
    pub seed: u64,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            origin: Origin {
                longitude: 8.833,
                latitude: 46.04,
                altitude: 1_626.0,
            },
            elevations: vec![0.5, 1.5, 2.5],
            rays_per_sweep: 360,
            bins: 400,
            first_bin: 0.0,
            bin_spacing: 250.0,
            scan_interval: 300.0,
            start: "2024-06-01T12:00:00Z".into(),
            cell: (90.0, 30_000.0),
            noise: 1.0,
            seed: 0,
        }
    }
}

impl GeneratorConfig {
    fn normalized_rays(&self) -> usize {
        self.rays_per_sweep.max(1)
    }
}

fn reflectivity(azimuth: f64, range: f64, cell: (f64, f64)) -> f64 {
    let mut d_az = (azimuth - cell.0).abs() % 360.0;
    if d_az > 180.0 {
        d_az = 360.0 - d_az;
    }
    let d_r = (range - cell.1) / 8_000.0;
    let d_a = d_az / 12.0;
    5.0 + 45.0 * (-(d_r * d_r + d_a * d_a)).exp()
}

/// Builds the `index`-th volume of a synthetic sequence.
pub fn build_volume(config: &GeneratorConfig, index: usize) -> anyhow::Result<Volume> {
    let rays_per_sweep = config.normalized_rays();
    let rays = rays_per_sweep
        .checked_mul(config.elevations.len())
        .context("overflow computing ray count for generator")?;
    let sweep_seconds = 20.0;

    let mut azimuth = Vec::with_capacity(rays);
    let mut elevation = Vec::with_capacity(rays);
    let mut time = Vec::with_capacity(rays);
    for (sweep, &el) in config.elevations.iter().enumerate() {
        for ray in 0..rays_per_sweep {
            azimuth.push(ray as f64 * 360.0 / rays_per_sweep as f64);
            elevation.push(el);
            time.push(
                index as f64 * config.scan_interval
                    + sweep as f64 * sweep_seconds
                    + ray as f64 * sweep_seconds / rays_per_sweep as f64,
            );
        }
    }
    let range: Vec<f64> = (0..config.bins)
        .map(|bin| config.first_bin + bin as f64 * config.bin_spacing)
        .collect();

    let mut volume = Volume::new(
        config.origin,
        azimuth,
        elevation,
        range,
        TimeAxis {
            data: time,
            units: format!("seconds since {}", config.start),
            calendar: "gregorian".into(),
        },
    )
    .context("assembling synthetic volume")?;

    let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(index as u64));
    let mut dbz = Array2::<f64>::zeros((rays, config.bins));
    let mut zdr = Array2::<f64>::zeros((rays, config.bins));
    for ((ray, bin), value) in dbz.indexed_iter_mut() {
        let jitter = if config.noise > 0.0 {
            rng.gen_range(-config.noise..config.noise)
        } else {
            0.0
        };
        let z = reflectivity(volume.azimuth[ray], volume.range[bin], config.cell) + jitter;
        *value = if z < 0.0 { FILL_VALUE } else { z };
        zdr[[ray, bin]] = if z < 0.0 { FILL_VALUE } else { 0.05 * z - 0.25 };
    }

    volume
        .insert_field(
            "reflectivity",
            Field {
                data: dbz,
                fill_value: Some(FILL_VALUE),
                units: Some("dBZ".into()),
            },
        )
        .context("adding reflectivity")?;
    volume
        .insert_field(
            "differential_reflectivity",
            Field {
                data: zdr,
                fill_value: Some(FILL_VALUE),
                units: Some("dB".into()),
            },
        )
        .context("adding differential reflectivity")?;
    Ok(volume)
}

pub fn build_volumes(config: &GeneratorConfig, count: usize) -> anyhow::Result<Vec<Volume>> {
    (0..count).map(|index| build_volume(config, index)).collect()
}
