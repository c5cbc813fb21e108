//! Pseudo-erosion heightmap synthesis
//!
//! Runs the drainage distance field at five grid densities and composites
//! them into one multi-scale heightmap:
//! - **Stage 1**: sites drained by raw noise (or a supplied input image)
//! - **Stage 2**: double density, drained by the stage 1 image
//! - **Stages 3-5**: 4x, 8x, 16x density, all drained by the stage 2 image

pub mod compositor;
pub mod distance;
pub mod grid;
pub mod params;

pub use compositor::{composite, StageImages};
pub use distance::{distance_field, segment_distance};
pub use grid::{ElevationSource, Grid, Site};
pub use params::{JitterMode, PipelineParams, STAGE_COUNT};

use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::codec;
use crate::error::{PseudoErosionError, Result};
use crate::height_image::HeightImage;
use crate::noise_source::NoiseContext;
use crate::seeds::RunSeeds;

/// Timing and shape of one pipeline stage
#[derive(Clone, Debug)]
pub struct StageStats {
    /// 1-based stage number
    pub stage: usize,
    /// Lattice cells per side (0 when the stage came from an input image)
    pub density: usize,
    /// Sites that drain into themselves
    pub sinks: usize,
    /// Wall time spent building the grid and its distance field
    pub elapsed: Duration,
}

/// Result of a full run
pub struct PipelineOutput {
    /// Final composited heightmap
    pub composite: HeightImage,
    /// Each stage's own distance field, stage 1 first
    pub stages: Vec<HeightImage>,
    pub stats: Vec<StageStats>,
}

/// Generate the composited heightmap.
pub fn generate_heightmap(params: &PipelineParams, input: Option<HeightImage>) -> Result<HeightImage> {
    generate_with_stages(params, input).map(|output| output.composite)
}

/// Generate the composited heightmap, keeping every stage image.
///
/// `input`, if given, replaces the generated stage 1 image. It must match
/// `params.image_size`; this is checked before any work is done.
pub fn generate_with_stages(params: &PipelineParams, input: Option<HeightImage>) -> Result<PipelineOutput> {
    params.validate()?;
    if let Some(image) = &input {
        if image.size() != params.image_size {
            return Err(PseudoErosionError::Config(format!(
                "input image is {0}x{0}, expected {1}x{1}",
                image.size(),
                params.image_size
            )));
        }
    }

    let seeds = RunSeeds::from_master(params.seed);
    let noise = NoiseContext::new(seeds.noise);
    info!(%seeds, size = params.image_size, grid = params.grid_size, jitter = %params.jitter, "starting pipeline");

    let mut stats = Vec::with_capacity(STAGE_COUNT);

    let stage1 = match input {
        Some(image) => {
            info!(stage = 1, "using input image");
            stats.push(StageStats {
                stage: 1,
                density: 0,
                sinks: 0,
                elapsed: Duration::ZERO,
            });
            image
        }
        None => run_stage(1, params, &seeds, &noise, None, &mut stats),
    };
    let stage2 = run_stage(2, params, &seeds, &noise, Some(&stage1), &mut stats);
    let stage3 = run_stage(3, params, &seeds, &noise, Some(&stage2), &mut stats);
    let stage4 = run_stage(4, params, &seeds, &noise, Some(&stage2), &mut stats);
    let stage5 = run_stage(5, params, &seeds, &noise, Some(&stage2), &mut stats);

    let mut composite = stage1.clone();
    compositor::composite(
        &mut composite,
        &StageImages {
            stage2: &stage2,
            stage3: &stage3,
            stage4: &stage4,
            stage5: &stage5,
        },
    );
    info!(levels = composite.distinct_levels(), "composite complete");

    Ok(PipelineOutput {
        composite,
        stages: vec![stage1, stage2, stage3, stage4, stage5],
        stats,
    })
}

/// Build one stage's grid, render its distance field, and drop the grid.
fn run_stage(
    stage: usize,
    params: &PipelineParams,
    seeds: &RunSeeds,
    noise: &NoiseContext,
    source: Option<&HeightImage>,
    stats: &mut Vec<StageStats>,
) -> HeightImage {
    let start = Instant::now();
    let density = params.stage_density(stage);
    let grid = Grid::build(density, params, seeds, noise, source);
    let sinks = grid.sink_count();
    debug!(stage, density, sinks, "grid built");

    let image = distance_field(&grid, params.image_size, params.feature_size as f64);
    let elapsed = start.elapsed();
    info!(stage, density, ?elapsed, "stage complete");

    stats.push(StageStats {
        stage,
        density,
        sinks,
        elapsed,
    });
    image
}

/// Raw coherent noise image, `sample4(x / feature_size, y / feature_size, 0, 0)`
/// per pixel. This is the field that drains the stage 1 grid.
pub fn generate_noise_image(params: &PipelineParams) -> Result<HeightImage> {
    if params.image_size == 0 || params.feature_size == 0 {
        return Err(PseudoErosionError::Config(
            "image size and feature size must be positive".into(),
        ));
    }
    let noise = NoiseContext::new(RunSeeds::from_master(params.seed).noise);
    let feature_size = params.feature_size as f64;
    Ok(HeightImage::from_fn_par(params.image_size, |x, y| {
        noise.sample4(x as f64 / feature_size, y as f64 / feature_size, 0.0, 0.0)
    }))
}

/// Whether every pixel is fully opaque with equal color channels.
pub fn is_gray_opaque(image: &HeightImage) -> bool {
    image.pixels().iter().all(|(_, _, &px)| {
        let [r, g, b, a] = codec::to_rgba(px);
        r == g && g == b && a == 255
    })
}
