//! Pseudo-erosion run parameters and configuration

use crate::error::{PseudoErosionError, Result};

/// Number of distance-field stages composited into the final image.
pub const STAGE_COUNT: usize = 5;

/// Grid density multiplier for each stage, relative to the base grid size.
pub const STAGE_DENSITY_FACTORS: [usize; STAGE_COUNT] = [1, 2, 4, 8, 16];

/// How lattice sites are displaced from their regular positions
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum JitterMode {
    /// Coherent noise offset of up to half a cell, seed-reproducible
    #[default]
    Noise,
    /// Uniform random offset in [0, 0.7) of a cell
    Uniform,
}

impl JitterMode {
    pub fn all() -> &'static [Self] {
        &[Self::Noise, Self::Uniform]
    }
}

impl std::fmt::Display for JitterMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Noise => write!(f, "noise"),
            Self::Uniform => write!(f, "uniform"),
        }
    }
}

/// Parameters for one pipeline run.
#[derive(Clone, Debug, PartialEq)]
pub struct PipelineParams {
    /// Output width and height in pixels
    pub image_size: usize,

    /// Pixels per unit of noise space; larger = coarser features
    pub feature_size: usize,

    /// Lattice cells per side for the first stage
    pub grid_size: usize,

    /// Master seed
    pub seed: u64,

    /// Site displacement strategy
    pub jitter: JitterMode,
}

impl Default for PipelineParams {
    fn default() -> Self {
        Self {
            image_size: 1024,
            feature_size: 64,
            grid_size: 30,
            seed: 123456,
            jitter: JitterMode::Noise,
        }
    }
}

impl PipelineParams {
    /// Small configuration for tests and quick previews
    pub fn small() -> Self {
        Self {
            image_size: 64,
            feature_size: 16,
            grid_size: 4,
            seed: 1,
            ..Default::default()
        }
    }

    /// Grid density (cells per side) used by a 1-based stage number.
    pub fn stage_density(&self, stage: usize) -> usize {
        self.grid_size * STAGE_DENSITY_FACTORS[stage - 1]
    }

    /// Distance between neighbouring sites in sample space at `density`.
    pub fn site_spacing(&self, density: usize) -> f64 {
        self.image_size as f64 / density as f64 / self.feature_size as f64
    }

    /// Reject parameter combinations the pipeline cannot run.
    pub fn validate(&self) -> Result<()> {
        if self.image_size == 0 {
            return Err(PseudoErosionError::Config("image size must be positive".into()));
        }
        if self.feature_size == 0 {
            return Err(PseudoErosionError::Config("feature size must be positive".into()));
        }
        if self.grid_size == 0 {
            return Err(PseudoErosionError::Config("grid size must be positive".into()));
        }
        let finest = self.stage_density(STAGE_COUNT);
        if finest > self.image_size {
            return Err(PseudoErosionError::Config(format!(
                "grid size {} gives {} cells per side at the finest stage, more than the {} pixel image",
                self.grid_size, finest, self.image_size
            )));
        }
        Ok(())
    }
}
