//! Seeded coherent noise sampler shared by every stage of a run.
//!
//! Wraps OpenSimplex noise. Sampling is read-only, so one context can be
//! borrowed by parallel workers for the whole pipeline.

use noise::{NoiseFn, OpenSimplex};

/// Seeded, deterministic noise source. Same seed and coordinates always
/// give the same value.
pub struct NoiseContext {
    seed: u32,
    simplex: OpenSimplex,
}

impl NoiseContext {
    pub fn new(seed: u64) -> Self {
        // OpenSimplex takes a 32-bit seed; fold the high half in so large
        // seeds still differ.
        let folded = (seed ^ (seed >> 32)) as u32;
        Self {
            seed: folded,
            simplex: OpenSimplex::new(folded),
        }
    }

    /// 3D noise sample in [-1, 1].
    pub fn sample3(&self, x: f64, y: f64, z: f64) -> f64 {
        self.simplex.get([x, y, z]).clamp(-1.0, 1.0)
    }

    /// 4D noise sample in [-1, 1].
    pub fn sample4(&self, x: f64, y: f64, z: f64, w: f64) -> f64 {
        self.simplex.get([x, y, z, w]).clamp(-1.0, 1.0)
    }
}

impl std::fmt::Debug for NoiseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoiseContext").field("seed", &self.seed).finish()
    }
}
