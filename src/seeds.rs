//! Seed management for a generation run
//!
//! The master seed drives the noise field directly so a given `--seed`
//! reproduces the same terrain. Secondary streams (uniform jitter) get their
//! own derived seed so they never correlate with the noise permutation.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Seeds for the generation systems of one run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunSeeds {
    /// Master seed (as given on the command line)
    pub master: u64,
    /// Coherent noise context (site jitter, first-stage elevation)
    pub noise: u64,
    /// Uniform random site jitter
    pub jitter: u64,
}

impl RunSeeds {
    pub fn from_master(master: u64) -> Self {
        Self {
            master,
            noise: master,
            jitter: derive_seed(master, "jitter"),
        }
    }
}

/// Derive a sub-seed from a master seed and a system name.
fn derive_seed(master: u64, system: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    master.hash(&mut hasher);
    system.hash(&mut hasher);
    hasher.finish()
}

impl std::fmt::Display for RunSeeds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "RunSeeds {{ master: {}, noise: {}, jitter: {} }}",
            self.master, self.noise, self.jitter
        )
    }
}
