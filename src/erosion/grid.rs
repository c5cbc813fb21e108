//! Drainage site lattice.
//!
//! A grid of `(density + 1)^2` sites, each jittered off a regular lattice
//! and linked to the lowest cell in its Moore neighbourhood. The resulting
//! site -> successor links form a forest of paths draining toward sinks,
//! which the distance field turns into channels.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::erosion::params::{JitterMode, PipelineParams};
use crate::height_image::HeightImage;
use crate::noise_source::NoiseContext;
use crate::seeds::RunSeeds;
use crate::tilemap::Tilemap;

/// Moore neighbourhood offsets: the eight compass directions clockwise from
/// northwest, then the cell itself. Lowest-neighbour ties go to the earliest
/// entry, so this order is part of the output.
pub const MOORE_NEIGHBORHOOD: [(i64, i64); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (1, 0),
    (1, 1),
    (0, 1),
    (-1, 1),
    (-1, 0),
    (0, 0),
];

// Extra noise coordinates for x and y jitter; distinct so the two offsets
// are decorrelated.
const JITTER_X_ZW: (f64, f64) = (3.7, 0.0);
const JITTER_Y_ZW: (f64, f64) = (0.0, 3.7);

const NOISE_JITTER_SCALE: f64 = 0.5;
const UNIFORM_JITTER_SCALE: f64 = 0.7;

/// A drainage site. Position is in noise-sample space.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Site {
    pub x: f64,
    pub y: f64,
    /// Lattice index `(col, row)` this site drains toward (may be itself).
    pub successor: (usize, usize),
}

/// Where connectivity reads elevations from.
#[derive(Clone, Copy)]
pub enum ElevationSource<'a> {
    /// Raw noise at the site position (first stage).
    Noise(&'a NoiseContext),
    /// Decoded height of an earlier stage's image (feedback stages).
    Image {
        image: &'a HeightImage,
        feature_size: f64,
    },
}

impl ElevationSource<'_> {
    pub fn elevation(&self, x: f64, y: f64) -> f64 {
        match self {
            Self::Noise(noise) => noise.sample4(x, y, 0.0, 0.0),
            Self::Image { image, feature_size } => image.height_at_sample(x, y, *feature_size),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Grid {
    density: usize,
    sites: Tilemap<Site>,
}

impl Grid {
    /// Build a grid for one pipeline stage.
    ///
    /// Without a source image the sites are jittered and drained by raw
    /// noise. With one, sites stay on the regular lattice and drain by the
    /// image's decoded heights.
    pub fn build(
        density: usize,
        params: &PipelineParams,
        seeds: &RunSeeds,
        noise: &NoiseContext,
        source: Option<&HeightImage>,
    ) -> Self {
        let jitter = match source {
            None => Some(params.jitter),
            Some(_) => None,
        };
        let mut grid = Self::place_sites(density, params, seeds, noise, jitter);
        let elevation = match source {
            None => ElevationSource::Noise(noise),
            Some(image) => ElevationSource::Image {
                image,
                feature_size: params.feature_size as f64,
            },
        };
        grid.assign_successors(&elevation);
        grid
    }

    /// Lay out sites. Every successor starts as the site itself.
    pub fn place_sites(
        density: usize,
        params: &PipelineParams,
        seeds: &RunSeeds,
        noise: &NoiseContext,
        jitter: Option<JitterMode>,
    ) -> Self {
        let n = density + 1;
        let spacing = params.site_spacing(density);
        let mut rng = ChaCha8Rng::seed_from_u64(seeds.jitter.wrapping_add(density as u64));
        let mut sites = Tilemap::new(n, n);

        for (col, row, site) in sites.iter_mut() {
            let bx = col as f64 * spacing;
            let by = row as f64 * spacing;
            let (dx, dy) = match jitter {
                None => (0.0, 0.0),
                Some(JitterMode::Noise) => (
                    noise.sample4(bx, by, JITTER_X_ZW.0, JITTER_X_ZW.1) * NOISE_JITTER_SCALE * spacing,
                    noise.sample4(bx, by, JITTER_Y_ZW.0, JITTER_Y_ZW.1) * NOISE_JITTER_SCALE * spacing,
                ),
                Some(JitterMode::Uniform) => {
                    let range = UNIFORM_JITTER_SCALE * spacing;
                    (rng.gen_range(0.0..range), rng.gen_range(0.0..range))
                }
            };
            *site = Site {
                x: bx + dx,
                y: by + dy,
                successor: (col, row),
            };
        }

        Self { density, sites }
    }

    /// Point every site at its lowest Moore neighbour (self included).
    pub fn assign_successors(&mut self, source: &ElevationSource<'_>) {
        let n = self.sites.width;
        let this = &*self;
        let successors: Vec<(usize, usize)> = (0..n * n)
            .into_par_iter()
            .map(|idx| this.lowest_neighbor(idx % n, idx / n, source))
            .collect();

        for (idx, successor) in successors.into_iter().enumerate() {
            self.sites.get_mut(idx % n, idx / n).successor = successor;
        }
    }

    fn lowest_neighbor(&self, col: usize, row: usize, source: &ElevationSource<'_>) -> (usize, usize) {
        let mut best = (col, row);
        let mut best_elevation = f64::INFINITY;
        for (cx, cy) in self.neighborhood(col as i64, row as i64) {
            let site = self.sites.get(cx, cy);
            let elevation = source.elevation(site.x, site.y);
            if elevation < best_elevation {
                best_elevation = elevation;
                best = (cx, cy);
            }
        }
        best
    }

    /// In-range Moore neighbourhood of a lattice cell, in enumeration order.
    pub fn neighborhood(&self, col: i64, row: i64) -> impl Iterator<Item = (usize, usize)> + '_ {
        MOORE_NEIGHBORHOOD.iter().filter_map(move |&(dx, dy)| {
            let (cx, cy) = (col + dx, row + dy);
            self.sites.contains(cx, cy).then_some((cx as usize, cy as usize))
        })
    }

    /// Cells per side minus one.
    pub fn density(&self) -> usize {
        self.density
    }

    pub fn site(&self, col: usize, row: usize) -> &Site {
        self.sites.get(col, row)
    }

    /// The site a given site drains into.
    pub fn successor(&self, col: usize, row: usize) -> &Site {
        let (sx, sy) = self.site(col, row).successor;
        self.sites.get(sx, sy)
    }

    pub fn sites(&self) -> impl Iterator<Item = (usize, usize, &Site)> {
        self.sites.iter()
    }

    /// Sites that are their own successor.
    pub fn sink_count(&self) -> usize {
        self.sites().filter(|(c, r, s)| s.successor == (*c, *r)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> (PipelineParams, RunSeeds, NoiseContext) {
        let params = PipelineParams::small();
        let seeds = RunSeeds::from_master(params.seed);
        let noise = NoiseContext::new(seeds.noise);
        (params, seeds, noise)
    }

    #[test]
    fn test_lattice_dimensions() {
        let (params, seeds, noise) = small();
        let grid = Grid::build(4, &params, &seeds, &noise, None);
        assert_eq!(grid.density(), 4);
        assert_eq!(grid.sites().count(), 25);
    }

    #[test]
    fn test_successor_is_moore_neighbor() {
        let (params, seeds, noise) = small();
        for density in [4, 8, 16] {
            let grid = Grid::build(density, &params, &seeds, &noise, None);
            for (col, row, site) in grid.sites() {
                let (sx, sy) = site.successor;
                assert!((sx as i64 - col as i64).abs() <= 1);
                assert!((sy as i64 - row as i64).abs() <= 1);
                assert!(sx <= density && sy <= density);
            }
        }
    }

    #[test]
    fn test_noise_jitter_within_half_cell() {
        let (params, seeds, noise) = small();
        let density = 8;
        let spacing = params.site_spacing(density);
        let grid = Grid::place_sites(density, &params, &seeds, &noise, Some(JitterMode::Noise));
        let mut moved = 0;
        for (col, row, site) in grid.sites() {
            let dx = site.x - col as f64 * spacing;
            let dy = site.y - row as f64 * spacing;
            assert!(dx.abs() <= 0.5 * spacing + 1e-12);
            assert!(dy.abs() <= 0.5 * spacing + 1e-12);
            if dx != 0.0 || dy != 0.0 {
                moved += 1;
            }
            assert_eq!(site.successor, (col, row));
        }
        assert!(moved > 0);
    }

    #[test]
    fn test_uniform_jitter_range() {
        let (params, seeds, noise) = small();
        let density = 8;
        let spacing = params.site_spacing(density);
        let grid = Grid::place_sites(density, &params, &seeds, &noise, Some(JitterMode::Uniform));
        for (col, row, site) in grid.sites() {
            let dx = site.x - col as f64 * spacing;
            let dy = site.y - row as f64 * spacing;
            assert!(dx >= 0.0 && dx <= 0.7 * spacing);
            assert!(dy >= 0.0 && dy <= 0.7 * spacing);
        }
        let again = Grid::place_sites(density, &params, &seeds, &noise, Some(JitterMode::Uniform));
        assert_eq!(grid.site(3, 5), again.site(3, 5));
    }

    #[test]
    fn test_unjittered_sites_on_lattice() {
        let (params, seeds, noise) = small();
        let grid = Grid::place_sites(4, &params, &seeds, &noise, None);
        assert_eq!(grid.site(2, 3).x, 2.0);
        assert_eq!(grid.site(2, 3).y, 3.0);
    }

    #[test]
    fn test_image_source_drains_downhill() {
        let (params, seeds, noise) = small();
        // Height increases with x + y, so the minimum is the top-left corner.
        let image = HeightImage::from_fn_par(64, |x, y| (x + y) as f64 / 128.0 - 0.5);
        let grid = Grid::build(4, &params, &seeds, &noise, Some(&image));
        for (col, row, site) in grid.sites() {
            if col == 0 && row == 0 {
                assert_eq!(site.successor, (0, 0));
            } else {
                let (sx, sy) = site.successor;
                assert_eq!(sx, col.saturating_sub(1));
                assert_eq!(sy, row.saturating_sub(1));
            }
        }
        assert_eq!(grid.sink_count(), 1);
    }

    #[test]
    fn test_flat_image_ties_go_to_northwest() {
        let (params, seeds, noise) = small();
        let image = HeightImage::filled(64, 0.0);
        let grid = Grid::build(4, &params, &seeds, &noise, Some(&image));
        assert_eq!(grid.site(2, 2).successor, (1, 1));
        // Top-left corner has only E, SE, S and itself; E is first.
        assert_eq!(grid.site(0, 0).successor, (1, 0));
    }

    #[test]
    fn test_neighborhood_clips_edges() {
        let (params, seeds, noise) = small();
        let grid = Grid::place_sites(4, &params, &seeds, &noise, None);
        assert_eq!(grid.neighborhood(0, 0).count(), 4);
        assert_eq!(grid.neighborhood(4, 2).count(), 6);
        assert_eq!(grid.neighborhood(2, 2).count(), 9);
        assert_eq!(grid.neighborhood(2, 2).last(), Some((2, 2)));
    }

    #[test]
    fn test_build_is_deterministic() {
        let (params, seeds, noise) = small();
        let a = Grid::build(8, &params, &seeds, &noise, None);
        let b = Grid::build(8, &params, &seeds, &noise, None);
        for ((_, _, sa), (_, _, sb)) in a.sites().zip(b.sites()) {
            assert_eq!(sa, sb);
        }
    }
}
