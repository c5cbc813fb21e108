//! Square image of codec-packed height samples.
//!
//! This is the only thing passed between pipeline stages, and the final
//! artifact written to disk.

use rayon::prelude::*;

use crate::codec;
use crate::tilemap::Tilemap;

#[derive(Clone, Debug, PartialEq)]
pub struct HeightImage {
    pixels: Tilemap<u32>,
}

impl HeightImage {
    /// A `size x size` image with every sample at height `height`.
    pub fn filled(size: usize, height: f64) -> Self {
        Self {
            pixels: Tilemap::new_with(size, size, codec::encode(height)),
        }
    }

    /// Wrap an already-packed pixel map. Returns `None` unless it is square.
    pub fn from_pixels(pixels: Tilemap<u32>) -> Option<Self> {
        if pixels.width != pixels.height {
            return None;
        }
        Some(Self { pixels })
    }

    /// Build from per-pixel heights computed in parallel, one row at a time.
    pub fn from_fn_par<F>(size: usize, height_at: F) -> Self
    where
        F: Fn(usize, usize) -> f64 + Sync,
    {
        let mut pixels = Tilemap::new_with(size, size, 0u32);
        pixels.par_rows_mut().for_each(|(y, row)| {
            for (x, px) in row.iter_mut().enumerate() {
                *px = codec::encode(height_at(x, y));
            }
        });
        Self { pixels }
    }

    pub fn size(&self) -> usize {
        self.pixels.width
    }

    pub fn pixel(&self, x: usize, y: usize) -> u32 {
        *self.pixels.get(x, y)
    }

    pub fn height(&self, x: usize, y: usize) -> f64 {
        codec::decode(self.pixel(x, y))
    }

    /// Height at the pixel nearest a sample-space position.
    ///
    /// Sample space is pixel space divided by `feature_size`; the pixel is
    /// found by truncation and clamped onto the image.
    pub fn height_at_sample(&self, x: f64, y: f64, feature_size: f64) -> f64 {
        let max = (self.size() - 1) as f64;
        let px = (x * feature_size).trunc().clamp(0.0, max) as usize;
        let py = (y * feature_size).trunc().clamp(0.0, max) as usize;
        self.height(px, py)
    }

    pub fn pixels(&self) -> &Tilemap<u32> {
        &self.pixels
    }

    /// Replace every sample with `f(x, y, current_height)`.
    pub fn map_heights<F>(&mut self, f: F)
    where
        F: Fn(usize, usize, f64) -> f64 + Sync,
    {
        self.pixels.par_rows_mut().for_each(|(y, row)| {
            for (x, px) in row.iter_mut().enumerate() {
                *px = codec::encode(f(x, y, codec::decode(*px)));
            }
        });
    }

    /// Number of distinct encoded values present.
    pub fn distinct_levels(&self) -> usize {
        let mut seen = [false; 256];
        for &px in self.pixels.as_slice() {
            seen[(px & 0xff) as usize] = true;
        }
        seen.iter().filter(|&&s| s).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_image_is_constant() {
        let img = HeightImage::filled(8, 0.5);
        assert_eq!(img.size(), 8);
        assert_eq!(img.distinct_levels(), 1);
        assert!((img.height(3, 4) - 0.5).abs() <= codec::QUANTIZATION_STEP);
    }

    #[test]
    fn test_from_pixels_requires_square() {
        assert!(HeightImage::from_pixels(Tilemap::new_with(4, 3, 0u32)).is_none());
        assert!(HeightImage::from_pixels(Tilemap::new_with(4, 4, 0u32)).is_some());
    }

    #[test]
    fn test_from_fn_par_matches_sequential() {
        let f = |x: usize, y: usize| (x as f64 - y as f64) / 16.0;
        let img = HeightImage::from_fn_par(16, f);
        for y in 0..16 {
            for x in 0..16 {
                assert_eq!(img.pixel(x, y), codec::encode(f(x, y)));
            }
        }
    }

    #[test]
    fn test_sample_lookup_truncates_and_clamps() {
        let img = HeightImage::from_fn_par(8, |x, y| if x == 2 && y == 5 { 1.0 } else { -1.0 });
        // (2.9, 5.9) pixels -> sample space with feature size 2
        assert_eq!(img.height_at_sample(1.45, 2.95, 2.0), 1.0);
        assert_eq!(img.height_at_sample(-3.0, 100.0, 2.0), img.height(0, 7));
    }

    #[test]
    fn test_map_heights() {
        let mut img = HeightImage::filled(4, 0.0);
        img.map_heights(|x, _, h| h + x as f64 * 0.25);
        assert!((img.height(3, 0) - 0.75).abs() <= codec::QUANTIZATION_STEP);
    }
}
