//! Pseudo-erosion heightmap library
//!
//! Re-exports modules for use by binaries and tools.

pub mod codec;
pub mod erosion;
pub mod error;
pub mod export;
pub mod height_image;
pub mod noise_source;
pub mod seeds;
pub mod tilemap;

pub use error::{PseudoErosionError, Result};
pub use height_image::HeightImage;
