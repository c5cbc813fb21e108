//! Debug tool for inspecting pipeline stages visually
//! Generates a contact sheet of every stage plus the composite, each
//! rendered flat and hillshaded

use image::{ImageBuffer, Rgb, RgbImage};
use pseudo_erosion::erosion::{self, PipelineParams};
use pseudo_erosion::HeightImage;

const SIZE: usize = 256;
const SEED: u64 = 42;

fn main() {
    println!("Generating stage comparison sheet...");

    let params = PipelineParams {
        image_size: SIZE,
        feature_size: 32,
        grid_size: 8,
        seed: SEED,
        ..Default::default()
    };

    let output = match erosion::generate_with_stages(&params, None) {
        Ok(output) => output,
        Err(e) => {
            eprintln!("Generation failed: {}", e);
            std::process::exit(1);
        }
    };

    let mut images: Vec<RgbImage> = Vec::new();
    for (stage, stats) in output.stages.iter().zip(&output.stats) {
        println!(
            "  Stage {}: density {}, {} sinks, {} levels",
            stats.stage,
            stats.density,
            stats.sinks,
            stage.distinct_levels()
        );
        images.push(render_shaded(stage));
    }
    println!("  Composite: {} levels", output.composite.distinct_levels());
    images.push(render_shaded(&output.composite));

    let sheet = create_grid(&images, 3, 2);
    match sheet.save("stage_comparison.png") {
        Ok(()) => println!("Saved stage_comparison.png"),
        Err(e) => eprintln!("Failed to save sheet: {}", e),
    }
}

/// Grayscale hillshade, stretched to the image's own height range.
fn render_shaded(image: &HeightImage) -> RgbImage {
    let size = image.size();

    let mut min_h = f64::MAX;
    let mut max_h = f64::MIN;
    for y in 0..size {
        for x in 0..size {
            let h = image.height(x, y);
            if h < min_h { min_h = h; }
            if h > max_h { max_h = h; }
        }
    }
    let range = (max_h - min_h).max(1e-6);

    // Light from the upper left
    let (lx, ly, lz) = {
        let (x, y, z) = (-0.7f64, -0.7f64, 0.5f64);
        let len = (x * x + y * y + z * z).sqrt();
        (x / len, y / len, z / len)
    };

    ImageBuffer::from_fn(size as u32, size as u32, |x, y| {
        let (x, y) = (x as usize, y as usize);
        let h = image.height(x, y);
        let h_left = if x > 0 { image.height(x - 1, y) } else { h };
        let h_right = if x + 1 < size { image.height(x + 1, y) } else { h };
        let h_up = if y > 0 { image.height(x, y - 1) } else { h };
        let h_down = if y + 1 < size { image.height(x, y + 1) } else { h };

        let scale = 20.0;
        let nx = (h_left - h_right) * scale;
        let ny = (h_up - h_down) * scale;
        let nlen = (nx * nx + ny * ny + 1.0).sqrt();
        let diffuse = ((nx * lx + ny * ly + lz) / nlen).max(0.0);
        let lighting = 0.35 + 0.65 * diffuse;

        let v = ((h - min_h) / range * 255.0 * lighting).clamp(0.0, 255.0) as u8;
        Rgb([v, v, v])
    })
}

fn create_grid(images: &[RgbImage], cols: usize, rows: usize) -> RgbImage {
    if images.is_empty() {
        return ImageBuffer::new(1, 1);
    }

    let cell = images[0].width();
    let gap = 4u32;
    let width = (cell + gap) * cols as u32 + gap;
    let height = (cell + gap) * rows as u32 + gap;
    let mut grid: RgbImage = ImageBuffer::from_pixel(width, height, Rgb([40, 40, 40]));

    for (idx, img) in images.iter().enumerate() {
        let col = idx % cols;
        let row = idx / cols;
        if row >= rows {
            break;
        }
        let x_offset = gap + col as u32 * (cell + gap);
        let y_offset = gap + row as u32 * (cell + gap);
        for (x, y, pixel) in img.enumerate_pixels() {
            grid.put_pixel(x_offset + x, y_offset + y, *pixel);
        }
    }

    grid
}
