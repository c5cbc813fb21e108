//! Pseudo-erosion distance field.
//!
//! Each pixel's height is its distance to the nearest site -> successor
//! segment among the nine lattice cells around it. Segments follow the
//! drainage network, so low values trace branching channels.

use crate::erosion::grid::Grid;
use crate::height_image::HeightImage;

/// Distance from `p` to the segment running from `a` to `b`.
///
/// The projection parameter is measured from `a` toward `b` in units of
/// the segment length, negated: above 0 the closest point is `a`, below -1
/// it is `b`, otherwise it lies on the segment and the perpendicular
/// distance to the line is used. A zero-length segment (a sink) is plain
/// point distance to `a`.
pub fn segment_distance(p: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    let (px, py) = p;
    let (ax, ay) = a;
    let (bx, by) = b;
    let dx = ax - bx;
    let dy = ay - by;
    let len_sq = dx * dx + dy * dy;

    if len_sq == 0.0 {
        return (px - ax).hypot(py - ay);
    }

    let f1 = (dy * (py - ay) + dx * (px - ax)) / len_sq;
    if f1 > 0.0 {
        (px - ax).hypot(py - ay)
    } else if f1 < -1.0 {
        (px - bx).hypot(py - by)
    } else {
        (dx * (ay - py) - dy * (ax - px)).abs() / len_sq.sqrt()
    }
}

/// Raw erosion height for pixel `(px, py)`: the minimum segment distance
/// over the Moore neighbourhood of the pixel's lattice cell.
pub fn pixel_height(grid: &Grid, px: usize, py: usize, image_size: usize, feature_size: f64) -> f64 {
    let density = grid.density();
    let p = (px as f64 / feature_size, py as f64 / feature_size);
    let ngx = (density * px / image_size).min(density);
    let ngy = (density * py / image_size).min(density);

    grid.neighborhood(ngx as i64, ngy as i64)
        .map(|(col, row)| {
            let a = grid.site(col, row);
            let b = grid.successor(col, row);
            segment_distance(p, (a.x, a.y), (b.x, b.y))
        })
        .fold(f64::INFINITY, f64::min)
}

/// Render the distance field of `grid` at `image_size x image_size`.
/// Rows are independent and computed in parallel.
pub fn distance_field(grid: &Grid, image_size: usize, feature_size: f64) -> HeightImage {
    HeightImage::from_fn_par(image_size, |x, y| pixel_height(grid, x, y, image_size, feature_size))
}
