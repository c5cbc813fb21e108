//! Multi-resolution compositing of stage images.
//!
//! Stages are folded into the first stage's image one at a time. Each step
//! decodes, blends and re-encodes every pixel, so the order of steps (and
//! the quantization between them) is fixed.

use crate::height_image::HeightImage;

/// Stage 2: halve the base and add a quarter of the doubled-density stage.
pub fn blend_stage2(a: f64, b: f64) -> f64 {
    0.5 * a + 0.25 * b
}

/// Stage 3: add the squared stage-3 height.
pub fn blend_stage3(a: f64, b: f64) -> f64 {
    a + b * b
}

/// Stage 4: stage-4 detail, gated by stage 3.
pub fn blend_stage4(a: f64, b: f64, c: f64) -> f64 {
    a + b * 0.5 * c
}

/// Stage 5: stage-5 detail, gated by the geometric mean of stages 3 and 4.
pub fn blend_stage5(a: f64, b: f64, c: f64, d: f64) -> f64 {
    a + (b * c).max(0.0).sqrt() * 0.3333 * d
}

/// The five stage images of one run, coarsest first.
pub struct StageImages<'a> {
    pub stage2: &'a HeightImage,
    pub stage3: &'a HeightImage,
    pub stage4: &'a HeightImage,
    pub stage5: &'a HeightImage,
}

/// Fold stages 2-5 into `accumulator` (the stage-1 image), in order.
pub fn composite(accumulator: &mut HeightImage, stages: &StageImages<'_>) {
    let size = accumulator.size();
    for image in [stages.stage2, stages.stage3, stages.stage4, stages.stage5] {
        assert_eq!(image.size(), size, "stage images must share the accumulator's size");
    }

    accumulator.map_heights(|x, y, a| blend_stage2(a, stages.stage2.height(x, y)));
    accumulator.map_heights(|x, y, a| blend_stage3(a, stages.stage3.height(x, y)));
    accumulator.map_heights(|x, y, a| {
        blend_stage4(a, stages.stage3.height(x, y), stages.stage4.height(x, y))
    });
    accumulator.map_heights(|x, y, a| {
        blend_stage5(
            a,
            stages.stage3.height(x, y),
            stages.stage4.height(x, y),
            stages.stage5.height(x, y),
        )
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec;

    #[test]
    fn test_stage2_exact() {
        assert_eq!(blend_stage2(0.2, 0.4), 0.5 * 0.2 + 0.25 * 0.4);
        assert!((blend_stage2(0.2, 0.4) - 0.2).abs() < 1e-15);
    }

    #[test]
    fn test_stage3_and_stage4() {
        assert!((blend_stage3(0.1, 0.3) - 0.19).abs() < 1e-12);
        assert!((blend_stage4(0.1, 0.3, 0.6) - 0.19).abs() < 1e-12);
    }

    #[test]
    fn test_stage5_closed_form() {
        let expected = 0.1 + (0.3f64 * 0.6).sqrt() * 0.3333 * 0.9;
        let got = blend_stage5(0.1, 0.3, 0.6, 0.9);
        assert!((got - expected).abs() < 1e-12);
        assert!((got - 0.2272665).abs() < 1e-6);
    }

    #[test]
    fn test_stage5_negative_product_is_safe() {
        let got = blend_stage5(0.1, -0.3, 0.6, 0.9);
        assert!(got.is_finite());
        assert_eq!(got, 0.1);
    }

    #[test]
    fn test_composite_order() {
        let size = 4;
        let mut acc = HeightImage::filled(size, 0.2);
        let s2 = HeightImage::filled(size, 0.4);
        let s3 = HeightImage::filled(size, 0.3);
        let s4 = HeightImage::filled(size, 0.6);
        let s5 = HeightImage::filled(size, 0.9);

        // Same sequence by hand, quantizing between steps.
        let q = |h: f64| codec::decode(codec::encode(h));
        let (a0, b, c, d) = (q(0.2), q(0.3), q(0.6), q(0.9));
        let mut a = q(blend_stage2(a0, q(0.4)));
        a = q(blend_stage3(a, b));
        a = q(blend_stage4(a, b, c));
        a = q(blend_stage5(a, b, c, d));

        composite(
            &mut acc,
            &StageImages { stage2: &s2, stage3: &s3, stage4: &s4, stage5: &s5 },
        );
        for y in 0..size {
            for x in 0..size {
                assert_eq!(acc.height(x, y), a);
            }
        }
    }
}
