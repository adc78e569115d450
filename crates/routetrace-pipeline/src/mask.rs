//! Trace mask: select trace-colored pixels and clean them up.
//!
//! The mask is built in two steps:
//!
//! 1. [`threshold`]: a pixel is a candidate when every channel lies
//!    within `±band` of the reference color (a per-channel box, not a
//!    Euclidean distance).
//! 2. [`erode`]: a rectangular erosion removes isolated false positives
//!    and thins the line by one pixel on the top/left side for the
//!    default 2×2 kernel.
//!
//! The result is a [`TraceMask`], a binary raster that the tracer only
//! ever reads.

use image::{GrayImage, Luma, RgbImage};
use imageproc::morphology::{Mask, grayscale_erode};

use crate::types::{Dimensions, PixelPoint, TraceConfig};

/// Raster value marking a trace pixel.
const SET: u8 = 255;

/// Binary mask of trace-colored pixels.
///
/// Backed by a [`GrayImage`] holding only `0` and `255` so it can be
/// previewed or saved directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceMask(GrayImage);

impl TraceMask {
    /// Build a mask by evaluating `f` at every pixel.
    #[must_use]
    pub fn from_fn(width: u32, height: u32, mut f: impl FnMut(u32, u32) -> bool) -> Self {
        Self(GrayImage::from_fn(width, height, |x, y| {
            Luma([if f(x, y) { SET } else { 0 }])
        }))
    }

    /// Mask width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    /// Mask height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.0.height()
    }

    /// Mask dimensions.
    #[must_use]
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width(),
            height: self.height(),
        }
    }

    /// Whether the pixel at signed coordinates is inside the mask and set.
    ///
    /// Out-of-bounds coordinates are never set, which lets callers probe
    /// rings that extend past the image edge.
    #[must_use]
    pub fn is_set_at(&self, x: i64, y: i64) -> bool {
        match (u32::try_from(x), u32::try_from(y)) {
            (Ok(x), Ok(y)) if x < self.width() && y < self.height() => {
                self.0.get_pixel(x, y).0[0] == SET
            }
            _ => false,
        }
    }

    /// Whether `point` is set.
    #[must_use]
    pub fn is_set(&self, point: PixelPoint) -> bool {
        self.is_set_at(i64::from(point.x), i64::from(point.y))
    }

    /// Number of set pixels.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.0.pixels().map(|p| u64::from(p.0[0] == SET)).sum()
    }

    /// Returns `true` if no pixel is set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.first_set().is_none()
    }

    /// First set pixel in row-major order (top row first, left to right).
    #[must_use]
    pub fn first_set(&self) -> Option<PixelPoint> {
        self.0
            .enumerate_pixels()
            .find(|(_, _, p)| p.0[0] == SET)
            .map(|(x, y, _)| PixelPoint::new(x, y))
    }

    /// Borrow the underlying raster.
    #[must_use]
    pub const fn as_image(&self) -> &GrayImage {
        &self.0
    }
}

/// Mark pixels whose every channel is within `band` of `reference`.
///
/// Both bounds are inclusive and are not clamped to `0..=255`, so a
/// reference channel of 241 with a band of 50 accepts 191 through 255.
#[must_use = "returns the thresholded mask"]
pub fn threshold(image: &RgbImage, reference: [u8; 3], band: u8) -> TraceMask {
    let band = i16::from(band);
    TraceMask(imageproc::map::map_pixels(image, |pixel: image::Rgb<u8>| {
        let inside = pixel
            .0
            .iter()
            .zip(reference.iter())
            .all(|(&c, &r)| (i16::from(c) - i16::from(r)).abs() <= band);
        Luma([if inside { SET } else { 0 }])
    }))
}

/// Erode `mask` with a `kernel.0 × kernel.1` rectangle, `iterations`
/// times.
///
/// The kernel anchor sits at `(kernel.0 / 2, kernel.1 / 2)`, so a 2×2
/// kernel covers the pixel itself plus its left, upper, and upper-left
/// neighbours. A pixel survives only if every covered in-bounds pixel
/// is set; pixels outside the image do not erode their neighbours.
///
/// Each axis is clamped to `1..=TraceConfig::MAX_EROSION_KERNEL`.
#[must_use = "returns the eroded mask"]
pub fn erode(mask: &TraceMask, kernel: (u32, u32), iterations: u32) -> TraceMask {
    let element = structuring_element(kernel);
    let mut current = mask.0.clone();
    for _ in 0..iterations {
        current = grayscale_erode(&current, &element);
    }
    TraceMask(current)
}

/// Rectangular structuring element anchored at its centre.
fn structuring_element(kernel: (u32, u32)) -> Mask {
    let clamp = |axis: u32| axis.clamp(1, TraceConfig::MAX_EROSION_KERNEL);
    let (kw, kh) = (clamp(kernel.0), clamp(kernel.1));
    // kw / 2 and kh / 2 are at most 255 after clamping.
    let anchor = |axis: u32| u8::try_from(axis / 2).unwrap_or(u8::MAX);
    Mask::from_image(
        &GrayImage::from_pixel(kw, kh, Luma([SET])),
        anchor(kw),
        anchor(kh),
    )
}

/// Threshold then erode, using the mask settings from `config`.
#[must_use = "returns the trace mask"]
pub fn build_mask(image: &RgbImage, config: &TraceConfig) -> TraceMask {
    let candidates = threshold(image, config.reference_color, config.band);
    erode(
        &candidates,
        config.erosion_kernel,
        config.erosion_iterations,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const REFERENCE: [u8; 3] = TraceConfig::DEFAULT_REFERENCE_COLOR;

    fn single_pixel_image(color: [u8; 3]) -> RgbImage {
        RgbImage::from_pixel(1, 1, image::Rgb(color))
    }

    #[test]
    fn exact_reference_color_is_set() {
        let mask = threshold(&single_pixel_image(REFERENCE), REFERENCE, 50);
        assert!(mask.is_set(PixelPoint::new(0, 0)));
    }

    #[test]
    fn band_edge_is_inclusive() {
        let color = [REFERENCE[0] + 50, REFERENCE[1] - 50, REFERENCE[2]];
        let mask = threshold(&single_pixel_image(color), REFERENCE, 50);
        assert!(mask.is_set(PixelPoint::new(0, 0)));
    }

    #[test]
    fn one_channel_off_by_51_is_not_set() {
        for channel in 0..3 {
            let mut color = REFERENCE;
            // Channel 2 is 241; go down so the value stays in range.
            color[channel] = if channel == 2 {
                REFERENCE[2] - 51
            } else {
                REFERENCE[channel] + 51
            };
            let mask = threshold(&single_pixel_image(color), REFERENCE, 50);
            assert!(
                !mask.is_set(PixelPoint::new(0, 0)),
                "channel {channel} off by 51 should be rejected",
            );
        }
    }

    #[test]
    fn upper_bound_is_not_clamped() {
        // 241 + 50 exceeds 255, so pure 255 must still be accepted.
        let color = [REFERENCE[0], REFERENCE[1], 255];
        let mask = threshold(&single_pixel_image(color), REFERENCE, 50);
        assert!(mask.is_set(PixelPoint::new(0, 0)));
    }

    #[test]
    fn erosion_removes_isolated_pixel() {
        let mask = TraceMask::from_fn(10, 10, |x, y| x == 5 && y == 5);
        let eroded = erode(&mask, (2, 2), 1);
        assert!(eroded.is_empty());
    }

    #[test]
    fn erosion_keeps_bottom_right_of_block() {
        let mask = TraceMask::from_fn(10, 10, |x, y| (5..7).contains(&x) && (5..7).contains(&y));
        let eroded = erode(&mask, (2, 2), 1);
        assert_eq!(eroded.count(), 1);
        assert!(eroded.is_set(PixelPoint::new(6, 6)));
    }

    #[test]
    fn erosion_thins_thick_line_by_one_row() {
        let mask = TraceMask::from_fn(20, 12, |x, y| (2..10).contains(&x) && (4..7).contains(&y));
        let eroded = erode(&mask, (2, 2), 1);
        for y in 0..12 {
            for x in 0..20 {
                let expected = (3..10).contains(&x) && (5..7).contains(&y);
                assert_eq!(eroded.is_set(PixelPoint::new(x, y)), expected, "({x}, {y})");
            }
        }
    }

    #[test]
    fn erosion_ignores_out_of_bounds_neighbours() {
        let mask = TraceMask::from_fn(4, 4, |x, y| x == 0 && y == 0);
        let eroded = erode(&mask, (2, 2), 1);
        assert!(eroded.is_set(PixelPoint::new(0, 0)));
    }

    #[test]
    fn zero_iterations_is_identity() {
        let mask = TraceMask::from_fn(10, 10, |x, y| x == 3 && y == 7);
        assert_eq!(erode(&mask, (2, 2), 0), mask);
    }

    #[test]
    fn erosion_with_3x3_kernel_shrinks_block_on_every_side() {
        let mask = TraceMask::from_fn(12, 12, |x, y| (2..8).contains(&x) && (3..9).contains(&y));
        let eroded = erode(&mask, (3, 3), 1);
        for y in 0..12 {
            for x in 0..12 {
                let expected = (3..7).contains(&x) && (4..8).contains(&y);
                assert_eq!(eroded.is_set(PixelPoint::new(x, y)), expected, "({x}, {y})");
            }
        }
    }

    #[test]
    fn repeated_erosion_compounds() {
        let mask = TraceMask::from_fn(10, 10, |x, y| (2..6).contains(&x) && (2..6).contains(&y));
        let twice = erode(&mask, (2, 2), 2);
        assert_eq!(twice, erode(&erode(&mask, (2, 2), 1), (2, 2), 1));
        assert_eq!(twice.count(), 4);
        assert!(twice.is_set(PixelPoint::new(4, 4)));
    }

    #[test]
    fn eroded_mask_stays_binary() {
        let mask = TraceMask::from_fn(9, 7, |x, y| (x + y) % 3 != 0);
        let eroded = erode(&mask, (2, 2), 1);
        assert!(eroded.as_image().pixels().all(|p| p.0[0] == 0 || p.0[0] == SET));
    }

    #[test]
    fn zero_sized_kernel_axis_is_clamped_to_one() {
        let mask = TraceMask::from_fn(6, 6, |x, y| x == 2 && (1..4).contains(&y));
        // A 1×2 kernel only looks upward, so the top pixel of the column goes.
        let eroded = erode(&mask, (0, 2), 1);
        assert_eq!(eroded, erode(&mask, (1, 2), 1));
        assert_eq!(eroded.count(), 2);
    }

    #[test]
    fn first_set_is_row_major() {
        let mask = TraceMask::from_fn(10, 10, |x, y| (x == 8 && y == 2) || (x == 1 && y == 3));
        assert_eq!(mask.first_set(), Some(PixelPoint::new(8, 2)));
    }

    #[test]
    fn out_of_bounds_probe_is_unset() {
        let mask = TraceMask::from_fn(3, 3, |_, _| true);
        assert!(!mask.is_set_at(-1, 0));
        assert!(!mask.is_set_at(0, 3));
        assert!(mask.is_set_at(2, 2));
    }

    #[test]
    fn build_mask_on_uniform_far_color_is_empty() {
        let image = RgbImage::from_pixel(16, 16, image::Rgb([255, 255, 255]));
        assert!(build_mask(&image, &TraceConfig::default()).is_empty());
    }

    #[test]
    fn build_mask_keeps_thick_trace() {
        let image = RgbImage::from_fn(16, 16, |x, _| {
            if (6..10).contains(&x) {
                image::Rgb(REFERENCE)
            } else {
                image::Rgb([255, 255, 255])
            }
        });
        let mask = build_mask(&image, &TraceConfig::default());
        // Erosion drops column 6. Row 0 survives because the row above
        // it is out of bounds.
        assert!(!mask.is_set(PixelPoint::new(6, 8)));
        assert!(mask.is_set(PixelPoint::new(7, 8)));
        assert!(mask.is_set(PixelPoint::new(9, 0)));
        assert_eq!(mask.count(), 3 * 16);
    }
}
