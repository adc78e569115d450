//! Debug images: the trace mask and the traced points drawn over the
//! source picture.
//!
//! The overlay marks the start point with a green circle of radius 2 and
//! every following point with a yellow circle of radius 1, stroked with
//! `tiny-skia` on a copy of the source image.

use std::path::{Path, PathBuf};

use image::{DynamicImage, RgbImage};
use routetrace_pipeline::{TraceMask, TracedPath, Visualizer};
use tiny_skia::{Paint, PathBuilder, Pixmap, Stroke, Transform};

/// Start marker color (RGB).
const START_COLOR: [u8; 3] = [0, 255, 0];
/// Step marker color (RGB).
const STEP_COLOR: [u8; 3] = [255, 255, 0];
const START_RADIUS: f32 = 2.0;
const STEP_RADIUS: f32 = 1.0;

/// Draw the traced points onto a copy of `image`.
///
/// Returns an unmodified copy if the image has a zero-length axis.
#[allow(clippy::cast_precision_loss)]
pub fn render_overlay(image: &RgbImage, path: &TracedPath) -> RgbImage {
    let (width, height) = image.dimensions();
    let Some(mut pixmap) = Pixmap::new(width, height) else {
        return image.clone();
    };

    // Opaque source, so premultiplied and straight RGBA agree.
    for (dst, src) in pixmap.data_mut().chunks_exact_mut(4).zip(image.pixels()) {
        let [r, g, b] = src.0;
        dst.copy_from_slice(&[r, g, b, 255]);
    }

    let stroke = Stroke {
        width: 1.0,
        ..Stroke::default()
    };

    for (i, point) in path.points.iter().enumerate() {
        let (color, radius) = if i == 0 {
            (START_COLOR, START_RADIUS)
        } else {
            (STEP_COLOR, STEP_RADIUS)
        };
        // Centre of the pixel, not its top-left corner.
        let (cx, cy) = (point.x as f32 + 0.5, point.y as f32 + 0.5);
        let Some(circle) = PathBuilder::from_circle(cx, cy, radius) else {
            continue;
        };
        let mut paint = Paint::default();
        paint.set_color_rgba8(color[0], color[1], color[2], 255);
        paint.anti_alias = false;
        pixmap.stroke_path(&circle, &paint, &stroke, Transform::identity(), None);
    }

    let mut out = RgbImage::new(width, height);
    for (dst, src) in out.pixels_mut().zip(pixmap.data().chunks_exact(4)) {
        dst.0 = [src[0], src[1], src[2]];
    }
    out
}

/// [`Visualizer`] that saves the mask and overlay as PNG files.
///
/// Files are named `<stem>-mask.png` and `<stem>-trace.png` inside
/// `dir`. Write failures are logged and do not abort the run.
pub struct DebugWriter {
    dir: PathBuf,
    stem: String,
}

impl DebugWriter {
    pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            stem: stem.into(),
        }
    }

    pub fn mask_path(&self) -> PathBuf {
        self.dir.join(format!("{}-mask.png", self.stem))
    }

    pub fn trace_path(&self) -> PathBuf {
        self.dir.join(format!("{}-trace.png", self.stem))
    }
}

fn save_png(image: &DynamicImage, path: &Path) {
    match image.save_with_format(path, image::ImageFormat::Png) {
        Ok(()) => tracing::info!(path = %path.display(), "debug image written"),
        Err(e) => tracing::warn!(path = %path.display(), error = %e, "failed to write debug image"),
    }
}

impl Visualizer for DebugWriter {
    fn show_mask(&mut self, mask: &TraceMask) {
        let image = DynamicImage::ImageLuma8(mask.as_image().clone());
        save_png(&image, &self.mask_path());
    }

    fn show_trace(&mut self, image: &RgbImage, path: &TracedPath) {
        let overlay = DynamicImage::ImageRgb8(render_overlay(image, path));
        save_png(&overlay, &self.trace_path());
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use routetrace_pipeline::{PixelPoint, Termination};

    use super::*;

    fn path(points: &[(u32, u32)]) -> TracedPath {
        TracedPath {
            points: points.iter().map(|&(x, y)| PixelPoint::new(x, y)).collect(),
            closed: false,
            steps: points.len().saturating_sub(1),
            termination: Termination::DeadEnd,
        }
    }

    #[test]
    fn overlay_keeps_dimensions_and_leaves_source_untouched() {
        let image = RgbImage::from_pixel(40, 30, image::Rgb([10, 20, 30]));
        let before = image.clone();
        let overlay = render_overlay(&image, &path(&[(10, 10), (20, 10)]));
        assert_eq!(overlay.dimensions(), (40, 30));
        assert_eq!(image, before);
    }

    #[test]
    fn overlay_draws_start_marker_in_green() {
        let image = RgbImage::from_pixel(40, 30, image::Rgb([0, 0, 0]));
        let overlay = render_overlay(&image, &path(&[(10, 10)]));
        let green = overlay.pixels().filter(|p| p.0 == START_COLOR).count();
        assert!(green > 0);
        // Far corner stays background.
        assert_eq!(overlay.get_pixel(39, 29).0, [0, 0, 0]);
    }

    #[test]
    fn overlay_draws_step_markers_in_yellow() {
        let image = RgbImage::from_pixel(40, 30, image::Rgb([0, 0, 0]));
        let overlay = render_overlay(&image, &path(&[(5, 5), (20, 15), (30, 15)]));
        let yellow = overlay.pixels().filter(|p| p.0 == STEP_COLOR).count();
        assert!(yellow > 0);
    }

    #[test]
    fn empty_path_returns_plain_copy() {
        let image = RgbImage::from_pixel(8, 8, image::Rgb([1, 2, 3]));
        assert_eq!(render_overlay(&image, &path(&[])), image);
    }

    #[test]
    fn writer_names_files_after_stem() {
        let writer = DebugWriter::new("out", "loop");
        assert_eq!(writer.mask_path(), PathBuf::from("out/loop-mask.png"));
        assert_eq!(writer.trace_path(), PathBuf::from("out/loop-trace.png"));
    }
}
