//! Optional debug visualization hooks.
//!
//! The pipeline never draws anything itself. When
//! [`TraceConfig::enable_visualization`](crate::TraceConfig) is set it
//! hands the intermediate mask and the finished trace to a
//! [`Visualizer`], which may render, save, or display them. Hooks only
//! receive shared references, so they cannot alter the traced result.

use image::{GrayImage, RgbImage};

use crate::mask::TraceMask;
use crate::types::TracedPath;

/// Receiver for intermediate pipeline results.
///
/// Both hooks default to doing nothing so implementors only override
/// what they need.
pub trait Visualizer {
    /// Called once the mask is built and known to be non-empty.
    fn show_mask(&mut self, _mask: &TraceMask) {}

    /// Called once tracing has finished, with the untouched source image.
    fn show_trace(&mut self, _image: &RgbImage, _path: &TracedPath) {}
}

/// Visualizer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVisualizer;

impl Visualizer for NoVisualizer {}

/// Visualizer that keeps copies of what it was shown.
#[derive(Debug, Clone, Default)]
pub struct Recorder {
    /// Last mask shown, as a binary raster.
    pub mask: Option<GrayImage>,
    /// Last traced path shown.
    pub path: Option<TracedPath>,
}

impl Visualizer for Recorder {
    fn show_mask(&mut self, mask: &TraceMask) {
        self.mask = Some(mask.as_image().clone());
    }

    fn show_trace(&mut self, _image: &RgbImage, path: &TracedPath) {
        self.path = Some(path.clone());
    }
}
