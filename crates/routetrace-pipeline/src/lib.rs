//! routetrace-pipeline: Pure route-map extraction pipeline (sans-IO).
//!
//! Converts a picture of a route map into an ordered GPS track through:
//! color threshold -> erosion -> ring-search path tracing ->
//! pixel-to-geo mapping.
//!
//! This crate has **no I/O dependencies** -- it operates on in-memory
//! images and returns structured data. Reading files, writing track
//! files, and rendering debug images live in `routetrace-export` and the
//! `routetrace` binary.

pub mod decode;
pub mod diagnostics;
pub mod mapper;
pub mod mask;
mod pipeline;
pub mod tracer;
pub mod types;
pub mod visualize;

pub use decode::decode_rgb;
pub use mapper::CoordinateMapper;
pub use mask::{TraceMask, build_mask};
pub use tracer::{PathTracer, trace};
pub use types::{
    Calibration, Dimensions, ExtractionResult, GeoPoint, PipelineError, PixelPoint, Termination,
    TraceConfig, TracedPath,
};
pub use visualize::{NoVisualizer, Recorder, Visualizer};

use crate::diagnostics::NullClock;
use crate::types::RgbImage;

/// Run the full extraction pipeline without visualization hooks.
///
/// Equivalent to [`extract_with`] with a [`NoVisualizer`].
///
/// # Errors
///
/// See [`extract_with`].
pub fn extract(image: &RgbImage, config: &TraceConfig) -> Result<ExtractionResult, PipelineError> {
    extract_with(image, config, &mut NoVisualizer)
}

/// Run the full extraction pipeline.
///
/// # Pipeline steps
///
/// 1. Reject images with a zero-length axis and invalid configs
/// 2. Threshold against the reference color
/// 3. Erode the candidate mask
/// 4. Fail if the mask is empty
/// 5. Trace an ordered pixel path from the first mask pixel
/// 6. Map every pixel to a geographic coordinate
///
/// `visualizer` is called after steps 4 and 5 only when
/// `config.enable_visualization` is `true`.
///
/// # Errors
///
/// Returns [`PipelineError::DegenerateInput`] if the image has zero
/// width or height.
/// Returns [`PipelineError::InvalidConfig`] if `config` fails
/// [`TraceConfig::validate`].
/// Returns [`PipelineError::EmptyMask`] if no pixel survives
/// thresholding and erosion.
pub fn extract_with(
    image: &RgbImage,
    config: &TraceConfig,
    visualizer: &mut dyn Visualizer,
) -> Result<ExtractionResult, PipelineError> {
    pipeline::run(image, config, visualizer, &NullClock).map(|(result, _)| result)
}
