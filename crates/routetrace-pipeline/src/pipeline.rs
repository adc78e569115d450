//! Extraction pipeline: image -> mask -> pixel path -> geo track.
//!
//! Every run is a single forward pass with no retries. Inputs are
//! checked where they enter (dimensions, config, mask) so a failure is
//! reported before any partial output exists.

use crate::diagnostics::{
    Clock, PipelineDiagnostics, PipelineSummary, StageDiagnostics, StageMetrics,
    mean_step_length,
};
use crate::mapper::CoordinateMapper;
use crate::mask;
use crate::tracer::PathTracer;
use crate::types::{Dimensions, ExtractionResult, PipelineError, RgbImage, TraceConfig};
use crate::visualize::Visualizer;

/// Run every stage, timing each one with `clock`.
pub(crate) fn run<C: Clock>(
    image: &RgbImage,
    config: &TraceConfig,
    visualizer: &mut dyn Visualizer,
    clock: &C,
) -> Result<(ExtractionResult, PipelineDiagnostics), PipelineError> {
    let run_start = clock.now();

    let dimensions = Dimensions {
        width: image.width(),
        height: image.height(),
    };
    let mapper = CoordinateMapper::new(dimensions, config.calibration)?;
    config.validate()?;

    // 1. Color thresholding.
    let start = clock.now();
    let candidates = mask::threshold(image, config.reference_color, config.band);
    let candidate_pixels = candidates.count();
    let threshold = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Threshold {
            reference_color: config.reference_color,
            band: config.band,
            candidate_pixels,
            total_pixels: u64::from(dimensions.width) * u64::from(dimensions.height),
        },
    };

    // 2. Erosion.
    let start = clock.now();
    let trace_mask = mask::erode(
        &candidates,
        config.erosion_kernel,
        config.erosion_iterations,
    );
    let mask_pixels = trace_mask.count();
    let erosion = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Erosion {
            kernel: config.erosion_kernel,
            iterations: config.erosion_iterations,
            mask_pixels,
        },
    };
    tracing::debug!(candidate_pixels, mask_pixels, "mask built");

    if mask_pixels == 0 {
        return Err(PipelineError::EmptyMask);
    }
    if config.enable_visualization {
        visualizer.show_mask(&trace_mask);
    }

    // 3. Path tracing.
    let start = clock.now();
    let path = PathTracer::new(&trace_mask, config)
        .trace()
        .ok_or(PipelineError::EmptyMask)?;
    let tracing_stage = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Tracing {
            point_count: path.len(),
            steps: path.steps,
            termination: path.termination,
            mean_step_length: mean_step_length(&path.points),
        },
    };
    if config.enable_visualization {
        visualizer.show_trace(image, &path);
    }

    // 4. Pixel-to-geo mapping.
    let start = clock.now();
    let track = mapper.map_path(&path.points);
    let mapping = StageDiagnostics {
        duration: clock.elapsed(&start),
        metrics: StageMetrics::Mapping {
            point_count: track.len(),
        },
    };

    let summary = PipelineSummary {
        image_width: dimensions.width,
        image_height: dimensions.height,
        mask_pixels,
        track_points: track.len(),
        closed: path.closed,
    };
    let diagnostics = PipelineDiagnostics {
        threshold,
        erosion,
        tracing: tracing_stage,
        mapping,
        total_duration: clock.elapsed(&run_start),
        summary,
    };

    Ok((
        ExtractionResult {
            track,
            path,
            dimensions,
            calibration: config.calibration,
        },
        diagnostics,
    ))
}
