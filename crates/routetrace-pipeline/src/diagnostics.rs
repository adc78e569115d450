//! Pipeline diagnostics: timing, counts, and other metrics for each stage.
//!
//! These diagnostics are permanent instrumentation intended for tuning
//! the mask and tracer settings against a new map style. Call
//! [`extract_with_diagnostics`] to collect them alongside the result.
//!
//! Timestamps come from a caller-supplied [`Clock`] so this crate stays
//! free of platform time sources. Durations are serialized as
//! fractional seconds (`f64`) for JSON compatibility, since
//! `std::time::Duration` does not implement serde traits.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::types::{ExtractionResult, PipelineError, RgbImage, Termination, TraceConfig};
use crate::visualize::Visualizer;

/// Source of timestamps for stage timing.
pub trait Clock {
    /// Opaque timestamp type.
    type Instant;

    /// Current timestamp.
    fn now(&self) -> Self::Instant;

    /// Time elapsed since `since`.
    fn elapsed(&self, since: &Self::Instant) -> Duration;
}

/// Clock that always reports zero elapsed time.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullClock;

impl Clock for NullClock {
    type Instant = ();

    fn now(&self) -> Self::Instant {}

    fn elapsed(&self, _since: &Self::Instant) -> Duration {
        Duration::ZERO
    }
}

/// Serde support for `std::time::Duration` as fractional seconds.
mod duration_serde {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a `Duration` as fractional seconds (`f64`).
    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs_f64().serialize(serializer)
    }

    /// Deserialize a `Duration` from fractional seconds (`f64`).
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|_| {
            serde::de::Error::custom(
                "duration seconds must be finite, non-negative, and representable as a Duration",
            )
        })
    }
}

/// Diagnostics collected from a single extraction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineDiagnostics {
    /// Color thresholding.
    pub threshold: StageDiagnostics,
    /// Morphological erosion.
    pub erosion: StageDiagnostics,
    /// Path tracing.
    pub tracing: StageDiagnostics,
    /// Pixel-to-geo mapping.
    pub mapping: StageDiagnostics,
    /// Total wall-clock duration of the entire pipeline (seconds).
    #[serde(with = "duration_serde")]
    pub total_duration: Duration,
    /// Summary counts across all stages.
    pub summary: PipelineSummary,
}

/// Diagnostics for a single pipeline stage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageDiagnostics {
    /// Wall-clock duration of this stage (seconds).
    #[serde(with = "duration_serde")]
    pub duration: Duration,
    /// Stage-specific metrics.
    pub metrics: StageMetrics,
}

/// Stage-specific metrics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StageMetrics {
    /// Color thresholding metrics.
    Threshold {
        /// Reference color (RGB).
        reference_color: [u8; 3],
        /// Per-channel tolerance.
        band: u8,
        /// Pixels inside the color band.
        candidate_pixels: u64,
        /// Total pixel count.
        total_pixels: u64,
    },
    /// Erosion metrics.
    Erosion {
        /// Kernel width and height.
        kernel: (u32, u32),
        /// Number of passes.
        iterations: u32,
        /// Pixels remaining after erosion.
        mask_pixels: u64,
    },
    /// Path tracing metrics.
    Tracing {
        /// Points in the traced path.
        point_count: usize,
        /// Successful steps.
        steps: usize,
        /// Why tracing stopped.
        termination: Termination,
        /// Mean distance between consecutive points in pixels.
        mean_step_length: f64,
    },
    /// Mapping metrics.
    Mapping {
        /// Geographic points produced.
        point_count: usize,
    },
}

/// High-level summary counts for the entire pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSummary {
    /// Source image width in pixels.
    pub image_width: u32,
    /// Source image height in pixels.
    pub image_height: u32,
    /// Pixels in the final mask.
    pub mask_pixels: u64,
    /// Points in the output track.
    pub track_points: usize,
    /// Whether the route closed into a circuit.
    pub closed: bool,
}

impl PipelineDiagnostics {
    /// Format diagnostics as a human-readable report.
    #[must_use]
    pub fn report(&self) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Pipeline Diagnostics Report\n{}", "=".repeat(60)));
        lines.push(format!(
            "Image: {}x{}",
            self.summary.image_width, self.summary.image_height,
        ));
        lines.push(format!(
            "Total duration: {:.3}ms",
            duration_ms(self.total_duration),
        ));
        lines.push(String::new());

        lines.push(format!(
            "{:<24} {:>10} {:>10}  {}",
            "Stage", "Duration", "% Total", "Details"
        ));
        lines.push("-".repeat(80));

        let total_ms = duration_ms(self.total_duration);
        let stages = [
            ("Threshold", &self.threshold),
            ("Erosion", &self.erosion),
            ("Tracing", &self.tracing),
            ("Mapping", &self.mapping),
        ];

        for (name, diag) in stages {
            let ms = duration_ms(diag.duration);
            let pct = if total_ms > 0.0 {
                ms / total_ms * 100.0
            } else {
                0.0
            };
            let details = format_metrics(&diag.metrics);
            lines.push(format!("{name:<24} {ms:>8.3}ms {pct:>9.1}%  {details}"));
        }

        lines.push(String::new());
        lines.push(format!(
            "Mask pixels: {}  |  Track points: {}  |  Circuit: {}",
            self.summary.mask_pixels,
            self.summary.track_points,
            if self.summary.closed { "yes" } else { "no" },
        ));

        lines.join("\n")
    }
}

/// Convert a `Duration` to milliseconds as `f64`.
fn duration_ms(d: Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

/// Format stage metrics into a compact detail string.
fn format_metrics(metrics: &StageMetrics) -> String {
    match metrics {
        StageMetrics::Threshold {
            reference_color: [r, g, b],
            band,
            candidate_pixels,
            total_pixels,
        } => {
            #[allow(clippy::cast_precision_loss)]
            let density = if *total_pixels > 0 {
                *candidate_pixels as f64 / *total_pixels as f64 * 100.0
            } else {
                0.0
            };
            format!("rgb=({r},{g},{b}) ±{band} candidates={candidate_pixels} ({density:.2}%)")
        }
        StageMetrics::Erosion {
            kernel: (w, h),
            iterations,
            mask_pixels,
        } => format!("{w}x{h} x{iterations} remaining={mask_pixels}"),
        StageMetrics::Tracing {
            point_count,
            steps,
            termination,
            mean_step_length,
        } => format!(
            "{point_count} pts, {steps} steps, {termination:?}, mean step {mean_step_length:.2}px",
        ),
        StageMetrics::Mapping { point_count } => format!("{point_count} geo points"),
    }
}

/// Mean distance between consecutive points, or zero for fewer than two.
pub(crate) fn mean_step_length(points: &[crate::PixelPoint]) -> f64 {
    let total: f64 = points.windows(2).map(|w| w[0].distance(w[1])).sum();
    #[allow(clippy::cast_precision_loss)]
    let steps = points.len().saturating_sub(1) as f64;
    if steps > 0.0 { total / steps } else { 0.0 }
}

/// Run the extraction pipeline, timing each stage with `clock`.
///
/// Behaves exactly like [`crate::extract_with`]; the diagnostics are
/// collected on the side.
///
/// # Errors
///
/// Same as [`crate::extract_with`].
pub fn extract_with_diagnostics<C: Clock>(
    image: &RgbImage,
    config: &TraceConfig,
    visualizer: &mut dyn Visualizer,
    clock: &C,
) -> Result<(ExtractionResult, PipelineDiagnostics), PipelineError> {
    crate::pipeline::run(image, config, visualizer, clock)
}
