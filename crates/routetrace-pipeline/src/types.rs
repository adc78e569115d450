//! Shared types for the routetrace extraction pipeline.

use serde::{Deserialize, Serialize};

/// Re-export `GrayImage` so downstream crates can reference the
/// binary mask raster without depending on `image` directly.
pub use image::GrayImage;

/// Re-export `RgbImage` so downstream crates can hand decoded images
/// to the pipeline without depending on `image` directly.
pub use image::RgbImage;

/// An integer pixel position in image coordinates.
///
/// `x` grows to the right (longitude), `y` grows downward (latitude
/// decreasing for a north-up map).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PixelPoint {
    /// Column, pixels from the left edge.
    pub x: u32,
    /// Row, pixels from the top edge.
    pub y: u32,
}

impl PixelPoint {
    /// Create a new pixel point.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Squared Euclidean distance to another point.
    ///
    /// Exact in `f64` for any pair of `u32` coordinates that fit in an
    /// image, so comparisons against squared thresholds are lossless.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let dx = f64::from(self.x) - f64::from(other.x);
        let dy = f64::from(self.y) - f64::from(other.y);
        dx.mul_add(dx, dy * dy)
    }

    /// Euclidean distance to another point.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }
}

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new geographic point.
    #[must_use]
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Geographic bounding box of the source image.
///
/// The two corners pin the image to the map: pixel `(0, 0)` is
/// `top_left` and pixel `(width, height)` is `bottom_right`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Geographic position of the image's top-left corner.
    pub top_left: GeoPoint,
    /// Geographic position of the image's bottom-right corner.
    pub bottom_right: GeoPoint,
}

impl Calibration {
    /// Top-left corner of the bundled sample map.
    pub const DEFAULT_TOP_LEFT: GeoPoint = GeoPoint::new(47.16878, -1.535);
    /// Bottom-right corner of the bundled sample map.
    pub const DEFAULT_BOTTOM_RIGHT: GeoPoint = GeoPoint::new(47.0471, -1.2264);
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            top_left: Self::DEFAULT_TOP_LEFT,
            bottom_right: Self::DEFAULT_BOTTOM_RIGHT,
        }
    }
}

/// Image dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Returns `true` if either axis is zero.
    #[must_use]
    pub const fn is_degenerate(self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Why the path tracer stopped.
///
/// None of these is an error: a route may be open (dead end), closed
/// (circuit), or long enough to hit the step cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Termination {
    /// The newest point came back within the loop closure distance of
    /// the first point.
    Circuit,
    /// No acceptable mask pixel was found within the maximum radius.
    DeadEnd,
    /// The step cap was reached.
    StepLimit,
}

/// An ordered pixel path produced by the tracer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TracedPath {
    /// Ordered points; the first is the first mask pixel in row-major
    /// order.
    pub points: Vec<PixelPoint>,
    /// Whether the trace closed back onto its start.
    pub closed: bool,
    /// Number of successful steps (always `points.len() - 1`).
    pub steps: usize,
    /// Why tracing stopped.
    pub termination: Termination,
}

impl TracedPath {
    /// Number of points in the path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns `true` if the path has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Returns the first point, if any.
    #[must_use]
    pub fn first(&self) -> Option<&PixelPoint> {
        self.points.first()
    }

    /// Returns the last point, if any.
    #[must_use]
    pub fn last(&self) -> Option<&PixelPoint> {
        self.points.last()
    }
}

/// Configuration for the extraction pipeline.
///
/// Every field defaults to the value the tracer was tuned with on the
/// sample map, so `TraceConfig::default()` reproduces those results.
///
/// Call [`validate`](Self::validate) (the pipeline does this itself)
/// to reject combinations that would make the search degenerate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Reference trace color as RGB.
    pub reference_color: [u8; 3],

    /// Per-channel tolerance around `reference_color`, inclusive.
    pub band: u8,

    /// Erosion structuring element as `(width, height)`.
    pub erosion_kernel: (u32, u32),

    /// Number of erosion passes. Zero disables erosion.
    pub erosion_iterations: u32,

    /// First ring radius searched around the current point.
    pub min_step_radius: u32,

    /// Ring radii must stay strictly below this value.
    pub max_step_radius: u32,

    /// Radius growth between rings.
    pub radius_increment: u32,

    /// Radial width of each search ring in pixels.
    pub ring_thickness: u32,

    /// Number of most recent path points a candidate must keep clear of.
    pub trailing_window: usize,

    /// Minimum distance from every trailing-window point for a
    /// candidate to be accepted.
    pub exclusion_distance: f64,

    /// A new point closer than this to the first point closes the
    /// circuit.
    pub loop_closure_distance: f64,

    /// Hard cap on successful tracer steps.
    pub max_steps: usize,

    /// Geographic corners of the image.
    pub calibration: Calibration,

    /// Whether the pipeline calls its visualizer.
    pub enable_visualization: bool,
}

impl TraceConfig {
    /// Default reference color: RGB `(74, 70, 241)` (BGR `(241, 70, 74)`).
    pub const DEFAULT_REFERENCE_COLOR: [u8; 3] = [74, 70, 241];
    /// Default per-channel tolerance.
    pub const DEFAULT_BAND: u8 = 50;
    /// Default erosion kernel.
    pub const DEFAULT_EROSION_KERNEL: (u32, u32) = (2, 2);
    /// Largest erosion kernel axis the morphology backend accepts.
    pub const MAX_EROSION_KERNEL: u32 = 511;
    /// Default erosion pass count.
    pub const DEFAULT_EROSION_ITERATIONS: u32 = 1;
    /// Default first search radius.
    pub const DEFAULT_MIN_STEP_RADIUS: u32 = 5;
    /// Default exclusive radius cap.
    pub const DEFAULT_MAX_STEP_RADIUS: u32 = 50;
    /// Default radius increment.
    pub const DEFAULT_RADIUS_INCREMENT: u32 = 5;
    /// Default ring thickness.
    pub const DEFAULT_RING_THICKNESS: u32 = 2;
    /// Default trailing window length.
    pub const DEFAULT_TRAILING_WINDOW: usize = 20;
    /// Default exclusion distance.
    pub const DEFAULT_EXCLUSION_DISTANCE: f64 = 5.0;
    /// Default loop closure distance.
    pub const DEFAULT_LOOP_CLOSURE_DISTANCE: f64 = 5.0;
    /// Default step cap.
    pub const DEFAULT_MAX_STEPS: usize = 2000;

    /// Check the configuration for values the tracer cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] describing the first
    /// offending field.
    pub fn validate(&self) -> Result<(), PipelineError> {
        if self.radius_increment == 0 {
            return Err(PipelineError::InvalidConfig(
                "radius_increment must be at least 1".to_string(),
            ));
        }
        if self.ring_thickness == 0 {
            return Err(PipelineError::InvalidConfig(
                "ring_thickness must be at least 1".to_string(),
            ));
        }
        if self.min_step_radius > self.max_step_radius {
            return Err(PipelineError::InvalidConfig(format!(
                "min_step_radius ({}) exceeds max_step_radius ({})",
                self.min_step_radius, self.max_step_radius,
            )));
        }
        if self.erosion_kernel.0 == 0 || self.erosion_kernel.1 == 0 {
            return Err(PipelineError::InvalidConfig(format!(
                "erosion_kernel must be non-empty, got {}x{}",
                self.erosion_kernel.0, self.erosion_kernel.1,
            )));
        }
        if self.erosion_kernel.0 > Self::MAX_EROSION_KERNEL
            || self.erosion_kernel.1 > Self::MAX_EROSION_KERNEL
        {
            return Err(PipelineError::InvalidConfig(format!(
                "erosion_kernel axes must be at most {}, got {}x{}",
                Self::MAX_EROSION_KERNEL,
                self.erosion_kernel.0,
                self.erosion_kernel.1,
            )));
        }
        if self.trailing_window == 0 {
            return Err(PipelineError::InvalidConfig(
                "trailing_window must be at least 1".to_string(),
            ));
        }
        for (name, value) in [
            ("exclusion_distance", self.exclusion_distance),
            ("loop_closure_distance", self.loop_closure_distance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(PipelineError::InvalidConfig(format!(
                    "{name} must be finite and non-negative, got {value}"
                )));
            }
        }
        Ok(())
    }
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            reference_color: Self::DEFAULT_REFERENCE_COLOR,
            band: Self::DEFAULT_BAND,
            erosion_kernel: Self::DEFAULT_EROSION_KERNEL,
            erosion_iterations: Self::DEFAULT_EROSION_ITERATIONS,
            min_step_radius: Self::DEFAULT_MIN_STEP_RADIUS,
            max_step_radius: Self::DEFAULT_MAX_STEP_RADIUS,
            radius_increment: Self::DEFAULT_RADIUS_INCREMENT,
            ring_thickness: Self::DEFAULT_RING_THICKNESS,
            trailing_window: Self::DEFAULT_TRAILING_WINDOW,
            exclusion_distance: Self::DEFAULT_EXCLUSION_DISTANCE,
            loop_closure_distance: Self::DEFAULT_LOOP_CLOSURE_DISTANCE,
            max_steps: Self::DEFAULT_MAX_STEPS,
            calibration: Calibration::default(),
            enable_visualization: false,
        }
    }
}

/// Result of a full extraction run.
///
/// Carries the geographic track for the track writer plus the pixel
/// path and dimensions for previews.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Ordered geographic track, one point per traced pixel.
    pub track: Vec<GeoPoint>,
    /// The traced pixel path the track was mapped from.
    pub path: TracedPath,
    /// Dimensions of the source image in pixels.
    pub dimensions: Dimensions,
    /// Calibration used for the pixel-to-geo mapping.
    pub calibration: Calibration,
}

/// Errors that can occur during extraction.
///
/// Uses custom `Serialize`/`Deserialize` because `image::ImageError`
/// does not implement serde traits. The `ImageDecode` variant is
/// serialized as its `Display` string.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Failed to decode the input image.
    #[error("failed to decode image: {0}")]
    ImageDecode(#[from] image::ImageError),

    /// The input image bytes were empty.
    #[error("input image data is empty")]
    EmptyInput,

    /// The image has a zero-length axis.
    #[error("image has degenerate dimensions {width}x{height}")]
    DegenerateInput {
        /// Image width in pixels.
        width: u32,
        /// Image height in pixels.
        height: u32,
    },

    /// Pipeline configuration is invalid.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    /// No pixel matched the reference color after erosion.
    #[error("no trace-colored pixels found in the image")]
    EmptyMask,
}

/// Serde-compatible proxy for `PipelineError`.
///
/// `image::ImageError` does not implement serde, so the `ImageDecode`
/// variant stores its `Display` string instead.
#[derive(Serialize, Deserialize)]
enum PipelineErrorProxy {
    ImageDecode(String),
    EmptyInput,
    DegenerateInput { width: u32, height: u32 },
    InvalidConfig(String),
    EmptyMask,
}

impl Serialize for PipelineError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let proxy = match self {
            Self::ImageDecode(e) => PipelineErrorProxy::ImageDecode(e.to_string()),
            Self::EmptyInput => PipelineErrorProxy::EmptyInput,
            Self::DegenerateInput { width, height } => PipelineErrorProxy::DegenerateInput {
                width: *width,
                height: *height,
            },
            Self::InvalidConfig(s) => PipelineErrorProxy::InvalidConfig(s.clone()),
            Self::EmptyMask => PipelineErrorProxy::EmptyMask,
        };
        proxy.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for PipelineError {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let proxy = PipelineErrorProxy::deserialize(deserializer)?;
        Ok(match proxy {
            // An image::ImageError cannot be rebuilt; keep the message.
            PipelineErrorProxy::ImageDecode(msg) => {
                Self::InvalidConfig(format!("image decode error: {msg}"))
            }
            PipelineErrorProxy::EmptyInput => Self::EmptyInput,
            PipelineErrorProxy::DegenerateInput { width, height } => {
                Self::DegenerateInput { width, height }
            }
            PipelineErrorProxy::InvalidConfig(s) => Self::InvalidConfig(s),
            PipelineErrorProxy::EmptyMask => Self::EmptyMask,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    // --- PixelPoint tests ---

    #[test]
    fn pixel_point_distance_squared() {
        let a = PixelPoint::new(0, 0);
        let b = PixelPoint::new(3, 4);
        assert!((a.distance_squared(b) - 25.0).abs() < f64::EPSILON);
    }

    #[test]
    fn pixel_point_distance_is_symmetric() {
        let a = PixelPoint::new(10, 2);
        let b = PixelPoint::new(4, 10);
        assert!((a.distance(b) - 10.0).abs() < f64::EPSILON);
        assert!((b.distance(a) - 10.0).abs() < f64::EPSILON);
    }

    // --- Dimensions tests ---

    #[test]
    fn zero_axis_is_degenerate() {
        assert!(Dimensions { width: 0, height: 5 }.is_degenerate());
        assert!(Dimensions { width: 5, height: 0 }.is_degenerate());
        assert!(!Dimensions { width: 1, height: 1 }.is_degenerate());
    }

    // --- TraceConfig tests ---

    #[test]
    fn default_config_is_valid() {
        assert!(TraceConfig::default().validate().is_ok());
    }

    #[test]
    fn default_config_matches_constants() {
        let config = TraceConfig::default();
        assert_eq!(config.reference_color, [74, 70, 241]);
        assert_eq!(config.band, 50);
        assert_eq!(config.erosion_kernel, (2, 2));
        assert_eq!(config.min_step_radius, 5);
        assert_eq!(config.max_step_radius, 50);
        assert_eq!(config.radius_increment, 5);
        assert_eq!(config.trailing_window, 20);
        assert_eq!(config.max_steps, 2000);
        assert!(!config.enable_visualization);
    }

    #[test]
    fn zero_radius_increment_is_rejected() {
        let config = TraceConfig {
            radius_increment: 0,
            ..TraceConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn inverted_radius_range_is_rejected() {
        let config = TraceConfig {
            min_step_radius: 60,
            ..TraceConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn oversized_erosion_kernel_is_rejected() {
        let config = TraceConfig {
            erosion_kernel: (2, TraceConfig::MAX_EROSION_KERNEL + 1),
            ..TraceConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
        let config = TraceConfig {
            erosion_kernel: (TraceConfig::MAX_EROSION_KERNEL, 1),
            ..TraceConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_erosion_kernel_is_rejected() {
        let config = TraceConfig {
            erosion_kernel: (0, 2),
            ..TraceConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn nan_exclusion_distance_is_rejected() {
        let config = TraceConfig {
            exclusion_distance: f64::NAN,
            ..TraceConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PipelineError::InvalidConfig(_))
        ));
    }

    #[test]
    fn config_json_round_trip() {
        let config = TraceConfig {
            band: 30,
            enable_visualization: true,
            ..TraceConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: TraceConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }

    #[test]
    fn partial_config_json_fills_defaults() {
        let config: TraceConfig = serde_json::from_str(r#"{"band": 20}"#).unwrap();
        assert_eq!(config.band, 20);
        assert_eq!(config.max_steps, TraceConfig::DEFAULT_MAX_STEPS);
        assert_eq!(config.calibration, Calibration::default());
    }

    // --- PipelineError tests ---

    #[test]
    fn error_serde_round_trip_keeps_variant() {
        let err = PipelineError::DegenerateInput {
            width: 0,
            height: 12,
        };
        let json = serde_json::to_string(&err).unwrap();
        let back: PipelineError = serde_json::from_str(&json).unwrap();
        assert!(matches!(
            back,
            PipelineError::DegenerateInput {
                width: 0,
                height: 12
            }
        ));
    }

    #[test]
    fn empty_mask_error_message() {
        assert_eq!(
            PipelineError::EmptyMask.to_string(),
            "no trace-colored pixels found in the image"
        );
    }
}
