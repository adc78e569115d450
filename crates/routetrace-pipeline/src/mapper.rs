//! Pixel-to-geographic coordinate mapping.
//!
//! The image is assumed to cover an axis-aligned geographic bounding
//! box given by a [`Calibration`]. Each axis is mapped linearly:
//!
//! ```text
//! -------> x (longitude)
//! |
//! |
//! v y (latitude)
//! ```
//!
//! `lon = top_left.lon + step_lon * x` and
//! `lat = top_left.lat + step_lat * y`, where the steps are the corner
//! deltas divided by the image width and height. This is a plain affine
//! map, not a cartographic projection.

use geo::{AffineTransform, Coord};

use crate::types::{Calibration, Dimensions, GeoPoint, PipelineError, PixelPoint};

/// Affine map from pixel space to geographic space.
///
/// Internally a [`geo::AffineTransform`] over `(x = lon, y = lat)`
/// coordinates with no rotation or shear terms.
#[derive(Debug, Clone, Copy)]
pub struct CoordinateMapper {
    transform: AffineTransform<f64>,
    step_lat: f64,
    step_lon: f64,
}

impl CoordinateMapper {
    /// Build the mapper for an image of `dimensions` pinned to
    /// `calibration`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::DegenerateInput`] if either dimension
    /// is zero.
    pub fn new(dimensions: Dimensions, calibration: Calibration) -> Result<Self, PipelineError> {
        if dimensions.is_degenerate() {
            return Err(PipelineError::DegenerateInput {
                width: dimensions.width,
                height: dimensions.height,
            });
        }

        let Calibration {
            top_left,
            bottom_right,
        } = calibration;
        let step_lon = (bottom_right.lon - top_left.lon) / f64::from(dimensions.width);
        let step_lat = (bottom_right.lat - top_left.lat) / f64::from(dimensions.height);

        Ok(Self {
            transform: AffineTransform::new(step_lon, 0.0, top_left.lon, 0.0, step_lat, top_left.lat),
            step_lat,
            step_lon,
        })
    }

    /// Latitude change per pixel row.
    #[must_use]
    pub const fn step_lat(&self) -> f64 {
        self.step_lat
    }

    /// Longitude change per pixel column.
    #[must_use]
    pub const fn step_lon(&self) -> f64 {
        self.step_lon
    }

    /// Map a single pixel to its geographic position.
    #[must_use]
    pub fn map(&self, point: PixelPoint) -> GeoPoint {
        let mapped = self.transform.apply(Coord {
            x: f64::from(point.x),
            y: f64::from(point.y),
        });
        GeoPoint::new(mapped.y, mapped.x)
    }

    /// Map a path, preserving order and length.
    #[must_use = "returns the mapped geographic track"]
    pub fn map_path(&self, points: &[PixelPoint]) -> Vec<GeoPoint> {
        points.iter().map(|&p| self.map(p)).collect()
    }
}
