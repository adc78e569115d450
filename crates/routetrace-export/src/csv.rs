//! CSV export.
//!
//! Writes a header line `latitude,longitude` followed by one row per
//! track point, in track order. Values use the shortest decimal form
//! that round-trips to the same `f64`.

use std::fmt::Write;

use routetrace_pipeline::GeoPoint;

/// Column header line, without the trailing newline.
pub const HEADER: &str = "latitude,longitude";

/// Serialize a track into CSV text.
///
/// An empty track produces just the header line.
///
/// # Examples
///
/// ```
/// use routetrace_pipeline::GeoPoint;
/// use routetrace_export::to_csv;
///
/// let csv = to_csv(&[GeoPoint::new(47.1, -1.5), GeoPoint::new(47.2, -1.25)]);
/// assert_eq!(csv, "latitude,longitude\n47.1,-1.5\n47.2,-1.25\n");
/// ```
#[must_use]
pub fn to_csv(track: &[GeoPoint]) -> String {
    let mut out = String::with_capacity(HEADER.len() + 1 + track.len() * 40);
    let _ = writeln!(out, "{HEADER}");
    for point in track {
        let _ = writeln!(out, "{},{}", point.lat, point.lon);
    }
    out
}
