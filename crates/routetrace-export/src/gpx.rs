//! GPX 1.1 export.
//!
//! Produces a single `<trk>` with one `<trkseg>` holding the track
//! points in order. Elevation and per-point timestamps are not known
//! from a picture and are omitted. A closed circuit is written as-is;
//! the first point is not repeated at the end.

use std::fmt::Write;

use routetrace_pipeline::GeoPoint;

use crate::xml_escape;

/// `creator` attribute of the `<gpx>` root element.
pub const CREATOR: &str = "routetrace";

/// Optional descriptive fields for the GPX document.
#[derive(Debug, Clone, Default)]
pub struct GpxMetadata<'a> {
    /// Track name, typically the source image's file stem.
    pub name: Option<&'a str>,

    /// Free-form description, emitted as `<desc>` on the track.
    pub description: Option<&'a str>,

    /// ISO 8601 export timestamp, emitted as `<metadata><time>`.
    pub time: Option<&'a str>,
}

/// Serialize a track into a GPX 1.1 document.
///
/// Coordinates are written with full `f64` precision.
///
/// # Examples
///
/// ```
/// use routetrace_pipeline::GeoPoint;
/// use routetrace_export::{GpxMetadata, to_gpx};
///
/// let metadata = GpxMetadata {
///     name: Some("loop"),
///     ..GpxMetadata::default()
/// };
/// let gpx = to_gpx(&[GeoPoint::new(47.1, -1.5)], &metadata);
/// assert!(gpx.contains("<name>loop</name>"));
/// assert!(gpx.contains(r#"<trkpt lat="47.1" lon="-1.5"/>"#));
/// ```
#[must_use]
pub fn to_gpx(track: &[GeoPoint], metadata: &GpxMetadata<'_>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    let _ = writeln!(
        out,
        r#"<gpx version="1.1" creator="{CREATOR}" xmlns="http://www.topografix.com/GPX/1/1" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance" xsi:schemaLocation="http://www.topografix.com/GPX/1/1 http://www.topografix.com/GPX/1/1/gpx.xsd">"#
    );

    if let Some(time) = metadata.time {
        let _ = writeln!(out, "  <metadata>");
        let _ = writeln!(out, "    <time>{}</time>", xml_escape(time));
        let _ = writeln!(out, "  </metadata>");
    }

    let _ = writeln!(out, "  <trk>");
    if let Some(name) = metadata.name {
        let _ = writeln!(out, "    <name>{}</name>", xml_escape(name));
    }
    if let Some(description) = metadata.description {
        let _ = writeln!(out, "    <desc>{}</desc>", xml_escape(description));
    }
    let _ = writeln!(out, "    <trkseg>");
    for point in track {
        let _ = writeln!(
            out,
            r#"      <trkpt lat="{}" lon="{}"/>"#,
            point.lat, point.lon
        );
    }
    let _ = writeln!(out, "    </trkseg>");
    let _ = writeln!(out, "  </trk>");
    let _ = writeln!(out, "</gpx>");

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track() -> Vec<GeoPoint> {
        vec![
            GeoPoint::new(47.16878, -1.535),
            GeoPoint::new(47.15, -1.5),
            GeoPoint::new(47.12, -1.45),
        ]
    }

    #[test]
    fn document_structure() {
        let gpx = to_gpx(&track(), &GpxMetadata::default());
        assert!(gpx.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
        assert!(gpx.contains(r#"<gpx version="1.1" creator="routetrace""#));
        assert!(gpx.contains("<trk>"));
        assert!(gpx.contains("<trkseg>"));
        assert!(gpx.trim_end().ends_with("</gpx>"));
    }

    #[test]
    fn one_trkpt_per_point_in_order() {
        let gpx = to_gpx(&track(), &GpxMetadata::default());
        let points: Vec<&str> = gpx
            .lines()
            .map(str::trim)
            .filter(|l| l.starts_with("<trkpt"))
            .collect();
        assert_eq!(
            points,
            [
                r#"<trkpt lat="47.16878" lon="-1.535"/>"#,
                r#"<trkpt lat="47.15" lon="-1.5"/>"#,
                r#"<trkpt lat="47.12" lon="-1.45"/>"#,
            ]
        );
    }

    #[test]
    fn empty_track_has_empty_segment() {
        let gpx = to_gpx(&[], &GpxMetadata::default());
        assert!(gpx.contains("<trkseg>"));
        assert!(!gpx.contains("<trkpt"));
    }

    #[test]
    fn metadata_is_optional() {
        let gpx = to_gpx(&track(), &GpxMetadata::default());
        assert!(!gpx.contains("<metadata>"));
        assert!(!gpx.contains("<name>"));
        assert!(!gpx.contains("<desc>"));
    }

    #[test]
    fn metadata_is_escaped() {
        let metadata = GpxMetadata {
            name: Some("Loire & <Erdre>"),
            description: Some("traced \"fast\""),
            time: Some("2026-10-17T08:00:00Z"),
        };
        let gpx = to_gpx(&track(), &metadata);
        assert!(gpx.contains("<name>Loire &amp; &lt;Erdre&gt;</name>"));
        assert!(gpx.contains("<desc>traced &quot;fast&quot;</desc>"));
        assert!(gpx.contains("<time>2026-10-17T08:00:00Z</time>"));
    }
}
