//! SVG preview of a traced pixel path.
//!
//! Renders the ordered path in pixel space over a frame the size of the
//! source image, using the [`svg`] crate for document construction, XML
//! escaping, and path data formatting. Overlaying the SVG on the source
//! picture shows at a glance whether the tracer followed the route.
//!
//! The path becomes one `<path>` element (`M` then `L` commands, closed
//! with `z` for circuits) and the start point is marked with a
//! `<circle>`.
//!
//! This is a pure function with no I/O -- it returns a `String`.

use svg::Document;
use svg::node::element::path::Data;
use svg::node::element::{Circle, Description, Element, Path, Title};
use svg::node::{Node, Text, Value};

use routetrace_pipeline::{Dimensions, PixelPoint, TracedPath};

/// Stroke color of the traced path.
const PATH_COLOR: &str = "red";
/// Radius of the start marker in pixels.
const START_MARKER_RADIUS: u32 = 3;

/// Metadata to embed in the SVG document.
///
/// All fields are optional. Text values are XML-escaped automatically
/// by the `svg` crate.
#[derive(Debug, Clone, Default)]
pub struct SvgMetadata<'a> {
    /// Document title, emitted as `<title>`.
    pub title: Option<&'a str>,

    /// Document description, emitted as `<desc>`.
    pub description: Option<&'a str>,

    /// Serialized `TraceConfig` JSON, emitted inside `<metadata>` so the
    /// preview records the settings that produced it.
    pub config_json: Option<&'a str>,
}

/// Build an SVG path `d` attribute from pixel points.
///
/// Returns an empty string for fewer than 2 points. When `closed` is
/// `true` the path ends with a `z` command.
///
/// # Examples
///
/// ```
/// use routetrace_pipeline::PixelPoint;
/// use routetrace_export::svg::build_path_data;
///
/// let points = [PixelPoint::new(10, 20), PixelPoint::new(30, 40)];
/// assert_eq!(build_path_data(&points, false), "M10,20 L30,40");
/// ```
#[must_use]
pub fn build_path_data(points: &[PixelPoint], closed: bool) -> String {
    let [first, rest @ ..] = points else {
        return String::new();
    };
    if rest.is_empty() {
        return String::new();
    }

    let mut data = Data::new().move_to((f64::from(first.x), f64::from(first.y)));
    for p in rest {
        data = data.line_to((f64::from(p.x), f64::from(p.y)));
    }
    if closed {
        data = data.close();
    }
    String::from(Value::from(data))
}

/// Serialize a traced path into an SVG preview string.
///
/// The `viewBox` matches the image in pixels, so the document can be
/// stacked directly over the source picture.
///
/// # Examples
///
/// ```
/// use routetrace_pipeline::{Dimensions, PixelPoint, Termination, TracedPath};
/// use routetrace_export::{SvgMetadata, to_svg};
///
/// let path = TracedPath {
///     points: vec![PixelPoint::new(10, 15), PixelPoint::new(12, 18)],
///     closed: false,
///     steps: 1,
///     termination: Termination::DeadEnd,
/// };
/// let dims = Dimensions { width: 800, height: 600 };
/// let metadata = SvgMetadata {
///     title: Some("route"),
///     ..SvgMetadata::default()
/// };
/// let svg = to_svg(&path, dims, &metadata);
/// assert!(svg.contains("<title>route</title>"));
/// assert!(svg.contains("M10,15 L12,18"));
/// ```
#[must_use]
pub fn to_svg(path: &TracedPath, dimensions: Dimensions, metadata: &SvgMetadata<'_>) -> String {
    let w = dimensions.width;
    let h = dimensions.height;
    let mut doc = Document::new()
        .set("width", w)
        .set("height", h)
        .set("viewBox", (0, 0, w, h));

    if let Some(title) = metadata.title {
        doc = doc.add(Title::new(title));
    }

    if let Some(description) = metadata.description {
        doc = doc.add(Description::new().add(Text::new(description)));
    }

    if let Some(config_json) = metadata.config_json {
        let mut config_el = Element::new("routetrace:config");
        config_el.assign("xmlns:routetrace", "https://routetrace.dev/ns/1");
        config_el.append(Text::new(config_json));
        let mut metadata_el = Element::new("metadata");
        metadata_el.append(config_el);
        doc = doc.add(metadata_el);
    }

    let d = build_path_data(&path.points, path.closed);
    if !d.is_empty() {
        doc = doc.add(
            Path::new()
                .set("d", d)
                .set("fill", "none")
                .set("stroke", PATH_COLOR)
                .set("stroke-width", 1),
        );
    }

    if let Some(start) = path.first() {
        doc = doc.add(
            Circle::new()
                .set("cx", start.x)
                .set("cy", start.y)
                .set("r", START_MARKER_RADIUS)
                .set("fill", PATH_COLOR),
        );
    }

    // The svg crate omits the XML declaration, so we prepend it.
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n{doc}\n")
}
