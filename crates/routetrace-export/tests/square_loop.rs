//! Integration test: trace a synthetic loop map through the full pipeline and export every format.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use routetrace_export::{GpxMetadata, SvgMetadata, to_csv, to_gpx, to_svg};
use routetrace_pipeline::{TraceConfig, decode_rgb, extract};

/// Encode a square loop of the trace color on a pale background as PNG.
fn square_loop_png(size: u32, margin: u32, thickness: u32) -> Vec<u8> {
    let trace = image::Rgb(TraceConfig::DEFAULT_REFERENCE_COLOR);
    let img = image::RgbImage::from_fn(size, size, |x, y| {
        let outer = (margin..size - margin).contains(&x) && (margin..size - margin).contains(&y);
        let inner_edge = margin + thickness;
        let inner = (inner_edge..size - inner_edge).contains(&x)
            && (inner_edge..size - inner_edge).contains(&y);
        if outer && !inner {
            trace
        } else {
            image::Rgb([245, 242, 235])
        }
    });
    let mut buf = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

#[test]
fn square_loop_pipeline_to_every_format() {
    let bytes = square_loop_png(150, 12, 4);
    let image = decode_rgb(&bytes).unwrap();
    let result = extract(&image, &TraceConfig::default()).expect("pipeline should succeed");

    eprintln!(
        "Traced {} points ({:?}), image {}x{}",
        result.path.len(),
        result.path.termination,
        result.dimensions.width,
        result.dimensions.height,
    );
    assert!(result.path.closed, "a square loop should close");
    assert!(result.track.len() > 10);

    let csv = to_csv(&result.track);
    assert_eq!(csv.lines().next(), Some("latitude,longitude"));
    assert_eq!(csv.lines().count(), result.track.len() + 1);

    let gpx = to_gpx(
        &result.track,
        &GpxMetadata {
            name: Some("square-loop"),
            ..GpxMetadata::default()
        },
    );
    assert_eq!(gpx.matches("<trkpt ").count(), result.track.len());
    assert!(gpx.contains("<name>square-loop</name>"));

    let first = result.track[0];
    assert!(gpx.contains(&format!(r#"<trkpt lat="{}" lon="{}"/>"#, first.lat, first.lon)));

    let svg = to_svg(&result.path, result.dimensions, &SvgMetadata::default());
    assert!(svg.contains("<path"));
    assert!(svg.contains(r#"viewBox="0 0 150 150""#));
}
