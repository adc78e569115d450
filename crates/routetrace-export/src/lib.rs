//! routetrace-export: Pure track serializers (sans-IO)
//!
//! Converts extracted tracks into output formats. Every serializer
//! returns a `String`; writing it somewhere is the caller's job.
//!
//! - [`csv`]: `latitude,longitude` table, one row per track point
//! - [`gpx`]: GPX 1.1 document with a single track segment
//! - [`svg`]: preview of the traced pixel path over the image frame

pub mod csv;
pub mod gpx;
pub mod svg;

pub use csv::to_csv;
pub use gpx::{GpxMetadata, to_gpx};
pub use svg::{SvgMetadata, to_svg};

/// Escape the five XML special characters.
pub(crate) fn xml_escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            other => out.push(other),
        }
    }
    out
}
