//! Command-line arguments and their translation into a [`TraceConfig`].

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use routetrace_pipeline::{Calibration, GeoPoint, TraceConfig};

/// Extract a GPS track from a picture of a route map.
///
/// Finds the route by its color, follows it pixel by pixel from the
/// top-most point, and maps the result onto the calibrated geographic
/// bounding box. Without any output flag a GPX file named after the
/// image is written to the current directory.
#[derive(Debug, Parser)]
#[command(name = "routetrace", version)]
pub struct Cli {
    /// Path to the route map picture (PNG, JPEG, BMP, WebP).
    pub image_path: PathBuf,

    /// Write the track as GPX 1.1.
    #[arg(long)]
    pub gpx: Option<PathBuf>,

    /// Write the track as a `latitude,longitude` CSV table.
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Write an SVG preview of the traced pixel path.
    #[arg(long)]
    pub svg: Option<PathBuf>,

    /// Save the trace mask and a point overlay as PNGs in this directory.
    #[arg(long)]
    pub debug_dir: Option<PathBuf>,

    /// Print the per-stage diagnostics report.
    #[arg(long)]
    pub diagnostics: bool,

    /// Print diagnostics as JSON instead of the human-readable report.
    #[arg(long)]
    pub json: bool,

    /// Full trace config as a JSON string.
    ///
    /// When provided, all other trace parameter flags are ignored.
    /// Missing fields fall back to their defaults.
    #[arg(long)]
    pub config_json: Option<String>,

    /// Route color as `R,G,B`.
    #[arg(long, default_value_t = Rgb(TraceConfig::DEFAULT_REFERENCE_COLOR))]
    pub reference_color: Rgb,

    /// Per-channel tolerance around the route color (inclusive).
    #[arg(long, default_value_t = TraceConfig::DEFAULT_BAND)]
    pub band: u8,

    /// Erosion kernel as `WIDTHxHEIGHT`.
    #[arg(long, default_value_t = Kernel(TraceConfig::DEFAULT_EROSION_KERNEL))]
    pub erosion_kernel: Kernel,

    /// Number of erosion passes.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_EROSION_ITERATIONS)]
    pub erosion_iterations: u32,

    /// First ring radius searched around the current point.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_MIN_STEP_RADIUS)]
    pub min_step_radius: u32,

    /// Ring radius at which the search gives up (exclusive).
    #[arg(long, default_value_t = TraceConfig::DEFAULT_MAX_STEP_RADIUS)]
    pub max_step_radius: u32,

    /// Radius growth between rings.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_RADIUS_INCREMENT)]
    pub radius_increment: u32,

    /// Ring width in pixels.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_RING_THICKNESS)]
    pub ring_thickness: u32,

    /// Number of recent points a candidate must keep away from.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_TRAILING_WINDOW)]
    pub trailing_window: usize,

    /// Minimum distance from every recent point, in pixels.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_EXCLUSION_DISTANCE)]
    pub exclusion_distance: f64,

    /// Distance to the start below which the route counts as a circuit.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_LOOP_CLOSURE_DISTANCE)]
    pub loop_closure_distance: f64,

    /// Hard cap on tracing steps.
    #[arg(long, default_value_t = TraceConfig::DEFAULT_MAX_STEPS)]
    pub max_steps: usize,

    /// Geographic position of the image's top-left corner as `LAT,LON`.
    #[arg(long, allow_hyphen_values = true, default_value_t = LatLon(Calibration::DEFAULT_TOP_LEFT))]
    pub top_left: LatLon,

    /// Geographic position of the image's bottom-right corner as `LAT,LON`.
    #[arg(long, allow_hyphen_values = true, default_value_t = LatLon(Calibration::DEFAULT_BOTTOM_RIGHT))]
    pub bottom_right: LatLon,
}

impl Cli {
    /// Whether any explicit output file was requested.
    pub const fn has_output(&self) -> bool {
        self.gpx.is_some() || self.csv.is_some() || self.svg.is_some()
    }

    /// Source image file name without extension, used to name outputs.
    pub fn image_stem(&self) -> &str {
        self.image_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("track")
    }

    /// GPX destination: the explicit `--gpx` path, or `<stem>.gpx` in the
    /// current directory when no output flag was given at all.
    pub fn gpx_path(&self) -> Option<PathBuf> {
        if self.has_output() {
            self.gpx.clone()
        } else {
            Some(PathBuf::from(format!("{}.gpx", self.image_stem())))
        }
    }
}

/// Build a [`TraceConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and all
/// individual parameter flags are ignored. `--debug-dir` always turns
/// visualization on.
pub fn config_from_cli(cli: &Cli) -> Result<TraceConfig, String> {
    let mut config = if let Some(ref json) = cli.config_json {
        serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"))?
    } else {
        TraceConfig {
            reference_color: cli.reference_color.0,
            band: cli.band,
            erosion_kernel: cli.erosion_kernel.0,
            erosion_iterations: cli.erosion_iterations,
            min_step_radius: cli.min_step_radius,
            max_step_radius: cli.max_step_radius,
            radius_increment: cli.radius_increment,
            ring_thickness: cli.ring_thickness,
            trailing_window: cli.trailing_window,
            exclusion_distance: cli.exclusion_distance,
            loop_closure_distance: cli.loop_closure_distance,
            max_steps: cli.max_steps,
            calibration: Calibration {
                top_left: cli.top_left.0,
                bottom_right: cli.bottom_right.0,
            },
            ..TraceConfig::default()
        }
    };
    if cli.debug_dir.is_some() {
        config.enable_visualization = true;
    }
    Ok(config)
}

/// Split `s` on `sep` into exactly `N` trimmed parts.
fn split_exact<'a, const N: usize>(
    s: &'a str,
    sep: char,
    what: &str,
) -> Result<[&'a str; N], String> {
    let parts: Vec<&str> = s.split(sep).map(str::trim).collect();
    <[&str; N]>::try_from(parts).map_err(|_| format!("expected {what}, got {s:?}"))
}

/// An RGB triple written as `R,G,B`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb(pub [u8; 3]);

impl FromStr for Rgb {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [r, g, b] = split_exact::<3>(s, ',', "R,G,B")?;
        let channel = |c: &str| {
            c.parse::<u8>()
                .map_err(|e| format!("invalid color channel {c:?}: {e}"))
        };
        Ok(Self([channel(r)?, channel(g)?, channel(b)?]))
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b] = self.0;
        write!(f, "{r},{g},{b}")
    }
}

/// A kernel size written as `WIDTHxHEIGHT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kernel(pub (u32, u32));

impl FromStr for Kernel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [w, h] = split_exact::<2>(s, 'x', "WIDTHxHEIGHT")?;
        let axis = |a: &str| {
            a.parse::<u32>()
                .map_err(|e| format!("invalid kernel size {a:?}: {e}"))
        };
        Ok(Self((axis(w)?, axis(h)?)))
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (w, h) = self.0;
        write!(f, "{w}x{h}")
    }
}

/// A geographic position written as `LAT,LON`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LatLon(pub GeoPoint);

impl FromStr for LatLon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let [lat, lon] = split_exact::<2>(s, ',', "LAT,LON")?;
        let coord = |c: &str| {
            c.parse::<f64>()
                .ok()
                .filter(|v| v.is_finite())
                .ok_or_else(|| format!("invalid coordinate {c:?}"))
        };
        Ok(Self(GeoPoint::new(coord(lat)?, coord(lon)?)))
    }
}

impl fmt::Display for LatLon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.0.lat, self.0.lon)
    }
}
