//! routetrace: extract a GPS track from a picture of a route map.
//!
//! Reads the image, runs the extraction pipeline, and writes the
//! requested track files. Logging goes to stderr through `tracing`
//! (`RUST_LOG` overrides the default `info` level); diagnostics and
//! JSON go to stdout.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin routetrace -- [OPTIONS] <IMAGE_PATH>
//! ```

#![allow(clippy::print_stdout)]

mod cli;
mod debug;

use std::path::Path;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use routetrace_export::{GpxMetadata, SvgMetadata};
use routetrace_pipeline::diagnostics::{Clock, extract_with_diagnostics};
use routetrace_pipeline::{NoVisualizer, Visualizer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::{Cli, config_from_cli};
use crate::debug::DebugWriter;

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            tracing::error!("{msg}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), String> {
    let config = config_from_cli(cli)?;
    tracing::debug!(?config, "trace config");

    let image_bytes = std::fs::read(&cli.image_path)
        .map_err(|e| format!("Error reading {}: {e}", cli.image_path.display()))?;
    tracing::info!(
        image = %cli.image_path.display(),
        bytes = image_bytes.len(),
        "loaded image"
    );

    let image = routetrace_pipeline::decode_rgb(&image_bytes)
        .map_err(|e| format!("Error decoding {}: {e}", cli.image_path.display()))?;

    let stem = cli.image_stem();
    let mut visualizer: Box<dyn Visualizer> = match cli.debug_dir {
        Some(ref dir) => {
            std::fs::create_dir_all(dir)
                .map_err(|e| format!("Error creating {}: {e}", dir.display()))?;
            Box::new(DebugWriter::new(dir, stem))
        }
        None => Box::new(NoVisualizer),
    };

    let (result, diagnostics) =
        extract_with_diagnostics(&image, &config, visualizer.as_mut(), &StdClock)
            .map_err(|e| format!("Pipeline error: {e}"))?;

    tracing::info!(
        points = result.track.len(),
        closed = result.path.closed,
        termination = ?result.path.termination,
        "route traced"
    );

    if cli.json {
        let json = serde_json::to_string_pretty(&diagnostics)
            .map_err(|e| format!("Error serializing diagnostics: {e}"))?;
        println!("{json}");
    } else if cli.diagnostics {
        println!("{}", diagnostics.report());
    }

    let description = format!(
        "Traced from {} ({}x{})",
        cli.image_path.display(),
        result.dimensions.width,
        result.dimensions.height,
    );

    if let Some(gpx_path) = cli.gpx_path() {
        let gpx = routetrace_export::to_gpx(
            &result.track,
            &GpxMetadata {
                name: Some(stem),
                description: Some(&description),
                time: None,
            },
        );
        write_output(&gpx_path, &gpx, "GPX")?;
    }

    if let Some(ref csv_path) = cli.csv {
        write_output(csv_path, &routetrace_export::to_csv(&result.track), "CSV")?;
    }

    if let Some(ref svg_path) = cli.svg {
        let config_json = serde_json::to_string(&config)
            .map_err(|e| format!("Error serializing config: {e}"))?;
        let svg = routetrace_export::to_svg(
            &result.path,
            result.dimensions,
            &SvgMetadata {
                title: Some(stem),
                description: Some(&description),
                config_json: Some(&config_json),
            },
        );
        write_output(svg_path, &svg, "SVG")?;
    }

    Ok(())
}

/// Write `contents` to `path`, logging the result.
fn write_output(path: &Path, contents: &str, kind: &str) -> Result<(), String> {
    std::fs::write(path, contents)
        .map_err(|e| format!("Error writing {kind} to {}: {e}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = contents.len(), "{kind} written");
    Ok(())
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}
