//! Path tracing: order the unordered pixels of a trace mask.
//!
//! The mask carries no connectivity, so the tracer walks it greedily.
//! Starting from the first set pixel in row-major order, each step
//! searches rings of growing radius around the current point and takes
//! the first set pixel that keeps clear of the recently visited points.
//!
//! ```text
//!            ring (radius r, thickness t)
//!          . . . . .
//!        .     ●     .      ● accepted: set, far from the trailing window
//!       .    ◦ ◦      .     ◦ rejected: within exclusion distance of a
//!       .   ◦ ★       .       recent point
//!        .           .      ★ current point
//!          . . . . .
//! ```
//!
//! Starting small and growing the radius lets the walk bridge short
//! gaps in the line (anti-aliasing breaks, labels drawn over the route)
//! without leaping to an unrelated part of the mask when a nearby pixel
//! exists.
//!
//! # Termination
//!
//! Tracing stops when a new point lands within the loop closure
//! distance of the start ([`Termination::Circuit`]), when no ring below
//! the maximum radius yields a candidate ([`Termination::DeadEnd`]), or
//! after `max_steps` steps ([`Termination::StepLimit`]). The radius cap
//! and step cap together bound the work on any mask.
//!
//! Only the fragment reachable from the scan-order start is traced.
//! Disconnected fragments further than the maximum radius are ignored.

use crate::mask::TraceMask;
use crate::types::{PixelPoint, Termination, TraceConfig, TracedPath};

/// Pixels on a ring around `center`, in row-major order.
///
/// A pixel belongs to the ring when its Euclidean distance `d` from
/// `center` satisfies `radius <= d < radius + thickness`. Pixels
/// outside `width × height` are skipped.
#[must_use = "returns an iterator over ring pixels"]
pub fn ring_points(
    center: PixelPoint,
    radius: u32,
    thickness: u32,
    width: u32,
    height: u32,
) -> impl Iterator<Item = PixelPoint> {
    let inner_sq = i64::from(radius).pow(2);
    let outer = i64::from(radius) + i64::from(thickness);
    let outer_sq = outer.pow(2);
    let (cx, cy) = (i64::from(center.x), i64::from(center.y));
    let reach = outer - 1;

    (-reach..=reach).flat_map(move |dy| {
        (-reach..=reach).filter_map(move |dx| {
            let d_sq = dx * dx + dy * dy;
            if d_sq < inner_sq || d_sq >= outer_sq {
                return None;
            }
            let x = u32::try_from(cx + dx).ok().filter(|&x| x < width)?;
            let y = u32::try_from(cy + dy).ok().filter(|&y| y < height)?;
            Some(PixelPoint::new(x, y))
        })
    })
}

/// Greedy ring-search tracer over a [`TraceMask`].
#[derive(Debug, Clone, Copy)]
pub struct PathTracer<'a> {
    mask: &'a TraceMask,
    config: &'a TraceConfig,
}

impl<'a> PathTracer<'a> {
    /// Create a tracer reading `mask` with the search settings from
    /// `config`.
    #[must_use]
    pub const fn new(mask: &'a TraceMask, config: &'a TraceConfig) -> Self {
        Self { mask, config }
    }

    /// Find the next point after `current`.
    ///
    /// `trailing` is the tail of the path so far (including `current`);
    /// a candidate closer than the exclusion distance to any of these
    /// points is skipped. Returns `None` when no ring below the maximum
    /// radius has an acceptable pixel.
    #[must_use]
    pub fn advance(&self, current: PixelPoint, trailing: &[PixelPoint]) -> Option<PixelPoint> {
        let exclusion_sq = self.config.exclusion_distance * self.config.exclusion_distance;
        let step = self.config.radius_increment.max(1);

        let mut radius = self.config.min_step_radius;
        while radius < self.config.max_step_radius {
            let found = ring_points(
                current,
                radius,
                self.config.ring_thickness,
                self.mask.width(),
                self.mask.height(),
            )
            .filter(|&p| self.mask.is_set(p))
            .find(|&p| trailing.iter().all(|&t| p.distance_squared(t) >= exclusion_sq));

            if found.is_some() {
                return found;
            }

            tracing::debug!(x = current.x, y = current.y, radius, "no candidate on ring");
            radius = radius.saturating_add(step);
        }
        None
    }

    /// Trace the mask from its first set pixel.
    ///
    /// Returns `None` if the mask is empty.
    #[must_use = "returns the traced path"]
    pub fn trace(&self) -> Option<TracedPath> {
        let start = self.mask.first_set()?;
        tracing::debug!(x = start.x, y = start.y, "trace start");

        let closure_sq = self.config.loop_closure_distance * self.config.loop_closure_distance;
        let window = self.config.trailing_window.max(1);

        let mut points = vec![start];
        let mut steps = 0;
        let mut current = start;

        let termination = loop {
            if steps >= self.config.max_steps {
                break Termination::StepLimit;
            }

            let tail = &points[points.len().saturating_sub(window)..];
            let Some(next) = self.advance(current, tail) else {
                break Termination::DeadEnd;
            };

            points.push(next);
            steps += 1;
            current = next;

            if next.distance_squared(start) < closure_sq {
                break Termination::Circuit;
            }
        };

        tracing::info!(
            points = points.len(),
            steps,
            ?termination,
            "trace finished"
        );

        Some(TracedPath {
            points,
            closed: termination == Termination::Circuit,
            steps,
            termination,
        })
    }
}

/// Trace `mask` with the settings from `config`.
///
/// Convenience wrapper around [`PathTracer`]. Returns `None` if the
/// mask is empty.
#[must_use = "returns the traced path"]
pub fn trace(mask: &TraceMask, config: &TraceConfig) -> Option<TracedPath> {
    PathTracer::new(mask, config).trace()
}
