//! Trip progress, derived from elapsed time alone.
//!
//! [`TripState::advance`] never looks at where the vehicle was on the previous
//! tick. It recomputes the travelled distance from the start timestamp, so a
//! late or skipped tick can't make the vehicle drift.

use geo::Point;
use tokio::time::Instant;
use trip_route::{AnnotatedRoute, Heading, RoutePoint, SphericalGeometry};

use crate::settings::{ICON_HEADING_OFFSET, VELOCITY};

/// Where an elapsed distance falls on an annotated route.
#[derive(Clone, Debug, PartialEq)]
pub enum Location<'a> {
    /// No point is behind the vehicle yet, so there is nothing to interpolate from.
    NotStarted,
    /// `from` is the last point behind the vehicle, `to` the first one ahead.
    Between {
        behind: Vec<&'a RoutePoint>,
        from: &'a RoutePoint,
        to: &'a RoutePoint,
        fraction: f64,
    },
    /// No point lies further than the elapsed distance: the trip is over.
    Beyond { behind: Vec<&'a RoutePoint> },
}

/// Split `route` around `elapsed` meters.
///
/// `behind` is every annotated point whose distance is strictly smaller than
/// `elapsed`, in route order. The point ahead is the first one whose distance
/// is strictly larger. A point sitting exactly at `elapsed` is neither.
pub fn locate(route: &AnnotatedRoute, elapsed: f64) -> Location<'_> {
    let behind: Vec<&RoutePoint> = route
        .points()
        .iter()
        .filter(|p| p.is_before(elapsed))
        .collect();

    let Some(to) = route.points().iter().find(|p| p.is_after(elapsed)) else {
        return Location::Beyond { behind };
    };
    let Some(&from) = behind.last() else {
        return Location::NotStarted;
    };

    let (Some(start), Some(end)) = (from.distance, to.distance) else {
        return Location::NotStarted;
    };
    let fraction = (elapsed - start) / (end - start);

    Location::Between {
        behind,
        from,
        to,
        fraction,
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Phase {
    #[default]
    Idle,
    Running,
    Completed,
}

/// Everything the map needs to draw one frame of a trip.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TripState {
    started_at: Option<Instant>,
    phase: Phase,
    progress: Vec<Point>,
    position: Option<Point>,
    heading: Option<Heading>,
}

impl TripState {
    /// A fresh run starting at `at`, with no progress yet.
    pub fn started(at: Instant) -> Self {
        Self {
            started_at: Some(at),
            phase: Phase::Running,
            ..Self::default()
        }
    }

    pub fn started_at(&self) -> Option<Instant> {
        self.started_at
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    /// The same frame with its timer gone: a running trip becomes idle and
    /// keeps the progress it had. Other phases are returned unchanged.
    pub fn halted(&self) -> TripState {
        if !self.is_running() {
            return self.clone();
        }
        TripState {
            phase: Phase::Idle,
            ..self.clone()
        }
    }

    /// Travelled route prefix; ends at the interpolated position while running.
    pub fn progress(&self) -> &[Point] {
        &self.progress
    }

    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn heading(&self) -> Option<Heading> {
        self.heading
    }

    /// Rotation to apply to the vehicle icon, in degrees.
    pub fn icon_rotation(&self) -> Option<f64> {
        self.heading.map(|h| h.offset_by(ICON_HEADING_OFFSET))
    }

    /// Meters travelled by `now`, or `None` before the trip has started.
    pub fn elapsed_distance(&self, now: Instant) -> Option<f64> {
        let started_at = self.started_at?;
        Some(now.saturating_duration_since(started_at).as_secs_f64() * VELOCITY)
    }

    /// Compute the state at `now`. Idle and completed states are returned unchanged.
    pub fn advance(
        &self,
        route: &AnnotatedRoute,
        geometry: &dyn SphericalGeometry,
        now: Instant,
    ) -> TripState {
        if !self.is_running() {
            return self.clone();
        }
        let Some(elapsed) = self.elapsed_distance(now).filter(|d| *d > 0.0) else {
            return self.clone();
        };

        match locate(route, elapsed) {
            Location::NotStarted => self.clone(),

            Location::Beyond { behind } => {
                let progress: Vec<Point> = behind.iter().map(|p| p.location).collect();
                let heading = match progress.as_slice() {
                    [.., a, b] => Some(geometry.heading(*a, *b)),
                    _ => None,
                };
                tracing::info!(route = %route.id(), elapsed, "trip completed");

                TripState {
                    started_at: self.started_at,
                    phase: Phase::Completed,
                    position: progress.last().copied(),
                    progress,
                    heading,
                }
            }

            Location::Between {
                behind,
                from,
                to,
                fraction,
            } => {
                let position = geometry.interpolate(from.location, to.location, fraction);
                let heading = geometry.heading(from.location, to.location);
                tracing::trace!(elapsed, fraction, "vehicle between points");

                let mut progress: Vec<Point> = behind.iter().map(|p| p.location).collect();
                progress.push(position);

                TripState {
                    started_at: self.started_at,
                    phase: Phase::Running,
                    progress,
                    position: Some(position),
                    heading: Some(heading),
                }
            }
        }
    }
}
