//! Core data types for routes and stops.

use geo::Point;

use crate::identifiers::StopIdentifier;

// ============================================================================
// Data Structures
// ============================================================================

/// A single vertex of a route, in travel order.
///
/// `location` uses `x = longitude`, `y = latitude`. `distance` is meters from
/// the route's first point and stays `None` until the route is annotated.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoutePoint {
    pub location: Point,
    pub distance: Option<f64>,
}

impl RoutePoint {
    pub fn new(location: Point) -> Self {
        Self {
            location,
            distance: None,
        }
    }

    pub fn with_distance(location: Point, distance: f64) -> Self {
        Self {
            location,
            distance: Some(distance),
        }
    }

    pub fn lat(&self) -> f64 {
        self.location.y()
    }

    pub fn lng(&self) -> f64 {
        self.location.x()
    }

    /// Strictly closer to the origin than `distance`. Unannotated points never are.
    pub fn is_before(&self, distance: f64) -> bool {
        self.distance.is_some_and(|d| d < distance)
    }

    /// Strictly further from the origin than `distance`. Unannotated points never are.
    pub fn is_after(&self, distance: f64) -> bool {
        self.distance.is_some_and(|d| d > distance)
    }
}

/// A labelled stop shown alongside the route. Stops carry no timing.
#[derive(Clone, Debug, PartialEq)]
pub struct Stop {
    pub id: StopIdentifier,
    pub location: Point,
}

impl Stop {
    pub fn new(id: impl Into<StopIdentifier>, location: Point) -> Self {
        Self {
            id: id.into(),
            location,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Malformed JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid coordinate at index {index}: lat={lat}, lng={lng}")]
    InvalidCoordinate { index: usize, lat: f64, lng: f64 },
}

pub type Result<T> = std::result::Result<T, InputError>;
