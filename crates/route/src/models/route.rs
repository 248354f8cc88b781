//! Raw routes and the distance annotator.
//!
//! Annotation stores, for every vertex, the great-circle distance from that
//! vertex straight back to the route's first point. It is *not* the length
//! travelled along the polyline: a route that doubles back towards its origin
//! gets smaller distances on the way back. Simulation relies on exactly this
//! behaviour, so it is kept as-is.

use std::sync::Arc;

use geo::Point;

use crate::identifiers::RouteIdentifier;
use crate::models::types::RoutePoint;
use crate::spatial::{Spherical, SphericalGeometry};

/// An ordered list of route vertices before annotation.
#[derive(Clone, Debug, PartialEq)]
pub struct Route {
    pub id: RouteIdentifier,
    pub points: Vec<Point>,
}

impl Route {
    pub fn new(id: impl Into<RouteIdentifier>, points: Vec<Point>) -> Self {
        Self {
            id: id.into(),
            points,
        }
    }

    /// Annotate with the default spherical geometry.
    pub fn annotate(&self) -> AnnotatedRoute {
        self.annotate_with(&Spherical)
    }

    pub fn annotate_with(&self, geometry: &impl SphericalGeometry) -> AnnotatedRoute {
        let Some(&origin) = self.points.first() else {
            tracing::debug!(route = %self.id, "annotating empty route");
            return AnnotatedRoute::from_points(self.id.clone(), Vec::new());
        };

        let points = self
            .points
            .iter()
            .enumerate()
            .map(|(i, &location)| {
                let distance = if i == 0 {
                    0.0
                } else {
                    geometry.distance(location, origin)
                };
                RoutePoint::with_distance(location, distance)
            })
            .collect();

        tracing::debug!(route = %self.id, points = self.points.len(), "annotated route");
        AnnotatedRoute::from_points(self.id.clone(), points)
    }

    /// The route as-is, without distances. Used when no geometry support is
    /// available; the simulator ignores every such point.
    pub fn unannotated(&self) -> AnnotatedRoute {
        AnnotatedRoute::from_points(
            self.id.clone(),
            self.points.iter().copied().map(RoutePoint::new).collect(),
        )
    }
}

/// A route whose points carry their distance from the origin.
///
/// Cheap to clone; the points are shared and never mutated.
#[derive(Clone, Debug, PartialEq)]
pub struct AnnotatedRoute {
    id: RouteIdentifier,
    points: Arc<[RoutePoint]>,
}

impl AnnotatedRoute {
    /// Build from points that already carry distances.
    pub fn from_points(id: RouteIdentifier, points: Vec<RoutePoint>) -> Self {
        Self {
            id,
            points: points.into(),
        }
    }

    pub fn id(&self) -> &RouteIdentifier {
        &self.id
    }

    pub fn points(&self) -> &[RoutePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Largest annotated distance, if any point is annotated.
    pub fn max_distance(&self) -> Option<f64> {
        self.points
            .iter()
            .filter_map(|p| p.distance)
            .fold(None, |acc: Option<f64>, d| Some(acc.map_or(d, |m| m.max(d))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn equator_route() -> Route {
        Route::new(
            "equator",
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.001, 0.0),
                Point::new(0.002, 0.0),
                Point::new(0.003, 0.0),
            ],
        )
    }

    #[test]
    fn test_first_point_distance_is_zero() {
        let annotated = equator_route().annotate();
        assert_eq!(annotated.points()[0].distance, Some(0.0));
    }

    #[test]
    fn test_straight_route_distances_are_non_decreasing() {
        let annotated = equator_route().annotate();
        let distances: Vec<f64> = annotated
            .points()
            .iter()
            .map(|p| p.distance.unwrap())
            .collect();

        for pair in distances.windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        // ~111 m per 0.001 degrees on the equator
        assert_abs_diff_eq!(distances[3], 333.6, epsilon = 1.0);
    }

    #[test]
    fn test_distance_is_to_origin_not_along_path() {
        // Out 0.002 degrees east, then back 0.001 degrees west
        let route = Route::new(
            "out_and_back",
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.002, 0.0),
                Point::new(0.001, 0.0),
            ],
        );
        let annotated = route.annotate();
        let d = |i: usize| annotated.points()[i].distance.unwrap();

        // Path length to the last point would be ~333 m; straight-line to origin is ~111 m
        assert!(d(2) < d(1));
        assert_abs_diff_eq!(d(2), d(1) / 2.0, epsilon = 0.01);
    }

    #[test]
    fn test_annotated_distances_match_geometry() {
        let route = Route::new(
            "diagonal",
            vec![
                Point::new(-74.0060, 40.7128),
                Point::new(-74.0050, 40.7138),
                Point::new(-74.0040, 40.7150),
            ],
        );
        let annotated = route.annotate();
        let expected = Spherical.distance(route.points[2], route.points[0]);
        assert_abs_diff_eq!(annotated.points()[2].distance.unwrap(), expected);
    }

    #[test]
    fn test_empty_route() {
        let annotated = Route::new("empty", vec![]).annotate();
        assert!(annotated.is_empty());
        assert_eq!(annotated.max_distance(), None);
    }

    #[test]
    fn test_unannotated_route_has_no_distances() {
        let annotated = equator_route().unannotated();
        assert_eq!(annotated.len(), 4);
        assert!(annotated.points().iter().all(|p| p.distance.is_none()));
        assert_eq!(annotated.max_distance(), None);
    }
}
