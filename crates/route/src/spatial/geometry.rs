//! Great-circle distance, heading and interpolation between two points.
//!
//! The annotator and the simulator never do trigonometry themselves; they go
//! through [`SphericalGeometry`] so a host can plug in the same primitives its
//! map widget uses. [`Spherical`] is the default, backed by `geo::Haversine`.

use geo::{Bearing, Distance, Haversine, InterpolatePoint, Point};

/// Compass heading in degrees, normalised to `[-180, 180)`.
///
/// 0 is north, 90 is east, -90 is west.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Heading(f64);

impl Heading {
    /// Normalise any bearing in degrees into `[-180, 180)`.
    pub fn from_degrees(degrees: f64) -> Self {
        let wrapped = (degrees + 180.0).rem_euclid(360.0) - 180.0;
        Self(wrapped)
    }

    pub fn degrees(&self) -> f64 {
        self.0
    }

    /// Heading shifted by `offset` degrees, without re-normalising.
    ///
    /// Marker artwork is usually drawn facing east, so callers rotate icons by
    /// `heading - 90`.
    pub fn offset_by(&self, offset: f64) -> f64 {
        self.0 + offset
    }
}

/// Geometry primitives assumed by the route model.
pub trait SphericalGeometry: Send + Sync {
    /// Great-circle distance in meters.
    fn distance(&self, from: Point, to: Point) -> f64;

    /// Initial heading of the great-circle path from `from` to `to`.
    fn heading(&self, from: Point, to: Point) -> Heading;

    /// Point at `fraction` of the way along the great circle from `from` to
    /// `to`. `0.0` is `from`, `1.0` is `to`.
    fn interpolate(&self, from: Point, to: Point, fraction: f64) -> Point;
}

/// Haversine (spherical earth) implementation.
#[derive(Clone, Copy, Debug, Default)]
pub struct Spherical;

impl SphericalGeometry for Spherical {
    fn distance(&self, from: Point, to: Point) -> f64 {
        Haversine.distance(from, to)
    }

    fn heading(&self, from: Point, to: Point) -> Heading {
        Heading::from_degrees(Haversine.bearing(from, to))
    }

    fn interpolate(&self, from: Point, to: Point, fraction: f64) -> Point {
        if from == to {
            return from;
        }
        Haversine.point_at_ratio_between(from, to, fraction)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_heading_normalisation() {
        assert_abs_diff_eq!(Heading::from_degrees(0.0).degrees(), 0.0);
        assert_abs_diff_eq!(Heading::from_degrees(90.0).degrees(), 90.0);
        assert_abs_diff_eq!(Heading::from_degrees(270.0).degrees(), -90.0);
        assert_abs_diff_eq!(Heading::from_degrees(180.0).degrees(), -180.0);
        assert_abs_diff_eq!(Heading::from_degrees(-190.0).degrees(), 170.0);
        assert_abs_diff_eq!(Heading::from_degrees(450.0).degrees(), 90.0);
    }

    #[test]
    fn test_distance_along_equator() {
        // One degree of longitude on the equator is about 111.2 km
        let dist = Spherical.distance(Point::new(0.0, 0.0), Point::new(1.0, 0.0));
        assert!((dist - 111_195.0).abs() < 100.0);
    }

    #[test]
    fn test_heading_cardinal_directions() {
        let origin = Point::new(0.0, 0.0);

        let east = Spherical.heading(origin, Point::new(1.0, 0.0));
        assert_abs_diff_eq!(east.degrees(), 90.0, epsilon = 1e-6);

        let north = Spherical.heading(origin, Point::new(0.0, 1.0));
        assert_abs_diff_eq!(north.degrees(), 0.0, epsilon = 1e-6);

        let west = Spherical.heading(origin, Point::new(-1.0, 0.0));
        assert_abs_diff_eq!(west.degrees(), -90.0, epsilon = 1e-6);

        // Icon artwork faces east, so an eastbound vehicle is not rotated
        assert_abs_diff_eq!(east.offset_by(-90.0), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_interpolate_on_equator() {
        let from = Point::new(1.0, 0.0);
        let to = Point::new(2.0, 0.0);

        let p = Spherical.interpolate(from, to, 0.35);
        assert_abs_diff_eq!(p.x(), 1.35, epsilon = 1e-9);
        assert_abs_diff_eq!(p.y(), 0.0, epsilon = 1e-9);

        let same = Spherical.interpolate(from, from, 0.5);
        assert_eq!(same, from);
    }
}
