//! # trip-route
//!
//! Route and stop models for a simulated vehicle trip.
//!
//! ## Features
//!
//! - **Distance annotation**: every route vertex learns its great-circle
//!   distance from the route origin
//! - **Pluggable geometry**: distance, heading and interpolation go through
//!   [`SphericalGeometry`], with a Haversine default
//! - **Input parsing**: JSON route and stop payloads
//!
//! ## Example
//!
//! ```
//! use trip_route::prelude::*;
//! use geo::Point;
//!
//! let route = Route::new(
//!     "shuttle",
//!     vec![Point::new(0.0, 0.0), Point::new(0.001, 0.0), Point::new(0.002, 0.0)],
//! );
//!
//! let annotated = route.annotate();
//! assert_eq!(annotated.points()[0].distance, Some(0.0));
//! assert!(annotated.points()[2].distance.unwrap() > 200.0);
//! ```

pub mod identifiers;
pub mod input;
pub mod models;
pub mod spatial;

// Re-exports for convenience
pub mod prelude {
    pub use crate::identifiers::*;
    pub use crate::input::{parse_route, parse_stops};
    pub use crate::models::{route::*, types::*};
    pub use crate::spatial::{Heading, Spherical, SphericalGeometry};
}

pub use prelude::*;
