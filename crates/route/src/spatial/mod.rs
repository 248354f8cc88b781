//! Spherical geometry primitives used by annotation and simulation.

pub mod geometry;

pub use geometry::{Heading, Spherical, SphericalGeometry};
