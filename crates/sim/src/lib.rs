//! # trip-sim
//!
//! Animates a single vehicle along an annotated route.
//!
//! - [`simulator`]: pure, time-derived trip progress
//! - [`map`]: draws route, stops and vehicle onto a [`render::RenderSurface`]
//! - [`driver`]: owns the 1 s timer that feeds the map

pub mod driver;
pub mod map;
pub mod render;
pub mod settings;
pub mod simulator;

pub use driver::SimulationDriver;
pub use map::TripMap;
pub use render::{
    IconStyle, Layer, Marker, MarkerHandle, PolylineStyle, RenderSurface, Viewport,
};
pub use simulator::{locate, Location, Phase, TripState};
