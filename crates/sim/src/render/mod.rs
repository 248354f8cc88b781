//! The seam between the simulation and whatever actually draws the map.
//!
//! Tiles, polylines and icons are the host's business. [`TripMap`] only ever
//! talks to a [`RenderSurface`] and keeps a [`MarkerHandle`] for every marker it
//! placed, so it never has to search the surface for its own elements.
//!
//! [`TripMap`]: crate::map::TripMap

use geo::Point;
use trip_route::StopIdentifier;

pub mod style;

pub use style::{IconStyle, PolylineStyle};

/// Opaque reference to a marker issued by [`RenderSurface::add_marker`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MarkerHandle(u64);

impl MarkerHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Polyline slots. Drawing into a layer replaces what was there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Layer {
    Route,
    Progress,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub center: Point,
    pub zoom: u8,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Marker {
    Stop {
        position: Point,
        title: StopIdentifier,
        label: String,
    },
    Vehicle {
        position: Point,
        icon: IconStyle,
    },
}

impl Marker {
    pub fn position(&self) -> Point {
        match self {
            Marker::Stop { position, .. } | Marker::Vehicle { position, .. } => *position,
        }
    }
}

pub trait RenderSurface: Send {
    fn set_viewport(&mut self, viewport: Viewport);

    fn draw_polyline(&mut self, layer: Layer, path: &[Point], style: &PolylineStyle);
    fn clear_polyline(&mut self, layer: Layer);

    fn add_marker(&mut self, marker: Marker) -> MarkerHandle;

    /// Returns `false` if the handle no longer refers to a marker.
    fn move_marker(&mut self, handle: MarkerHandle, position: Point) -> bool;

    /// Rotate a marker's icon clockwise by `degrees`.
    ///
    /// Returns `false` when the surface has no visual element for the handle
    /// yet (for example, the icon bitmap has not loaded).
    fn rotate_marker(&mut self, handle: MarkerHandle, degrees: f64) -> bool;

    fn remove_marker(&mut self, handle: MarkerHandle);

    /// Called once a batch of changes is complete.
    fn present(&mut self) {}
}
