//! The trip map: a route, its stops and one moving vehicle.

use geo::Point;
use trip_route::{AnnotatedRoute, Stop};

use crate::render::{
    IconStyle, Layer, Marker, MarkerHandle, PolylineStyle, RenderSurface, Viewport,
};
use crate::settings::{CENTER_LONGITUDE_LOOKAHEAD, MAP_ZOOM};
use crate::simulator::TripState;

pub struct TripMap<S> {
    surface: S,
    route: AnnotatedRoute,
    stops: Vec<Stop>,

    stop_markers: Vec<MarkerHandle>,
    vehicle: Option<MarkerHandle>,
}

impl<S: RenderSurface> TripMap<S> {
    pub fn new(surface: S, route: AnnotatedRoute, stops: Vec<Stop>) -> Self {
        Self {
            surface,
            route,
            stops,
            stop_markers: Vec::new(),
            vehicle: None,
        }
    }

    /// Initial camera for a route: latitude of the middle point, longitude of a
    /// point a little further along.
    pub fn viewport_for(route: &AnnotatedRoute) -> Option<Viewport> {
        let points = route.points();
        let last = points.len().checked_sub(1)?;
        let middle = points.len() / 2;
        let ahead = (middle + CENTER_LONGITUDE_LOOKAHEAD).min(last);

        Some(Viewport {
            center: Point::new(points[ahead].lng(), points[middle].lat()),
            zoom: MAP_ZOOM,
        })
    }

    /// Draw the static parts of the map: camera, route line and stop markers.
    pub fn mount(&mut self) {
        match Self::viewport_for(&self.route) {
            Some(viewport) => self.surface.set_viewport(viewport),
            None => {
                tracing::debug!(route = %self.route.id(), "empty route, leaving viewport as-is")
            }
        }

        let line: Vec<Point> = self.route.points().iter().map(|p| p.location).collect();
        self.surface.draw_polyline(Layer::Route, &line, &PolylineStyle::route());

        for handle in self.stop_markers.drain(..) {
            self.surface.remove_marker(handle);
        }
        for (index, stop) in self.stops.iter().enumerate() {
            let handle = self.surface.add_marker(Marker::Stop {
                position: stop.location,
                title: stop.id.clone(),
                label: (index + 1).to_string(),
            });
            self.stop_markers.push(handle);
        }

        tracing::debug!(
            route = %self.route.id(),
            points = self.route.len(),
            stops = self.stops.len(),
            "mounted trip map"
        );
        self.surface.present();
    }

    /// Swap in a new route and redraw. Any shown progress is dropped.
    pub fn set_route(&mut self, route: AnnotatedRoute) {
        self.route = route;
        self.clear_progress();
        self.mount();
    }

    /// Remove the travelled line and the vehicle.
    pub fn clear_progress(&mut self) {
        self.surface.clear_polyline(Layer::Progress);
        if let Some(handle) = self.vehicle.take() {
            self.surface.remove_marker(handle);
        }
        self.surface.present();
    }

    /// Draw `state`: travelled line, vehicle position and orientation.
    pub fn show(&mut self, state: &TripState) {
        let Some(position) = state.progress().last().copied() else {
            self.clear_progress();
            return;
        };

        self.surface
            .draw_polyline(Layer::Progress, state.progress(), &PolylineStyle::progress());

        let handle = match self.vehicle {
            Some(handle) if self.surface.move_marker(handle, position) => handle,
            _ => {
                let handle = self.surface.add_marker(Marker::Vehicle {
                    position,
                    icon: IconStyle::vehicle(),
                });
                self.vehicle = Some(handle);
                handle
            }
        };

        if let Some(rotation) = state.icon_rotation() {
            if !self.surface.rotate_marker(handle, rotation) {
                tracing::trace!(marker = handle.id(), "vehicle icon not ready, skipping rotation");
            }
        }

        self.surface.present();
    }

    pub fn route(&self) -> &AnnotatedRoute {
        &self.route
    }

    pub fn vehicle(&self) -> Option<MarkerHandle> {
        self.vehicle
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

}
