//! Parsing of the JSON route and stop payloads a host hands to the map.
//!
//! Route: `[{"lat": 40.71, "lng": -74.00}, ...]`
//! Stops: `{"data": [{"lat": 40.71, "lng": -74.00, "id": "A"}, ...]}`

use geo::Point;
use serde::Deserialize;

use crate::identifiers::RouteIdentifier;
use crate::models::types::{InputError, Result, Stop};
use crate::models::Route;

#[derive(Debug, Deserialize)]
struct RawLatLng {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawStopId {
    Text(String),
    Number(serde_json::Number),
}

#[derive(Debug, Deserialize)]
struct RawStop {
    lat: f64,
    lng: f64,
    id: RawStopId,
}

#[derive(Debug, Deserialize)]
struct RawStops {
    data: Vec<RawStop>,
}

fn to_point(index: usize, lat: f64, lng: f64) -> Result<Point> {
    let valid = lat.is_finite()
        && lng.is_finite()
        && (-90.0..=90.0).contains(&lat)
        && (-180.0..=180.0).contains(&lng);

    if !valid {
        return Err(InputError::InvalidCoordinate { index, lat, lng });
    }
    Ok(Point::new(lng, lat))
}

/// Parse a route payload into an unannotated [`Route`].
pub fn parse_route(id: impl Into<RouteIdentifier>, json: &str) -> Result<Route> {
    let raw: Vec<RawLatLng> = serde_json::from_str(json)?;
    let points = raw
        .iter()
        .enumerate()
        .map(|(i, p)| to_point(i, p.lat, p.lng))
        .collect::<Result<Vec<_>>>()?;

    Ok(Route::new(id, points))
}

/// Parse a stops payload.
pub fn parse_stops(json: &str) -> Result<Vec<Stop>> {
    let raw: RawStops = serde_json::from_str(json)?;
    raw.data
        .into_iter()
        .enumerate()
        .map(|(i, s)| {
            let location = to_point(i, s.lat, s.lng)?;
            let id = match s.id {
                RawStopId::Text(text) => text,
                RawStopId::Number(n) => n.to_string(),
            };
            Ok(Stop::new(id, location))
        })
        .collect()
}
