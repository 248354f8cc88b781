use std::time::Duration;

// hardcoded; the trip always runs at one fixed speed
/// Simulated vehicle speed in meters per second (roughly 100 km/h).
pub const VELOCITY: f64 = 27.0;

/// Wall-clock time between two simulation ticks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Added to the travel heading before rotating the vehicle icon. The artwork
/// points east, so a northbound vehicle needs a -90° rotation.
pub const ICON_HEADING_OFFSET: f64 = -90.0;

/// Zoom level used when the map is first mounted.
pub const MAP_ZOOM: u8 = 17;

/// The initial map center takes its longitude from this many points past the
/// middle of the route.
pub const CENTER_LONGITUDE_LOOKAHEAD: usize = 5;
