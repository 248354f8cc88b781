use anyhow::{Context, Result};
use geo::Point;
use geojson::{Feature, FeatureCollection, GeoJson, Geometry, JsonObject, Value};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use trip_sim::{Layer, Marker, MarkerHandle, PolylineStyle, RenderSurface, Viewport};

struct DrawnLine {
    path: Vec<Point>,
    color: String,
    weight: f32,
    opacity: f32,
}

/// Headless map: keeps the scene in memory and rewrites it as a GeoJSON
/// FeatureCollection every time a batch of changes is presented.
pub struct GeoJsonSurface {
    output_path: PathBuf,
    viewport: Option<Viewport>,
    lines: HashMap<Layer, DrawnLine>,
    markers: BTreeMap<u64, (Marker, f64)>,
    next_id: u64,
    frames_written: u64,
}

impl GeoJsonSurface {
    pub fn new(output_path: PathBuf) -> Self {
        Self {
            output_path,
            viewport: None,
            lines: HashMap::new(),
            markers: BTreeMap::new(),
            next_id: 0,
            frames_written: 0,
        }
    }

    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Current scene as a FeatureCollection. Route line first, then progress,
    /// then markers in the order they were added.
    pub fn scene(&self) -> FeatureCollection {
        let mut features = Vec::new();

        for layer in [Layer::Route, Layer::Progress] {
            if let Some(line) = self.lines.get(&layer) {
                features.push(line_to_feature(layer, line));
            }
        }
        for (id, (marker, rotation)) in &self.markers {
            features.push(marker_to_feature(*id, marker, *rotation));
        }

        let foreign_members = self.viewport.map(|viewport| {
            let mut members = JsonObject::new();
            members.insert(
                "center".to_string(),
                serde_json::json!([viewport.center.x(), viewport.center.y()]),
            );
            members.insert("zoom".to_string(), serde_json::json!(viewport.zoom));
            members
        });

        FeatureCollection {
            bbox: None,
            features,
            foreign_members,
        }
    }
}

fn point_to_position(p: &Point) -> Vec<f64> {
    vec![p.x(), p.y()]
}

fn line_to_feature(layer: Layer, line: &DrawnLine) -> Feature {
    let coordinates: Vec<Vec<f64>> = line.path.iter().map(point_to_position).collect();

    // simplestyle-spec property names, understood by most GeoJSON viewers
    let mut properties = serde_json::Map::new();
    let layer_name = match layer {
        Layer::Route => "route",
        Layer::Progress => "progress",
    };
    properties.insert("layer".to_string(), serde_json::json!(layer_name));
    properties.insert("stroke".to_string(), serde_json::json!(line.color));
    properties.insert("stroke-width".to_string(), serde_json::json!(line.weight));
    properties.insert("stroke-opacity".to_string(), serde_json::json!(line.opacity));

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::LineString(coordinates))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

fn marker_to_feature(id: u64, marker: &Marker, rotation: f64) -> Feature {
    let mut properties = serde_json::Map::new();
    properties.insert("marker_id".to_string(), serde_json::json!(id));

    match marker {
        Marker::Stop { title, label, .. } => {
            properties.insert("layer".to_string(), serde_json::json!("stop"));
            properties.insert("title".to_string(), serde_json::json!(title.as_str()));
            properties.insert("marker-symbol".to_string(), serde_json::json!(label));
        }
        Marker::Vehicle { icon, .. } => {
            properties.insert("layer".to_string(), serde_json::json!("vehicle"));
            properties.insert("icon".to_string(), serde_json::json!(icon.url));
            properties.insert(
                "icon_size".to_string(),
                serde_json::json!([icon.width, icon.height]),
            );
            properties.insert(
                "icon_anchor".to_string(),
                serde_json::json!([icon.anchor.0, icon.anchor.1]),
            );
            properties.insert("icon_scale".to_string(), serde_json::json!(icon.scale));
            properties.insert("rotation".to_string(), serde_json::json!(rotation));
        }
    }

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Point(point_to_position(
            &marker.position(),
        )))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}

/// Write a FeatureCollection to a GeoJSON file
pub fn write_scene_geojson(scene: FeatureCollection, output_path: &Path) -> Result<()> {
    let geojson = GeoJson::from(scene);
    let json_string = serde_json::to_string_pretty(&geojson)
        .context("Failed to serialize GeoJSON")?;

    std::fs::write(output_path, json_string)
        .with_context(|| format!("Failed to write GeoJSON to {}", output_path.display()))?;

    Ok(())
}

impl RenderSurface for GeoJsonSurface {
    fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn draw_polyline(&mut self, layer: Layer, path: &[Point], style: &PolylineStyle) {
        self.lines.insert(
            layer,
            DrawnLine {
                path: path.to_vec(),
                color: style.hex_color(),
                weight: style.stroke_weight,
                opacity: style.opacity(),
            },
        );
    }

    fn clear_polyline(&mut self, layer: Layer) {
        self.lines.remove(&layer);
    }

    fn add_marker(&mut self, marker: Marker) -> MarkerHandle {
        self.next_id += 1;
        self.markers.insert(self.next_id, (marker, 0.0));
        MarkerHandle::new(self.next_id)
    }

    fn move_marker(&mut self, handle: MarkerHandle, position: Point) -> bool {
        let Some((marker, _)) = self.markers.get_mut(&handle.id()) else {
            return false;
        };
        match marker {
            Marker::Stop { position: p, .. } | Marker::Vehicle { position: p, .. } => {
                *p = position
            }
        }
        true
    }

    fn rotate_marker(&mut self, handle: MarkerHandle, degrees: f64) -> bool {
        match self.markers.get_mut(&handle.id()) {
            Some((_, rotation)) => {
                *rotation = degrees;
                true
            }
            None => false,
        }
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.markers.remove(&handle.id());
    }

    // Runs on the tick task with the map locked. The write is synchronous on
    // purpose: one small file per second, and frames must land in tick order.
    fn present(&mut self) {
        match write_scene_geojson(self.scene(), &self.output_path) {
            Ok(()) => self.frames_written += 1,
            Err(e) => log::warn!("Could not write frame: {e:#}"),
        }
    }
}
