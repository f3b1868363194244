//! Region asset fixtures.
//!
//! Builds throwaway region asset stores on disk so loader, renderer and API
//! tests can run against real GeoJSON files.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tempfile::TempDir;

/// Common bounding boxes, `(xmin, ymin, xmax, ymax)`.
pub mod bbox {
    /// Square region well inside the default display window.
    pub const REGION_A: (f64, f64, f64, f64) = (111.8, 37.5, 112.8, 38.2);

    /// Unit square at the origin.
    pub const UNIT: (f64, f64, f64, f64) = (0.0, 0.0, 1.0, 1.0);
}

/// Closed exterior ring of an axis-aligned rectangle.
pub fn rect_ring(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Value {
    json!([[xmin, ymin], [xmax, ymin], [xmax, ymax], [xmin, ymax], [xmin, ymin]])
}

/// FeatureCollection with a single rectangular polygon feature.
pub fn rect_boundary_geojson((xmin, ymin, xmax, ymax): (f64, f64, f64, f64)) -> String {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {"name": "boundary"},
            "geometry": {"type": "Polygon", "coordinates": [rect_ring(xmin, ymin, xmax, ymax)]}
        }]
    })
    .to_string()
}

/// Boundary made of a main rectangle plus a small exclave to its north-east.
///
/// The exclave is a tenth of the main part's width and sits just outside it.
pub fn exclave_boundary_geojson((xmin, ymin, xmax, ymax): (f64, f64, f64, f64)) -> String {
    let dx = (xmax - xmin) * 0.1;
    let dy = (ymax - ymin) * 0.1;
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "MultiPolygon",
                "coordinates": [
                    [rect_ring(xmax + dx, ymax + dy, xmax + 2.0 * dx, ymax + 2.0 * dy)],
                    [rect_ring(xmin, ymin, xmax, ymax)]
                ]
            }
        }]
    })
    .to_string()
}

/// Rectangular boundary with a square hole at its center.
///
/// The hole spans a fifth of the box width on each side of the center point.
pub fn holed_boundary_geojson((xmin, ymin, xmax, ymax): (f64, f64, f64, f64)) -> String {
    let (cx, cy) = ((xmin + xmax) / 2.0, (ymin + ymax) / 2.0);
    let half = (xmax - xmin) * 0.1;
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [
                    rect_ring(xmin, ymin, xmax, ymax),
                    rect_ring(cx - half, cy - half, cx + half, cy + half)
                ]
            }
        }]
    })
    .to_string()
}

/// Layer with a single line crossing the box diagonally.
pub fn line_layer_geojson((xmin, ymin, xmax, ymax): (f64, f64, f64, f64)) -> String {
    json!({
        "type": "FeatureCollection",
        "features": [{
            "type": "Feature",
            "properties": {},
            "geometry": {"type": "LineString", "coordinates": [[xmin, ymin], [xmax, ymax]]}
        }]
    })
    .to_string()
}

/// Layer with a single polygon covering the central quarter of the box.
pub fn polygon_layer_geojson((xmin, ymin, xmax, ymax): (f64, f64, f64, f64)) -> String {
    let qx = (xmax - xmin) / 4.0;
    let qy = (ymax - ymin) / 4.0;
    rect_boundary_geojson((xmin + qx, ymin + qy, xmax - qx, ymax - qy))
}

/// A region asset store living in a temporary directory.
///
/// The directory is removed when the value is dropped.
pub struct TempRegionStore {
    dir: TempDir,
}

impl TempRegionStore {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("failed to create temp dir"),
        }
    }

    /// Store with `regionA` (rectangle, roads and water layers) and
    /// `regionB` (directory without a boundary file).
    pub fn standard() -> Self {
        let store = Self::new();
        store.write_boundary("regionA", &rect_boundary_geojson(bbox::REGION_A));
        store.write_layer("regionA", "roads", &line_layer_geojson(bbox::REGION_A));
        store.write_layer("regionA", "water", &polygon_layer_geojson(bbox::REGION_A));
        store.write_layer("regionB", "roads", &line_layer_geojson(bbox::REGION_A));
        store
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn region_dir(&self, region: &str) -> PathBuf {
        let dir = self.dir.path().join(region);
        fs::create_dir_all(&dir).expect("failed to create region dir");
        dir
    }

    pub fn write_boundary(&self, region: &str, geojson: &str) -> PathBuf {
        self.write_file(region, "boundary.geojson", geojson)
    }

    pub fn write_layer(&self, region: &str, layer: &str, geojson: &str) -> PathBuf {
        self.write_file(region, &format!("{}.geojson", layer), geojson)
    }

    pub fn write_file(&self, region: &str, file_name: &str, content: &str) -> PathBuf {
        let path = self.region_dir(region).join(file_name);
        fs::write(&path, content).expect("failed to write asset file");
        path
    }
}

impl Default for TempRegionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_store_layout() {
        let store = TempRegionStore::standard();
        assert!(store.root().join("regionA/boundary.geojson").is_file());
        assert!(store.root().join("regionA/roads.geojson").is_file());
        assert!(!store.root().join("regionB/boundary.geojson").exists());
    }

    #[test]
    fn test_rect_ring_is_closed() {
        let ring = rect_ring(0.0, 0.0, 1.0, 1.0);
        let coords = ring.as_array().unwrap();
        assert_eq!(coords.len(), 5);
        assert_eq!(coords[0], coords[4]);
    }
}
