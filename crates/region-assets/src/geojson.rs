//! Minimal GeoJSON reading.
//!
//! Only the geometry half of GeoJSON matters for map assets; feature
//! properties are ignored. Geometries are converted into `geo` types.

use geo::{Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde::{Deserialize, Serialize};

/// A GeoJSON position. Altitude, when present, is ignored.
pub type Position = Vec<f64>;

/// GeoJSON geometry object.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum GeoJsonGeometry {
    Point {
        coordinates: Position,
    },
    MultiPoint {
        coordinates: Vec<Position>,
    },
    LineString {
        coordinates: Vec<Position>,
    },
    MultiLineString {
        coordinates: Vec<Vec<Position>>,
    },
    Polygon {
        /// First ring is the exterior, the rest are holes.
        coordinates: Vec<Vec<Position>>,
    },
    MultiPolygon {
        coordinates: Vec<Vec<Vec<Position>>>,
    },
    GeometryCollection {
        geometries: Vec<GeoJsonGeometry>,
    },
}

/// GeoJSON feature; properties are not retained.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeoJsonFeature {
    #[serde(default)]
    pub geometry: Option<GeoJsonGeometry>,
}

#[derive(Debug, Clone, Deserialize)]
struct GeoJsonFeatureCollection {
    #[serde(default)]
    features: Vec<GeoJsonFeature>,
}

/// Error produced while reading a GeoJSON document.
#[derive(Debug)]
pub struct GeoJsonError(pub String);

impl std::fmt::Display for GeoJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::error::Error for GeoJsonError {}

/// Parse a GeoJSON document into one entry per feature.
///
/// A bare geometry document yields a single entry. Features with a null
/// geometry are dropped.
pub fn parse_features(json_str: &str) -> Result<Vec<Geometry<f64>>, GeoJsonError> {
    let value: serde_json::Value =
        serde_json::from_str(json_str).map_err(|e| GeoJsonError(format!("invalid JSON: {}", e)))?;

    let doc_type = value
        .get("type")
        .and_then(|t| t.as_str())
        .ok_or_else(|| GeoJsonError("missing 'type' member".to_string()))?
        .to_string();

    let raw: Vec<GeoJsonGeometry> = match doc_type.as_str() {
        "FeatureCollection" => {
            let fc: GeoJsonFeatureCollection = serde_json::from_value(value)
                .map_err(|e| GeoJsonError(format!("invalid FeatureCollection: {}", e)))?;
            fc.features.into_iter().filter_map(|f| f.geometry).collect()
        }
        "Feature" => {
            let feature: GeoJsonFeature = serde_json::from_value(value)
                .map_err(|e| GeoJsonError(format!("invalid Feature: {}", e)))?;
            feature.geometry.into_iter().collect()
        }
        _ => {
            let geometry: GeoJsonGeometry = serde_json::from_value(value)
                .map_err(|e| GeoJsonError(format!("invalid geometry: {}", e)))?;
            vec![geometry]
        }
    };

    raw.iter().map(to_geo).collect()
}

fn coord(pos: &Position) -> Result<Coord<f64>, GeoJsonError> {
    match pos.as_slice() {
        [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Coord { x: *x, y: *y }),
        _ => Err(GeoJsonError(format!("invalid position {:?}", pos))),
    }
}

fn line(positions: &[Position]) -> Result<LineString<f64>, GeoJsonError> {
    Ok(LineString::new(
        positions.iter().map(coord).collect::<Result<Vec<_>, _>>()?,
    ))
}

fn polygon(rings: &[Vec<Position>]) -> Result<Polygon<f64>, GeoJsonError> {
    let (exterior, interiors) = rings
        .split_first()
        .ok_or_else(|| GeoJsonError("polygon without rings".to_string()))?;
    Ok(Polygon::new(
        line(exterior)?,
        interiors.iter().map(|r| line(r)).collect::<Result<Vec<_>, _>>()?,
    ))
}

/// Convert a GeoJSON geometry into a `geo` geometry.
pub fn to_geo(geometry: &GeoJsonGeometry) -> Result<Geometry<f64>, GeoJsonError> {
    Ok(match geometry {
        GeoJsonGeometry::Point { coordinates } => Geometry::Point(Point::from(coord(coordinates)?)),
        GeoJsonGeometry::MultiPoint { coordinates } => Geometry::MultiPoint(MultiPoint::new(
            coordinates
                .iter()
                .map(|p| coord(p).map(Point::from))
                .collect::<Result<Vec<_>, _>>()?,
        )),
        GeoJsonGeometry::LineString { coordinates } => Geometry::LineString(line(coordinates)?),
        GeoJsonGeometry::MultiLineString { coordinates } => Geometry::MultiLineString(
            MultiLineString::new(coordinates.iter().map(|l| line(l)).collect::<Result<Vec<_>, _>>()?),
        ),
        GeoJsonGeometry::Polygon { coordinates } => Geometry::Polygon(polygon(coordinates)?),
        GeoJsonGeometry::MultiPolygon { coordinates } => Geometry::MultiPolygon(MultiPolygon::new(
            coordinates.iter().map(|p| polygon(p)).collect::<Result<Vec<_>, _>>()?,
        )),
        GeoJsonGeometry::GeometryCollection { geometries } => Geometry::GeometryCollection(
            GeometryCollection(geometries.iter().map(to_geo).collect::<Result<Vec<_>, _>>()?),
        ),
    })
}

/// Collect every polygon contained in a geometry, descending into collections.
pub fn polygons_of(geometry: &Geometry<f64>) -> Vec<Polygon<f64>> {
    match geometry {
        Geometry::Polygon(p) => vec![p.clone()],
        Geometry::MultiPolygon(mp) => mp.0.clone(),
        Geometry::GeometryCollection(gc) => gc.0.iter().flat_map(polygons_of).collect(),
        Geometry::Rect(r) => vec![r.to_polygon()],
        Geometry::Triangle(t) => vec![t.to_polygon()],
        _ => Vec::new(),
    }
}
