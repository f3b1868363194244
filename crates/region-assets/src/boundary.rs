//! Administrative boundary of a region.

use geo::{Area, Contains, CoordsIter, Geometry, MultiPolygon, Point, Polygon};

use heatmap_common::{BoundingRegion, HeatmapError, HeatmapResult};

use crate::geojson::polygons_of;

/// Outer edge of a region, as loaded from `boundary.geojson`.
#[derive(Debug, Clone)]
pub struct BoundaryPolygon {
    /// Region id this boundary belongs to.
    pub region_id: String,
    /// Every polygon of every boundary feature. All of them are outlined.
    pub parts: MultiPolygon<f64>,
    /// Largest-area part of the first polygonal feature; the heat clip path.
    pub clip: Polygon<f64>,
    bounds: BoundingRegion,
}

impl BoundaryPolygon {
    /// Build a boundary from the features of a boundary asset.
    ///
    /// The clip part comes from the first feature that carries polygons:
    /// smaller exclaves of that feature are drawn but do not clip.
    pub fn from_features(region_id: &str, features: &[Geometry<f64>]) -> HeatmapResult<Self> {
        let per_feature: Vec<Vec<Polygon<f64>>> = features.iter().map(polygons_of).collect();

        let clip = per_feature
            .iter()
            .find(|polys| !polys.is_empty())
            .and_then(|polys| largest_part(polys))
            .ok_or_else(|| HeatmapError::asset_missing(region_id, "boundary contains no polygons"))?;

        let parts = MultiPolygon::new(per_feature.into_iter().flatten().collect());

        let bounds = BoundingRegion::from_coords(parts.coords_iter().map(|c| (c.x, c.y)))
            .filter(|b| b.width() > 0.0 && b.height() > 0.0)
            .ok_or_else(|| HeatmapError::asset_missing(region_id, "boundary has an empty extent"))?;

        Ok(Self {
            region_id: region_id.to_string(),
            parts,
            clip,
            bounds,
        })
    }

    /// Tight bounding box over all boundary features.
    pub fn bounding_region(&self) -> BoundingRegion {
        self.bounds
    }

    /// Number of polygon parts (exclaves included).
    pub fn part_count(&self) -> usize {
        self.parts.0.len()
    }

    /// True if the point lies strictly inside the clip part.
    pub fn clip_contains(&self, x: f64, y: f64) -> bool {
        self.clip.contains(&Point::new(x, y))
    }
}

/// The polygon with the largest unsigned area.
pub fn largest_part(polygons: &[Polygon<f64>]) -> Option<Polygon<f64>> {
    polygons
        .iter()
        .max_by(|a, b| {
            a.unsigned_area()
                .partial_cmp(&b.unsigned_area())
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{polygon, LineString};

    fn square(x0: f64, y0: f64, size: f64) -> Polygon<f64> {
        polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
        ]
    }

    #[test]
    fn test_largest_part_selected_for_clip() {
        let mp = MultiPolygon::new(vec![square(10.0, 10.0, 1.0), square(0.0, 0.0, 5.0)]);
        let boundary =
            BoundaryPolygon::from_features("r", &[Geometry::MultiPolygon(mp)]).unwrap();
        assert_eq!(boundary.part_count(), 2);
        assert!((boundary.clip.unsigned_area() - 25.0).abs() < 1e-9);
        // Bounds cover the exclave too
        assert_eq!(boundary.bounding_region(), BoundingRegion::new(0.0, 0.0, 11.0, 11.0));
        assert!(boundary.clip_contains(2.5, 2.5));
        assert!(!boundary.clip_contains(10.5, 10.5));
    }

    #[test]
    fn test_no_polygons_is_asset_missing() {
        let line = Geometry::LineString(LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]));
        let err = BoundaryPolygon::from_features("r", &[line]).unwrap_err();
        assert!(matches!(err, HeatmapError::AssetMissing { .. }));
    }

    #[test]
    fn test_clip_comes_from_first_polygonal_feature() {
        let first = Geometry::Polygon(square(0.0, 0.0, 1.0));
        let second = Geometry::Polygon(square(5.0, 5.0, 4.0));
        let boundary = BoundaryPolygon::from_features("r", &[first, second]).unwrap();
        assert!((boundary.clip.unsigned_area() - 1.0).abs() < 1e-9);
        assert_eq!(boundary.part_count(), 2);
    }
}
