//! Filesystem-backed region asset store.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use heatmap_common::{HeatmapError, HeatmapResult};

use crate::boundary::BoundaryPolygon;
use crate::geojson::parse_features;
use crate::layer::VectorLayer;

/// File name of the mandatory boundary asset in each region directory.
pub const BOUNDARY_FILE: &str = "boundary.geojson";

const ASSET_EXTENSION: &str = "geojson";

/// Resolves region ids to directories of GeoJSON assets.
#[derive(Debug, Clone)]
pub struct RegionAssetStore {
    root: PathBuf,
}

impl RegionAssetStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory holding a region's assets.
    ///
    /// Region ids must be a single path component so callers cannot escape
    /// the store root.
    pub fn region_dir(&self, region_id: &str) -> HeatmapResult<PathBuf> {
        validate_component("region", region_id)?;
        Ok(self.root.join(region_id))
    }

    /// Load the boundary of a region. A missing file is fatal.
    pub fn load_boundary(&self, region_id: &str) -> HeatmapResult<BoundaryPolygon> {
        let path = self.region_dir(region_id)?.join(BOUNDARY_FILE);

        if !path.is_file() {
            return Err(HeatmapError::asset_missing(
                region_id,
                format!("{} does not exist", BOUNDARY_FILE),
            ));
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            HeatmapError::asset_missing(region_id, format!("failed to read {}: {}", BOUNDARY_FILE, e))
        })?;

        let features = parse_features(&content).map_err(|e| {
            HeatmapError::asset_missing(region_id, format!("unreadable {}: {}", BOUNDARY_FILE, e))
        })?;

        let boundary = BoundaryPolygon::from_features(region_id, &features)?;
        debug!(
            region = %region_id,
            parts = boundary.part_count(),
            "Loaded region boundary"
        );
        Ok(boundary)
    }

    /// Load an auxiliary layer. A missing file yields `Ok(None)`.
    pub fn load_layer(&self, region_id: &str, layer_name: &str) -> HeatmapResult<Option<VectorLayer>> {
        validate_component("layer", layer_name)?;
        let path = self
            .region_dir(region_id)?
            .join(format!("{}.{}", layer_name, ASSET_EXTENSION));

        if !path.is_file() {
            debug!(region = %region_id, layer = %layer_name, "Layer asset not found, skipping");
            return Ok(None);
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            HeatmapError::RenderError(format!("failed to read layer '{}': {}", layer_name, e))
        })?;

        let geometries = parse_features(&content).map_err(|e| {
            HeatmapError::RenderError(format!("unreadable layer '{}': {}", layer_name, e))
        })?;

        Ok(Some(VectorLayer::new(layer_name, geometries)))
    }

    /// Load the requested layers in order, skipping the ones that do not exist.
    pub fn load_layers(&self, region_id: &str, names: &[String]) -> HeatmapResult<Vec<VectorLayer>> {
        let mut layers = Vec::with_capacity(names.len());
        for name in names {
            if let Some(layer) = self.load_layer(region_id, name)? {
                layers.push(layer);
            }
        }
        Ok(layers)
    }

    /// Region ids that have a boundary asset, sorted.
    pub fn list_regions(&self) -> std::io::Result<Vec<String>> {
        if !self.root.exists() {
            warn!(root = %self.root.display(), "Region asset root does not exist");
            return Ok(Vec::new());
        }

        let mut regions = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let entry = entry?;
            let path = entry.path();
            if path.join(BOUNDARY_FILE).is_file() {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    regions.push(name.to_string());
                }
            }
        }
        regions.sort();
        Ok(regions)
    }

    /// Names of the layer assets available for a region, sorted.
    pub fn list_layers(&self, region_id: &str) -> HeatmapResult<Vec<String>> {
        let dir = self.region_dir(region_id)?;
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(_) => return Ok(Vec::new()),
        };

        let mut layers: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(ASSET_EXTENSION))
            .filter(|p| p.file_name().and_then(|n| n.to_str()) != Some(BOUNDARY_FILE))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(str::to_string))
            .collect();
        layers.sort();
        Ok(layers)
    }
}

fn validate_component(kind: &str, value: &str) -> HeatmapResult<()> {
    let valid = !value.is_empty()
        && value != "."
        && value != ".."
        && !value.contains(['/', '\\', '\0']);
    if valid {
        Ok(())
    } else {
        Err(HeatmapError::InputMalformed(format!("invalid {} name '{}'", kind, value)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_component() {
        assert!(validate_component("region", "taiyuangeo").is_ok());
        assert!(validate_component("region", "").is_err());
        assert!(validate_component("region", "..").is_err());
        assert!(validate_component("region", "../etc").is_err());
        assert!(validate_component("layer", "a\\b").is_err());
    }

    #[test]
    fn test_region_dir_joins_root() {
        let store = RegionAssetStore::new("/data/regions");
        assert_eq!(
            store.region_dir("regionA").unwrap(),
            PathBuf::from("/data/regions/regionA")
        );
    }
}
