//! Auxiliary vector layers (roads, water, rail, ...).

use geo::Geometry;

/// A named geometry collection drawn over the heat raster.
#[derive(Debug, Clone)]
pub struct VectorLayer {
    /// Layer name as requested; also decides the layer's styling.
    pub name: String,
    pub geometries: Vec<Geometry<f64>>,
}

impl VectorLayer {
    pub fn new(name: impl Into<String>, geometries: Vec<Geometry<f64>>) -> Self {
        Self {
            name: name.into(),
            geometries,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }
}
