//! Scattered measurement samples.

use serde::{Deserialize, Serialize};

use crate::bbox::BoundingRegion;

/// A single measured concentration at a geographic location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplePoint {
    /// Longitude
    pub x: f64,
    /// Latitude
    pub y: f64,
    /// Measured concentration
    pub value: f64,
}

impl SamplePoint {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }

    /// Euclidean distance in coordinate units.
    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        (self.x - x).hypot(self.y - y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.value.is_finite()
    }
}

/// Bounding box of the sample locations, if any.
pub fn sample_bounds(points: &[SamplePoint]) -> Option<BoundingRegion> {
    BoundingRegion::from_coords(points.iter().map(|p| (p.x, p.y)))
}
