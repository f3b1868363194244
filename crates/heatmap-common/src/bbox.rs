//! Bounding box types and operations.

use serde::{Deserialize, Serialize};

/// Tight bounding box of a region's boundary, in geographic degrees.
///
/// This is the lattice extent the interpolator fills. It is derived from the
/// boundary asset and never from the sample points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingRegion {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
}

impl BoundingRegion {
    /// Create a new bounding region from corner coordinates.
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
        }
    }

    /// Compute the tight bounding box of a set of (x, y) coordinates.
    ///
    /// Returns `None` for an empty iterator or when any coordinate is not finite.
    pub fn from_coords<I>(coords: I) -> Option<Self>
    where
        I: IntoIterator<Item = (f64, f64)>,
    {
        let mut iter = coords.into_iter();
        let (x0, y0) = iter.next()?;
        let mut region = Self::new(x0, y0, x0, y0);
        for (x, y) in iter {
            region.xmin = region.xmin.min(x);
            region.ymin = region.ymin.min(y);
            region.xmax = region.xmax.max(x);
            region.ymax = region.ymax.max(y);
        }
        region.is_finite().then_some(region)
    }

    /// Width of the region in coordinate units.
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// Height of the region in coordinate units.
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// True if every corner is a finite number.
    pub fn is_finite(&self) -> bool {
        self.xmin.is_finite() && self.ymin.is_finite() && self.xmax.is_finite() && self.ymax.is_finite()
    }

    /// Check if a point is contained within this region (edges inclusive).
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.xmin && x <= self.xmax && y >= self.ymin && y <= self.ymax
    }

    /// Smallest region covering both `self` and `other`.
    pub fn union(&self, other: &BoundingRegion) -> BoundingRegion {
        BoundingRegion {
            xmin: self.xmin.min(other.xmin),
            ymin: self.ymin.min(other.ymin),
            xmax: self.xmax.max(other.xmax),
            ymax: self.ymax.max(other.ymax),
        }
    }
}

/// Geographic window shown by the rendered map.
///
/// Independent of the data's own bounding box: the compositor never auto-fits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayExtent {
    pub xmin: f64,
    pub xmax: f64,
    pub ymin: f64,
    pub ymax: f64,
}

impl DisplayExtent {
    /// Hardcoded regional default window (central Shanxi).
    pub const DEFAULT: DisplayExtent = DisplayExtent {
        xmin: 111.4,
        xmax: 113.3,
        ymin: 37.2,
        ymax: 38.5,
    };

    pub fn new(xmin: f64, xmax: f64, ymin: f64, ymax: f64) -> Self {
        Self {
            xmin,
            xmax,
            ymin,
            ymax,
        }
    }

    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// An extent is usable when all bounds are finite and strictly ordered.
    pub fn is_valid(&self) -> bool {
        [self.xmin, self.xmax, self.ymin, self.ymax]
            .iter()
            .all(|v| v.is_finite())
            && self.xmax > self.xmin
            && self.ymax > self.ymin
    }
}

impl Default for DisplayExtent {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_coords() {
        let region =
            BoundingRegion::from_coords(vec![(112.0, 37.5), (112.8, 38.1), (111.9, 37.9)]).unwrap();
        assert_eq!(region.xmin, 111.9);
        assert_eq!(region.ymin, 37.5);
        assert_eq!(region.xmax, 112.8);
        assert_eq!(region.ymax, 38.1);
    }

    #[test]
    fn test_from_coords_empty() {
        assert!(BoundingRegion::from_coords(Vec::new()).is_none());
    }

    #[test]
    fn test_from_coords_rejects_nan() {
        assert!(BoundingRegion::from_coords(vec![(0.0, 0.0), (f64::NAN, 1.0)]).is_none());
    }

    #[test]
    fn test_default_extent_is_valid() {
        assert!(DisplayExtent::default().is_valid());
        assert!((DisplayExtent::DEFAULT.width() - 1.9).abs() < 1e-9);
    }

    #[test]
    fn test_degenerate_extent() {
        assert!(!DisplayExtent::new(1.0, 1.0, 0.0, 2.0).is_valid());
        assert!(!DisplayExtent::new(0.0, 1.0, 3.0, 2.0).is_valid());
    }
}
