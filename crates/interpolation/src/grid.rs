//! Regular lattice of interpolated values.

use heatmap_common::BoundingRegion;

/// Estimated values over a regular lattice spanning a bounding region.
///
/// Both axes are inclusive linspaces: node `i` on the x axis sits at
/// `xmin + i * (xmax - xmin) / (nx - 1)`. Values are stored row by row with
/// y increasing, so `values[j * nx + i]` is the node at `(x_at(i), y_at(j))`.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationGrid {
    nx: usize,
    ny: usize,
    region: BoundingRegion,
    values: Vec<f64>,
}

impl InterpolationGrid {
    /// Evaluate `f` at every lattice node.
    pub fn from_fn<F>(region: BoundingRegion, nx: usize, ny: usize, f: F) -> Self
    where
        F: Fn(f64, f64) -> f64,
    {
        let mut grid = Self {
            nx,
            ny,
            region,
            values: Vec::with_capacity(nx * ny),
        };
        for j in 0..ny {
            let y = grid.y_at(j);
            for i in 0..nx {
                let x = grid.x_at(i);
                grid.values.push(f(x, y));
            }
        }
        grid
    }

    pub fn nx(&self) -> usize {
        self.nx
    }

    pub fn ny(&self) -> usize {
        self.ny
    }

    pub fn region(&self) -> &BoundingRegion {
        &self.region
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Value at node `(i, j)`; `i` runs along x, `j` along y.
    pub fn get(&self, i: usize, j: usize) -> Option<f64> {
        if i < self.nx && j < self.ny {
            Some(self.values[j * self.nx + i])
        } else {
            None
        }
    }

    pub fn x_at(&self, i: usize) -> f64 {
        linspace_at(self.region.xmin, self.region.xmax, self.nx, i)
    }

    pub fn y_at(&self, j: usize) -> f64 {
        linspace_at(self.region.ymin, self.region.ymax, self.ny, j)
    }

    /// Finite minimum and maximum, or `None` when no value is finite.
    pub fn min_max(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .filter(|v| v.is_finite())
            .fold(None, |acc, &v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// Bilinear sample at a geographic coordinate.
    ///
    /// Returns `None` outside the grid's region or when any surrounding
    /// node is not finite.
    pub fn sample_bilinear(&self, x: f64, y: f64) -> Option<f64> {
        if !self.region.contains_point(x, y) || self.nx < 2 || self.ny < 2 {
            return None;
        }

        let fx = (x - self.region.xmin) / self.region.width() * (self.nx - 1) as f64;
        let fy = (y - self.region.ymin) / self.region.height() * (self.ny - 1) as f64;

        let i0 = (fx.floor() as usize).min(self.nx - 2);
        let j0 = (fy.floor() as usize).min(self.ny - 2);
        let tx = fx - i0 as f64;
        let ty = fy - j0 as f64;

        let v00 = self.values[j0 * self.nx + i0];
        let v10 = self.values[j0 * self.nx + i0 + 1];
        let v01 = self.values[(j0 + 1) * self.nx + i0];
        let v11 = self.values[(j0 + 1) * self.nx + i0 + 1];

        if !(v00.is_finite() && v10.is_finite() && v01.is_finite() && v11.is_finite()) {
            return None;
        }

        let bottom = v00 * (1.0 - tx) + v10 * tx;
        let top = v01 * (1.0 - tx) + v11 * tx;
        Some(bottom * (1.0 - ty) + top * ty)
    }
}

fn linspace_at(min: f64, max: f64, n: usize, i: usize) -> f64 {
    if n <= 1 {
        min
    } else {
        min + (max - min) * i as f64 / (n - 1) as f64
    }
}
