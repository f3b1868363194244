//! Multiquadric radial basis function interpolation.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use heatmap_common::{HeatmapError, HeatmapResult, InterpolationMethod};

use crate::samples::Site;
use crate::Interpolator;

/// Exact multiquadric RBF interpolant `f(p) = Σ wᵢ φ(|p − pᵢ|)` with
/// `φ(r) = sqrt((r/ε)² + 1)`.
#[derive(Debug, Clone)]
pub struct MultiquadricRbf {
    sites: Vec<Site>,
    epsilon: f64,
    weights: DVector<f64>,
}

impl MultiquadricRbf {
    /// Fit with the default shape parameter (see [`default_epsilon`]).
    pub fn fit(sites: Vec<Site>) -> HeatmapResult<Self> {
        let epsilon = default_epsilon(&sites).ok_or_else(|| {
            HeatmapError::InterpolationError(
                "sample locations span no area; cannot derive RBF shape parameter".to_string(),
            )
        })?;
        Self::with_epsilon(sites, epsilon)
    }

    pub fn with_epsilon(sites: Vec<Site>, epsilon: f64) -> HeatmapResult<Self> {
        let n = sites.len();
        if n < 2 {
            return Err(HeatmapError::InterpolationError(format!(
                "RBF needs at least 2 distinct sample locations, got {}",
                n
            )));
        }
        if !(epsilon.is_finite() && epsilon > 0.0) {
            return Err(HeatmapError::InterpolationError(format!(
                "invalid RBF shape parameter {}",
                epsilon
            )));
        }

        let a = DMatrix::from_fn(n, n, |i, j| {
            multiquadric(sites[i].distance_to(sites[j].x, sites[j].y), epsilon)
        });
        let z = DVector::from_iterator(n, sites.iter().map(|s| s.value));

        let weights = a
            .lu()
            .solve(&z)
            .filter(|w| w.iter().all(|v| v.is_finite()))
            .ok_or_else(|| HeatmapError::InterpolationError("RBF system is singular".to_string()))?;

        debug!(sites = n, epsilon, "Fitted multiquadric RBF model");

        Ok(Self {
            sites,
            epsilon,
            weights,
        })
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }
}

impl Interpolator for MultiquadricRbf {
    fn estimate(&self, x: f64, y: f64) -> f64 {
        self.sites
            .iter()
            .zip(self.weights.iter())
            .map(|(s, w)| w * multiquadric(s.distance_to(x, y), self.epsilon))
            .sum()
    }

    fn method(&self) -> InterpolationMethod {
        InterpolationMethod::Rbf
    }
}

fn multiquadric(r: f64, epsilon: f64) -> f64 {
    ((r / epsilon).powi(2) + 1.0).sqrt()
}

/// Average spacing between sites: `(∏ nonzero edges / N)^(1 / #edges)`
/// over the edges of the sites' bounding box.
pub fn default_epsilon(sites: &[Site]) -> Option<f64> {
    if sites.is_empty() {
        return None;
    }

    let (mut xmin, mut xmax) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut ymin, mut ymax) = (f64::INFINITY, f64::NEG_INFINITY);
    for s in sites {
        xmin = xmin.min(s.x);
        xmax = xmax.max(s.x);
        ymin = ymin.min(s.y);
        ymax = ymax.max(s.y);
    }

    let edges: Vec<f64> = [xmax - xmin, ymax - ymin]
        .into_iter()
        .filter(|e| *e > 0.0)
        .collect();
    if edges.is_empty() {
        return None;
    }

    let product: f64 = edges.iter().product();
    Some((product / sites.len() as f64).powf(1.0 / edges.len() as f64))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_epsilon() {
        let sites = vec![
            Site::new(0.0, 0.0, 0.0),
            Site::new(2.0, 0.0, 0.0),
            Site::new(0.0, 2.0, 0.0),
            Site::new(2.0, 2.0, 0.0),
        ];
        // sqrt(2 * 2 / 4)
        assert!((default_epsilon(&sites).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_default_epsilon_collinear_uses_one_edge() {
        let sites = vec![Site::new(0.0, 5.0, 0.0), Site::new(4.0, 5.0, 0.0)];
        assert!((default_epsilon(&sites).unwrap() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_exact_at_sites() {
        let sites = vec![
            Site::new(0.0, 0.0, 1.0),
            Site::new(1.0, 0.2, 4.0),
            Site::new(0.3, 1.0, 2.0),
            Site::new(0.9, 0.8, -1.0),
        ];
        let model = MultiquadricRbf::fit(sites.clone()).unwrap();
        for s in &sites {
            assert!((model.estimate(s.x, s.y) - s.value).abs() < 1e-8);
        }
    }
}
