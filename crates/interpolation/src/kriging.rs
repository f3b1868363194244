//! Ordinary kriging with a linear variogram.

use nalgebra::{DMatrix, DVector};
use tracing::debug;

use heatmap_common::{HeatmapError, HeatmapResult, InterpolationMethod};

use crate::samples::Site;
use crate::variogram::LinearVariogram;
use crate::Interpolator;

/// Fitted ordinary kriging model.
///
/// The kriging system
///
/// ```text
/// | Γ  1 | |w|   |γ(x)|
/// | 1ᵀ 0 | |μ| = | 1  |
/// ```
///
/// is symmetric, so the estimate `zᵀw` can be rewritten as `bᵀα` with
/// `α = A⁻¹ [z; 0]` solved once at fit time. Each query is then a dot
/// product over the sites.
#[derive(Debug, Clone)]
pub struct OrdinaryKriging {
    sites: Vec<Site>,
    variogram: LinearVariogram,
    alpha: DVector<f64>,
}

impl OrdinaryKriging {
    /// Fit the variogram and solve the kriging system.
    pub fn fit(sites: Vec<Site>) -> HeatmapResult<Self> {
        let variogram = LinearVariogram::fit(&sites);
        Self::with_variogram(sites, variogram)
    }

    /// Solve the kriging system for a given variogram.
    pub fn with_variogram(sites: Vec<Site>, variogram: LinearVariogram) -> HeatmapResult<Self> {
        let n = sites.len();
        if n < 2 {
            return Err(HeatmapError::InterpolationError(format!(
                "kriging needs at least 2 distinct sample locations, got {}",
                n
            )));
        }
        if variogram.is_flat() {
            return Err(HeatmapError::InterpolationError(
                "variogram is identically zero; kriging system is singular".to_string(),
            ));
        }

        let a = DMatrix::from_fn(n + 1, n + 1, |i, j| match (i < n, j < n) {
            (true, true) if i == j => 0.0,
            (true, true) => variogram.gamma(sites[i].distance_to(sites[j].x, sites[j].y)),
            (false, false) => 0.0,
            _ => 1.0,
        });

        let rhs = DVector::from_iterator(
            n + 1,
            sites.iter().map(|s| s.value).chain(std::iter::once(0.0)),
        );

        let alpha = a
            .lu()
            .solve(&rhs)
            .filter(|x| x.iter().all(|v| v.is_finite()))
            .ok_or_else(|| {
                HeatmapError::InterpolationError("kriging system is singular".to_string())
            })?;

        debug!(
            sites = n,
            slope = variogram.slope,
            nugget = variogram.nugget,
            "Fitted ordinary kriging model"
        );

        Ok(Self {
            sites,
            variogram,
            alpha,
        })
    }

    pub fn variogram(&self) -> LinearVariogram {
        self.variogram
    }
}

impl Interpolator for OrdinaryKriging {
    fn estimate(&self, x: f64, y: f64) -> f64 {
        let n = self.sites.len();
        let mut sum = self.alpha[n];
        for (site, alpha) in self.sites.iter().zip(self.alpha.iter()) {
            let d = site.distance_to(x, y);
            if d == 0.0 {
                return site.value;
            }
            sum += alpha * self.variogram.gamma(d);
        }
        sum
    }

    fn method(&self) -> InterpolationMethod {
        InterpolationMethod::Kriging
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sites() -> Vec<Site> {
        vec![
            Site::new(0.0, 0.0, 1.0),
            Site::new(1.0, 0.0, 3.0),
            Site::new(0.0, 1.0, 2.0),
            Site::new(1.0, 1.0, 6.0),
        ]
    }

    #[test]
    fn test_exact_at_sites() {
        let model = OrdinaryKriging::fit(sites()).unwrap();
        for s in sites() {
            assert!((model.estimate(s.x, s.y) - s.value).abs() < 1e-9);
        }
    }

    #[test]
    fn test_nugget_model_is_exact_at_sites() {
        let model = OrdinaryKriging::with_variogram(sites(), LinearVariogram::new(1.0, 0.5)).unwrap();
        assert_eq!(model.estimate(1.0, 1.0), 6.0);
        assert!(model.estimate(1e-9, 0.0).is_finite());
    }

    #[test]
    fn test_estimate_within_data_range_at_center() {
        let model = OrdinaryKriging::fit(sites()).unwrap();
        let v = model.estimate(0.5, 0.5);
        assert!(v > 1.0 && v < 6.0, "center estimate {} out of range", v);
    }

    #[test]
    fn test_flat_variogram_rejected() {
        let err = OrdinaryKriging::with_variogram(sites(), LinearVariogram::new(0.0, 0.0)).unwrap_err();
        assert!(matches!(err, HeatmapError::InterpolationError(_)));
    }

    #[test]
    fn test_single_site_rejected() {
        let err = OrdinaryKriging::fit(vec![Site::new(0.0, 0.0, 1.0)]).unwrap_err();
        assert!(matches!(err, HeatmapError::InterpolationError(_)));
    }
}
