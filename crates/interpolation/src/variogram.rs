//! Linear variogram model and its fit to the experimental semivariogram.

use crate::samples::Site;

/// Number of lag bins used for the experimental semivariogram.
pub const LAG_BINS: usize = 6;

/// Linear variogram `γ(h) = slope·h + nugget`.
///
/// `γ(0)` is zero by definition; the nugget only applies to positive lags.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearVariogram {
    pub slope: f64,
    pub nugget: f64,
}

impl LinearVariogram {
    pub fn new(slope: f64, nugget: f64) -> Self {
        Self { slope, nugget }
    }

    pub fn gamma(&self, h: f64) -> f64 {
        if h <= 0.0 {
            0.0
        } else {
            self.slope * h + self.nugget
        }
    }

    /// True when the model is identically zero.
    pub fn is_flat(&self) -> bool {
        self.slope == 0.0 && self.nugget == 0.0
    }

    /// Fit to the binned experimental semivariogram of `sites`.
    ///
    /// Pair distances are split into [`LAG_BINS`] equal bins between the
    /// smallest and largest distance; each non-empty bin contributes its mean
    /// lag and mean semivariance `½(zᵢ − zⱼ)²`. Least squares with
    /// `slope ≥ 0` and `nugget ≥ 0`.
    pub fn fit(sites: &[Site]) -> Self {
        let lags = experimental_semivariogram(sites);
        fit_constrained(&lags)
    }
}

/// `(mean lag, mean semivariance)` for every non-empty lag bin.
pub fn experimental_semivariogram(sites: &[Site]) -> Vec<(f64, f64)> {
    let mut pairs = Vec::with_capacity(sites.len() * sites.len().saturating_sub(1) / 2);
    for (i, a) in sites.iter().enumerate() {
        for b in &sites[i + 1..] {
            let d = (a.x - b.x).hypot(a.y - b.y);
            let g = 0.5 * (a.value - b.value).powi(2);
            pairs.push((d, g));
        }
    }

    if pairs.is_empty() {
        return Vec::new();
    }

    let dmin = pairs.iter().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let dmax = pairs.iter().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let width = (dmax - dmin) / LAG_BINS as f64;

    let mut sums = [(0.0f64, 0.0f64, 0usize); LAG_BINS];
    for (d, g) in pairs {
        let bin = if width > 0.0 {
            (((d - dmin) / width).floor() as usize).min(LAG_BINS - 1)
        } else {
            0
        };
        sums[bin].0 += d;
        sums[bin].1 += g;
        sums[bin].2 += 1;
    }

    sums.iter()
        .filter(|(_, _, n)| *n > 0)
        .map(|(d, g, n)| (d / *n as f64, g / *n as f64))
        .collect()
}

fn fit_constrained(lags: &[(f64, f64)]) -> LinearVariogram {
    match lags {
        [] => LinearVariogram::new(0.0, 0.0),
        [(h, g)] => {
            if *h > 0.0 {
                LinearVariogram::new((g / h).max(0.0), 0.0)
            } else {
                LinearVariogram::new(0.0, g.max(0.0))
            }
        }
        _ => {
            let n = lags.len() as f64;
            let mean_h = lags.iter().map(|l| l.0).sum::<f64>() / n;
            let mean_g = lags.iter().map(|l| l.1).sum::<f64>() / n;
            let sxx: f64 = lags.iter().map(|l| (l.0 - mean_h).powi(2)).sum();
            let sxy: f64 = lags.iter().map(|l| (l.0 - mean_h) * (l.1 - mean_g)).sum();

            let (mut slope, mut nugget) = if sxx > 0.0 {
                let slope = sxy / sxx;
                (slope, mean_g - slope * mean_h)
            } else {
                (0.0, mean_g)
            };

            if nugget < 0.0 {
                // Regression through the origin
                let raw_xx: f64 = lags.iter().map(|l| l.0 * l.0).sum();
                let raw_xy: f64 = lags.iter().map(|l| l.0 * l.1).sum();
                nugget = 0.0;
                slope = if raw_xx > 0.0 { raw_xy / raw_xx } else { 0.0 };
            }
            if slope < 0.0 {
                slope = 0.0;
                nugget = mean_g;
            }

            LinearVariogram::new(slope.max(0.0), nugget.max(0.0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gamma_zero_at_origin() {
        let v = LinearVariogram::new(2.0, 0.5);
        assert_eq!(v.gamma(0.0), 0.0);
        assert_eq!(v.gamma(1.0), 2.5);
    }

    #[test]
    fn test_fit_exact_line() {
        let lags = vec![(1.0, 3.0), (2.0, 5.0), (3.0, 7.0)];
        let v = fit_constrained(&lags);
        assert!((v.slope - 2.0).abs() < 1e-12);
        assert!((v.nugget - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_fit_negative_intercept_goes_through_origin() {
        let lags = vec![(1.0, 0.0), (2.0, 4.0), (3.0, 8.0)];
        let v = fit_constrained(&lags);
        assert_eq!(v.nugget, 0.0);
        assert!(v.slope > 0.0);
    }

    #[test]
    fn test_fit_decreasing_is_flat_nugget() {
        let lags = vec![(1.0, 6.0), (2.0, 4.0), (3.0, 2.0)];
        let v = fit_constrained(&lags);
        assert_eq!(v.slope, 0.0);
        assert!((v.nugget - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_semivariogram_bins() {
        let sites = vec![
            Site::new(0.0, 0.0, 0.0),
            Site::new(1.0, 0.0, 2.0),
            Site::new(3.0, 0.0, 4.0),
        ];
        let lags = experimental_semivariogram(&sites);
        // Distances 1, 2, 3 fall in the first, middle and last bins
        assert_eq!(lags.len(), 3);
        assert_eq!(lags[0], (1.0, 2.0));
        assert_eq!(lags[2], (3.0, 8.0));
    }
}
