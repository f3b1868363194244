//! Sample preparation shared by all interpolation methods.

use heatmap_common::SamplePoint;

/// A distinct sample location with its (merged) value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Site {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

impl Site {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }

    pub fn distance_to(&self, x: f64, y: f64) -> f64 {
        (self.x - x).hypot(self.y - y)
    }
}

/// Drop non-finite samples and merge samples sharing a location.
///
/// Merged sites take the mean of their values. Sites keep the order of the
/// first sample at each location.
pub fn distinct_sites(points: &[SamplePoint]) -> Vec<Site> {
    let mut sites: Vec<(Site, usize)> = Vec::with_capacity(points.len());

    for p in points.iter().filter(|p| p.is_finite()) {
        match sites.iter_mut().find(|(s, _)| s.x == p.x && s.y == p.y) {
            Some((site, count)) => {
                site.value += p.value;
                *count += 1;
            }
            None => sites.push((Site::new(p.x, p.y, p.value), 1)),
        }
    }

    sites
        .into_iter()
        .map(|(mut site, count)| {
            site.value /= count as f64;
            site
        })
        .collect()
}

/// The shared value when every site carries the same value.
pub fn uniform_value(sites: &[Site]) -> Option<f64> {
    let first = sites.first()?.value;
    sites.iter().all(|s| s.value == first).then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_are_averaged() {
        let pts = vec![
            SamplePoint::new(1.0, 1.0, 10.0),
            SamplePoint::new(2.0, 2.0, 5.0),
            SamplePoint::new(1.0, 1.0, 20.0),
        ];
        let sites = distinct_sites(&pts);
        assert_eq!(sites.len(), 2);
        assert_eq!(sites[0], Site::new(1.0, 1.0, 15.0));
    }

    #[test]
    fn test_non_finite_dropped() {
        let pts = vec![SamplePoint::new(f64::NAN, 1.0, 1.0), SamplePoint::new(0.0, 0.0, f64::INFINITY)];
        assert!(distinct_sites(&pts).is_empty());
    }

    #[test]
    fn test_uniform_value() {
        assert_eq!(uniform_value(&[Site::new(0.0, 0.0, 3.0), Site::new(1.0, 0.0, 3.0)]), Some(3.0));
        assert_eq!(uniform_value(&[Site::new(0.0, 0.0, 3.0), Site::new(1.0, 0.0, 4.0)]), None);
    }
}
