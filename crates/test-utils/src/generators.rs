//! Test data generators for synthetic measurement samples.
//!
//! These generators create predictable, verifiable sample sets and upload
//! tables that can be used across the test suite.

use heatmap_common::SamplePoint;

/// Five samples spread over `REGION_A`, with distinct values.
pub fn five_samples() -> Vec<SamplePoint> {
    vec![
        SamplePoint::new(111.95, 37.60, 35.0),
        SamplePoint::new(112.60, 37.65, 80.0),
        SamplePoint::new(112.30, 37.85, 55.0),
        SamplePoint::new(112.00, 38.10, 20.0),
        SamplePoint::new(112.70, 38.05, 110.0),
    ]
}

/// Samples on an `n × n` lattice over the box with values from `f(x, y)`.
///
/// # Example
///
/// ```
/// use test_utils::lattice_samples;
///
/// let pts = lattice_samples(3, (0.0, 0.0, 2.0, 2.0), |x, y| x + y);
/// assert_eq!(pts.len(), 9);
/// assert_eq!(pts[8].value, 4.0);
/// ```
pub fn lattice_samples<F>(n: usize, (xmin, ymin, xmax, ymax): (f64, f64, f64, f64), f: F) -> Vec<SamplePoint>
where
    F: Fn(f64, f64) -> f64,
{
    let step = |min: f64, max: f64, i: usize| {
        if n <= 1 {
            min
        } else {
            min + (max - min) * i as f64 / (n - 1) as f64
        }
    };

    let mut points = Vec::with_capacity(n * n);
    for j in 0..n {
        for i in 0..n {
            let x = step(xmin, xmax, i);
            let y = step(ymin, ymax, j);
            points.push(SamplePoint::new(x, y, f(x, y)));
        }
    }
    points
}

/// Deterministic pseudo-scattered samples inside the box.
///
/// Uses a fixed linear congruential sequence so runs are reproducible.
pub fn scattered_samples(count: usize, (xmin, ymin, xmax, ymax): (f64, f64, f64, f64), seed: u64) -> Vec<SamplePoint> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut next = || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 11) as f64) / ((1u64 << 53) as f64)
    };

    (0..count)
        .map(|_| {
            let x = xmin + (xmax - xmin) * next();
            let y = ymin + (ymax - ymin) * next();
            let value = 10.0 + 90.0 * next();
            SamplePoint::new(x, y, value)
        })
        .collect()
}

/// Build a CSV document from a header row and data rows.
pub fn csv_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut out = headers.join(",");
    out.push('\n');
    for row in rows {
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

/// CSV upload with Chinese headers (`经度,纬度,污染物浓度,标记名称`).
pub fn samples_csv_zh(samples: &[SamplePoint]) -> String {
    csv_table(&["经度", "纬度", "污染物浓度", "标记名称"], &sample_rows(samples))
}

/// CSV upload with English headers (`lng,lat,concentration,name`).
pub fn samples_csv_en(samples: &[SamplePoint]) -> String {
    csv_table(&["lng", "lat", "concentration", "name"], &sample_rows(samples))
}

fn sample_rows(samples: &[SamplePoint]) -> Vec<Vec<String>> {
    samples
        .iter()
        .enumerate()
        .map(|(i, p)| {
            vec![
                p.x.to_string(),
                p.y.to_string(),
                p.value.to_string(),
                format!("site-{}", i + 1),
            ]
        })
        .collect()
}
