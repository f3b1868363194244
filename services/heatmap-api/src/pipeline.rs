//! Heatmap generation: samples and options in, base64 PNG out.
//!
//! Stages run synchronously on the calling thread:
//! 1. load the region boundary
//! 2. interpolate over the boundary's bounding region
//! 3. load the requested layers (missing ones are skipped)
//! 4. composite and encode
//!
//! Callers on the async runtime should use `tokio::task::spawn_blocking`.

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::{info, warn};

use heatmap_common::{HeatmapError, HeatmapResult, RenderOptions, SamplePoint};
use interpolation::interpolate;
use region_assets::RegionAssetStore;
use renderer::{encode_base64, encode_png, render, RenderStyle};

pub const STAGE_DURATION: &str = "heatmap_stage_duration_seconds";
pub const REQUESTS_TOTAL: &str = "heatmap_requests_total";

/// Register metric descriptions with the installed recorder.
pub fn describe_metrics() {
    describe_histogram!(STAGE_DURATION, "Time spent in each heatmap pipeline stage");
    describe_counter!(REQUESTS_TOTAL, "Heatmap generation outcomes by status");
}

/// Reject options that would be refused later or are too expensive.
pub fn validate_options(options: &RenderOptions, max_resolution: usize) -> HeatmapResult<()> {
    if options.grid_resolution > max_resolution {
        return Err(HeatmapError::InputMalformed(format!(
            "grid_resolution {} exceeds the maximum of {}",
            options.grid_resolution, max_resolution
        )));
    }
    if !options.point_size.is_finite() || options.point_size < 0.0 {
        return Err(HeatmapError::InputMalformed(format!(
            "point_size must be a non-negative number, got {}",
            options.point_size
        )));
    }
    if options.has_custom_extent() && !options.display_extent().is_valid() {
        return Err(HeatmapError::InputMalformed(format!(
            "extent must satisfy xmin < xmax and ymin < ymax, got {:?}",
            options.display_extent()
        )));
    }
    Ok(())
}

fn timed<T>(stage: &'static str, f: impl FnOnce() -> HeatmapResult<T>) -> HeatmapResult<T> {
    let start = Instant::now();
    let result = f();
    histogram!(STAGE_DURATION, "stage" => stage).record(start.elapsed().as_secs_f64());
    result
}

/// Run the whole pipeline and return the figure as base64 PNG.
pub fn generate_heatmap(
    store: &RegionAssetStore,
    samples: &[SamplePoint],
    options: &RenderOptions,
    style: &RenderStyle,
) -> HeatmapResult<String> {
    let start = Instant::now();
    let result = run_stages(store, samples, options, style);

    let status = match &result {
        Ok(_) => "success",
        Err(e) => e.kind(),
    };
    counter!(REQUESTS_TOTAL, "status" => status).increment(1);
    histogram!(STAGE_DURATION, "stage" => "total").record(start.elapsed().as_secs_f64());

    match &result {
        Ok(b64) => info!(
            region = %options.city,
            method = %options.interpolation_method,
            resolution = options.grid_resolution,
            samples = samples.len(),
            bytes = b64.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Heatmap generated"
        ),
        Err(e) => warn!(
            region = %options.city,
            method = %options.interpolation_method,
            error = %e,
            kind = e.kind(),
            "Heatmap generation failed"
        ),
    }
    result
}

fn run_stages(
    store: &RegionAssetStore,
    samples: &[SamplePoint],
    options: &RenderOptions,
    style: &RenderStyle,
) -> HeatmapResult<String> {
    let boundary = timed("boundary", || store.load_boundary(&options.city))?;
    let region = boundary.bounding_region();

    let grid = timed("interpolate", || {
        interpolate(samples, &region, options.grid_resolution, options.interpolation_method)
    })?;

    let layers = timed("layers", || store.load_layers(&options.city, &options.map_layers))?;

    let image = timed("render", || render(&grid, &boundary, &layers, samples, options, style))?;

    timed("encode", || {
        let png = encode_png(&image)?;
        Ok(encode_base64(&png))
    })
}
