//! Common types and utilities shared across the heatmap crates and services.

pub mod bbox;
pub mod error;
pub mod options;
pub mod sample;

pub use bbox::{BoundingRegion, DisplayExtent};
pub use error::{HeatmapError, HeatmapResult};
pub use options::{ExtentSpec, InterpolationMethod, RenderOptions, DEFAULT_COLOR_SCALE, DEFAULT_REGION};
pub use sample::SamplePoint;
