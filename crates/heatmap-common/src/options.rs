//! Caller-supplied heatmap rendering options.

use serde::{Deserialize, Serialize};

use crate::bbox::DisplayExtent;

/// Region used when the caller does not name one.
pub const DEFAULT_REGION: &str = "taiyuangeo";

/// Color scale used when the caller does not name one.
pub const DEFAULT_COLOR_SCALE: &str = "classic_custom";

/// Default grid resolution (cells per axis).
pub const DEFAULT_GRID_RESOLUTION: usize = 200;

/// Default sample marker area in pt².
pub const DEFAULT_POINT_SIZE: f64 = 20.0;

/// Spatial interpolation algorithm.
///
/// Any unrecognized value (unknown names, `null`, numbers) deserializes to
/// `Kriging`, the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "serde_json::Value")]
pub enum InterpolationMethod {
    #[default]
    Kriging,
    Rbf,
}

impl InterpolationMethod {
    /// Parse a method name, falling back to kriging for anything unknown.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "rbf" => InterpolationMethod::Rbf,
            "kriging" => InterpolationMethod::Kriging,
            other => {
                tracing::debug!(method = %other, "Unknown interpolation method, using kriging");
                InterpolationMethod::Kriging
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            InterpolationMethod::Kriging => "kriging",
            InterpolationMethod::Rbf => "rbf",
        }
    }
}

impl From<String> for InterpolationMethod {
    fn from(s: String) -> Self {
        InterpolationMethod::parse(&s)
    }
}

impl From<serde_json::Value> for InterpolationMethod {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::String(s) => InterpolationMethod::parse(&s),
            other => {
                tracing::debug!(method = %other, "Non-string interpolation method, using kriging");
                InterpolationMethod::Kriging
            }
        }
    }
}

impl std::fmt::Display for InterpolationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extent as sent by callers; only honored when all four bounds are present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtentSpec {
    pub xmin: Option<f64>,
    pub xmax: Option<f64>,
    pub ymin: Option<f64>,
    pub ymax: Option<f64>,
}

impl ExtentSpec {
    pub fn complete(&self) -> Option<DisplayExtent> {
        Some(DisplayExtent::new(self.xmin?, self.xmax?, self.ymin?, self.ymax?))
    }
}

impl From<DisplayExtent> for ExtentSpec {
    fn from(e: DisplayExtent) -> Self {
        Self {
            xmin: Some(e.xmin),
            xmax: Some(e.xmax),
            ymin: Some(e.ymin),
            ymax: Some(e.ymax),
        }
    }
}

/// Options bundle for a single heatmap request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// Region id in the asset store.
    #[serde(alias = "region")]
    pub city: String,
    pub grid_resolution: usize,
    pub interpolation_method: InterpolationMethod,
    pub colormap: String,
    pub map_layers: Vec<String>,
    pub show_points: bool,
    pub point_size: f64,
    pub extent: Option<ExtentSpec>,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            city: DEFAULT_REGION.to_string(),
            grid_resolution: DEFAULT_GRID_RESOLUTION,
            interpolation_method: InterpolationMethod::default(),
            colormap: DEFAULT_COLOR_SCALE.to_string(),
            map_layers: Vec::new(),
            show_points: false,
            point_size: DEFAULT_POINT_SIZE,
            extent: None,
        }
    }
}

impl RenderOptions {
    /// Parse the `options` form field. An empty string means all defaults.
    pub fn from_json(json_str: &str) -> Result<Self, serde_json::Error> {
        if json_str.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(json_str)
    }

    /// The window to display: the caller's complete extent, or the fixed default.
    pub fn display_extent(&self) -> DisplayExtent {
        self.extent
            .as_ref()
            .and_then(ExtentSpec::complete)
            .unwrap_or_default()
    }

    /// True when the caller supplied a complete extent.
    pub fn has_custom_extent(&self) -> bool {
        self.extent.as_ref().and_then(ExtentSpec::complete).is_some()
    }
}
