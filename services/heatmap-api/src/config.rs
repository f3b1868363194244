//! Service configuration.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use renderer::RenderStyle;
use weather_client::WeatherConfig;

/// Runtime configuration for the heatmap API.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Root of the region asset store.
    pub assets_dir: PathBuf,
    /// Map area width of rendered figures, in pixels.
    pub canvas_width: u32,
    /// Largest accepted `grid_resolution`.
    pub max_resolution: usize,
    pub upload_ttl: Duration,
    pub upload_max_sessions: usize,
    /// Maximum request body size in bytes.
    pub body_limit_bytes: usize,
    pub weather: WeatherConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            assets_dir: PathBuf::from("assets/regions"),
            canvas_width: 1200,
            max_resolution: 1000,
            upload_ttl: Duration::from_secs(24 * 3600),
            upload_max_sessions: 1024,
            body_limit_bytes: 32 * 1024 * 1024,
            weather: WeatherConfig::default(),
        }
    }
}

impl ServiceConfig {
    /// Figure configuration derived from this service configuration.
    pub fn render_style(&self) -> RenderStyle {
        RenderStyle::with_map_width(self.canvas_width)
    }

    pub fn validate(&self) -> Result<()> {
        if self.canvas_width < 16 {
            bail!("canvas width must be at least 16 pixels, got {}", self.canvas_width);
        }
        if self.max_resolution < 2 {
            bail!("max resolution must be at least 2, got {}", self.max_resolution);
        }
        if self.upload_max_sessions == 0 {
            bail!("upload session limit must be positive");
        }
        if !self.assets_dir.is_dir() {
            tracing::warn!(
                path = %self.assets_dir.display(),
                "Region asset directory does not exist; every heatmap request will fail"
            );
        }
        Ok(())
    }
}
