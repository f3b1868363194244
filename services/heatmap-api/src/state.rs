//! Application state for the heatmap API.

use anyhow::{Context, Result};

use region_assets::RegionAssetStore;
use renderer::RenderStyle;
use weather_client::WeatherClient;

use crate::config::ServiceConfig;
use crate::upload_store::UploadStore;

/// Shared application state.
pub struct AppState {
    pub config: ServiceConfig,

    /// Read-only region boundaries and layers.
    pub assets: RegionAssetStore,

    /// Latest map upload per session.
    pub uploads: UploadStore,

    /// Cached weather upstream.
    pub weather: WeatherClient,

    /// Figure configuration handed to every render.
    pub render_style: RenderStyle,
}

impl AppState {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        config.validate()?;

        let weather = WeatherClient::new(config.weather.clone()).context("Failed to create weather client")?;

        Ok(Self {
            assets: RegionAssetStore::new(&config.assets_dir),
            uploads: UploadStore::new(config.upload_max_sessions, config.upload_ttl),
            render_style: config.render_style(),
            weather,
            config,
        })
    }
}
