//! Upstream endpoints, credentials and cache sizing.

use std::time::Duration;

/// Weather client configuration.
#[derive(Debug, Clone)]
pub struct WeatherConfig {
    pub api_key: String,
    /// Geocoding host (`/geo/1.0/direct`).
    pub geo_base_url: String,
    /// Current weather, 5-day forecast and air pollution host.
    pub data_base_url: String,
    /// Hourly history host.
    pub history_base_url: String,
    /// Climate (30-day) forecast host.
    pub pro_base_url: String,
    /// Map tile host.
    pub maps_base_url: String,
    pub request_timeout: Duration,
    pub tile_connect_timeout: Duration,
    pub tile_timeout: Duration,
    /// TTL of coordinates, realtime bundles and 30-day forecasts.
    pub weather_ttl: Duration,
    pub weather_max_entries: usize,
    pub history_ttl: Duration,
    pub history_max_entries: usize,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            geo_base_url: "http://api.openweathermap.org".to_string(),
            data_base_url: "https://api.openweathermap.org".to_string(),
            history_base_url: "https://history.openweathermap.org".to_string(),
            pro_base_url: "https://pro.openweathermap.org".to_string(),
            maps_base_url: "https://maps.openweathermap.org".to_string(),
            request_timeout: Duration::from_secs(30),
            tile_connect_timeout: Duration::from_secs(3),
            tile_timeout: Duration::from_secs(10),
            weather_ttl: Duration::from_secs(900),
            weather_max_entries: 128,
            history_ttl: Duration::from_secs(6 * 3600),
            history_max_entries: 256,
        }
    }
}

impl WeatherConfig {
    pub fn with_api_key(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Point every upstream at a single host, e.g. a local stub server.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/').to_string();
        self.geo_base_url = base.clone();
        self.data_base_url = base.clone();
        self.history_base_url = base.clone();
        self.pro_base_url = base.clone();
        self.maps_base_url = base;
        self
    }
}
