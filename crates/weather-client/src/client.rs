//! Cached weather queries by city name.

use std::sync::Arc;
use std::time::Instant;

use bytes::Bytes;
use chrono::{NaiveDate, TimeZone, Utc};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use crate::cache::TtlCache;
use crate::config::WeatherConfig;
use crate::error::{WeatherError, WeatherResult};
use crate::layers::{map_layer_urls, MapLayer};

/// Geocoded city position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

/// Everything the realtime view needs in one payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RealtimeBundle {
    pub current: Value,
    pub forecast: Value,
    pub air_quality: Value,
}

/// A proxied map tile.
#[derive(Debug, Clone)]
pub struct Tile {
    pub bytes: Bytes,
    pub content_type: String,
    /// Upstream Cache-Control, passed through when present.
    pub cache_control: Option<String>,
}

/// Unix timestamps covering one UTC calendar day.
pub fn day_bounds_utc(date: &str) -> WeatherResult<(i64, i64)> {
    let day = NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| WeatherError::InvalidDate(date.to_string()))?;
    let start = day
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| WeatherError::InvalidDate(date.to_string()))?;
    let end = day
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| WeatherError::InvalidDate(date.to_string()))?;
    Ok((
        Utc.from_utc_datetime(&start).timestamp(),
        Utc.from_utc_datetime(&end).timestamp(),
    ))
}

/// Client for an OpenWeatherMap-compatible API.
///
/// Cheap to clone; clones share connection pools and caches.
#[derive(Clone)]
pub struct WeatherClient {
    http: Client,
    tile_http: Client,
    config: Arc<WeatherConfig>,
    coords_cache: Arc<TtlCache<Coordinates>>,
    bundle_cache: Arc<TtlCache<RealtimeBundle>>,
    forecast_cache: Arc<TtlCache<Value>>,
    history_cache: Arc<TtlCache<Value>>,
}

impl WeatherClient {
    pub fn new(config: WeatherConfig) -> WeatherResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .pool_max_idle_per_host(4)
            .build()
            .map_err(WeatherError::from_reqwest)?;

        let tile_http = Client::builder()
            .connect_timeout(config.tile_connect_timeout)
            .timeout(config.tile_timeout)
            .build()
            .map_err(WeatherError::from_reqwest)?;

        if config.api_key.is_empty() {
            warn!("Weather API key is empty; upstream requests will be rejected");
        }

        Ok(Self {
            http,
            tile_http,
            coords_cache: Arc::new(TtlCache::new("coords", config.weather_max_entries, config.weather_ttl)),
            bundle_cache: Arc::new(TtlCache::new("realtime", config.weather_max_entries, config.weather_ttl)),
            forecast_cache: Arc::new(TtlCache::new("forecast30", config.weather_max_entries, config.weather_ttl)),
            history_cache: Arc::new(TtlCache::new("history", config.history_max_entries, config.history_ttl)),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &WeatherConfig {
        &self.config
    }

    /// Look up the first geocoding match for a city name.
    #[instrument(skip(self))]
    pub async fn geocode(&self, city: &str) -> WeatherResult<Coordinates> {
        if let Some(coords) = self.coords_cache.get(city).await {
            return Ok(coords);
        }

        let url = format!("{}/geo/1.0/direct", self.config.geo_base_url);
        let matches: Vec<Coordinates> = self
            .get_json(&url, &[("q", city.to_string()), ("limit", "1".to_string())])
            .await?;

        let coords = matches
            .into_iter()
            .next()
            .ok_or_else(|| WeatherError::CityNotFound(city.to_string()))?;

        self.coords_cache.put(city, coords).await;
        Ok(coords)
    }

    /// Current conditions, 5-day forecast and air quality for a city.
    #[instrument(skip(self))]
    pub async fn realtime_bundle(&self, city: &str) -> WeatherResult<RealtimeBundle> {
        if let Some(bundle) = self.bundle_cache.get(city).await {
            debug!(city = %city, "Realtime bundle served from cache");
            return Ok(bundle);
        }

        let coords = self.geocode(city).await?;
        let base = &self.config.data_base_url;
        let params = Self::metric_params(coords);

        let weather_url = format!("{}/data/2.5/weather", base);
        let forecast_url = format!("{}/data/2.5/forecast", base);
        let air_url = format!("{}/data/2.5/air_pollution", base);
        let (current, forecast, air_quality) = tokio::try_join!(
            self.get_json::<Value>(&weather_url, &params),
            self.get_json::<Value>(&forecast_url, &params),
            self.get_json::<Value>(&air_url, &params),
        )?;

        let bundle = RealtimeBundle {
            current,
            forecast,
            air_quality,
        };
        self.bundle_cache.put(city, bundle.clone()).await;
        Ok(bundle)
    }

    /// Hourly history for one UTC day (`YYYY-MM-DD`).
    #[instrument(skip(self))]
    pub async fn history(&self, city: &str, date: &str) -> WeatherResult<Value> {
        let cache_key = format!("{}:{}", city, date);
        if let Some(data) = self.history_cache.get(&cache_key).await {
            debug!(city = %city, date = %date, "History served from cache");
            return Ok(data);
        }

        let (start, end) = day_bounds_utc(date)?;
        let coords = self.geocode(city).await?;

        let url = format!("{}/data/2.5/history/city", self.config.history_base_url);
        let mut params = Self::metric_params(coords);
        params.push(("type", "hour".to_string()));
        params.push(("start", start.to_string()));
        params.push(("end", end.to_string()));

        let data: Value = self.get_json(&url, &params).await?;
        self.history_cache.put(cache_key, data.clone()).await;
        Ok(data)
    }

    /// 30-day climate forecast for a city.
    #[instrument(skip(self))]
    pub async fn forecast_30d(&self, city: &str) -> WeatherResult<Value> {
        if let Some(data) = self.forecast_cache.get(city).await {
            return Ok(data);
        }

        let coords = self.geocode(city).await?;
        let url = format!("{}/data/2.5/forecast/climate", self.config.pro_base_url);
        let data: Value = self.get_json(&url, &Self::metric_params(coords)).await?;

        self.forecast_cache.put(city, data.clone()).await;
        Ok(data)
    }

    /// Tile URL templates keyed by layer name.
    pub fn map_layer_urls(&self) -> std::collections::BTreeMap<&'static str, String> {
        map_layer_urls(&self.config.maps_base_url, &self.config.api_key)
    }

    /// Fetch one map tile. Not cached; upstream Cache-Control is passed on.
    #[instrument(skip(self))]
    pub async fn fetch_tile(&self, op: &str, z: u32, x: u32, y: u32) -> WeatherResult<Tile> {
        let layer = MapLayer::from_op(op)?;
        let url = format!(
            "{}/maps/2.0/weather/{}/{}/{}/{}",
            self.config.maps_base_url,
            layer.op(),
            z,
            x,
            y
        );

        let start = Instant::now();
        let response = self
            .tile_http
            .get(&url)
            .query(&[("appid", self.config.api_key.as_str())])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                let err = WeatherError::from_reqwest(e);
                warn!(url = %url, error = %err, "Tile fetch failed");
                err
            })?;

        let headers = response.headers();
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/png")
            .to_string();
        let cache_control = headers
            .get(header::CACHE_CONTROL)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let bytes = response.bytes().await.map_err(WeatherError::from_reqwest)?;

        debug!(
            layer = layer.name(),
            z, x, y,
            bytes = bytes.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetched map tile"
        );

        Ok(Tile {
            bytes,
            content_type,
            cache_control,
        })
    }

    /// Hit rate (percent) of every cache, by cache name.
    pub fn cache_hit_rates(&self) -> [(&'static str, f64); 4] {
        [
            (self.coords_cache.name(), self.coords_cache.stats().hit_rate()),
            (self.bundle_cache.name(), self.bundle_cache.stats().hit_rate()),
            (self.forecast_cache.name(), self.forecast_cache.stats().hit_rate()),
            (self.history_cache.name(), self.history_cache.stats().hit_rate()),
        ]
    }

    pub fn log_cache_stats(&self) {
        for (name, rate) in self.cache_hit_rates() {
            info!(cache = name, hit_rate = rate, "Weather cache stats");
        }
    }

    fn metric_params(coords: Coordinates) -> Vec<(&'static str, String)> {
        vec![
            ("lat", coords.lat.to_string()),
            ("lon", coords.lon.to_string()),
            ("units", "metric".to_string()),
            ("lang", "zh_cn".to_string()),
        ]
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, params: &[(&'static str, String)]) -> WeatherResult<T> {
        let start = Instant::now();
        let response = self
            .http
            .get(url)
            .query(params)
            .query(&[("appid", self.config.api_key.as_str())])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| {
                let err = WeatherError::from_reqwest(e);
                warn!(url = %url, error = %err, "Weather request failed");
                err
            })?;

        let body = response.bytes().await.map_err(WeatherError::from_reqwest)?;
        let data = serde_json::from_slice(&body).map_err(|e| WeatherError::Decode(e.to_string()))?;

        debug!(
            url = %url,
            bytes = body.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Weather request completed"
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_day_bounds_utc() {
        let (start, end) = day_bounds_utc("2024-01-02").unwrap();
        assert_eq!(start, 1_704_153_600);
        assert_eq!(end - start, 86_399);
    }

    #[test]
    fn test_bad_dates() {
        assert!(matches!(day_bounds_utc("2024-02-30"), Err(WeatherError::InvalidDate(_))));
        assert!(matches!(day_bounds_utc("02/01/2024"), Err(WeatherError::InvalidDate(_))));
        assert!(matches!(day_bounds_utc(""), Err(WeatherError::InvalidDate(_))));
    }
}
