//! Weather data pass-through for the dashboard.
//!
//! Wraps an OpenWeatherMap-compatible API:
//! - City geocoding, realtime bundle, hourly history and 30-day forecast,
//!   each behind an LRU + TTL cache
//! - Map tile URL templates and a tile proxy that keeps the API key server-side
//!
//! Requests are never retried; failures surface as [`WeatherError`].

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod layers;

pub use cache::{CacheStats, TtlCache};
pub use client::{day_bounds_utc, Coordinates, RealtimeBundle, Tile, WeatherClient};
pub use config::WeatherConfig;
pub use error::{WeatherError, WeatherResult};
pub use layers::{map_layer_urls, MapLayer};
