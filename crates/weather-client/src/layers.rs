//! Weather map tile layers.

use std::collections::BTreeMap;

use crate::error::{WeatherError, WeatherResult};

/// Tile layers offered by the maps 2.0 API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapLayer {
    Precipitation,
    Temperature,
    Clouds,
    WindSpeed,
    Pressure,
}

impl MapLayer {
    pub const ALL: [MapLayer; 5] = [
        MapLayer::Precipitation,
        MapLayer::Temperature,
        MapLayer::Clouds,
        MapLayer::WindSpeed,
        MapLayer::Pressure,
    ];

    /// Upstream operation code.
    pub fn op(&self) -> &'static str {
        match self {
            MapLayer::Precipitation => "PR0",
            MapLayer::Temperature => "TA2",
            MapLayer::Clouds => "CL",
            MapLayer::WindSpeed => "WS10",
            MapLayer::Pressure => "APM",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MapLayer::Precipitation => "precipitation",
            MapLayer::Temperature => "temperature",
            MapLayer::Clouds => "clouds",
            MapLayer::WindSpeed => "wind_speed",
            MapLayer::Pressure => "pressure",
        }
    }

    /// Parse an operation code; codes are case-sensitive.
    pub fn from_op(op: &str) -> WeatherResult<Self> {
        MapLayer::ALL
            .into_iter()
            .find(|l| l.op() == op)
            .ok_or_else(|| WeatherError::InvalidLayer(op.to_string()))
    }

    /// Tile URL template with literal `{z}/{x}/{y}` placeholders.
    pub fn url_template(&self, maps_base_url: &str, api_key: &str) -> String {
        format!(
            "{}/maps/2.0/weather/{}/{{z}}/{{x}}/{{y}}?appid={}",
            maps_base_url.trim_end_matches('/'),
            self.op(),
            api_key
        )
    }
}

/// Layer name to URL template, for client-side map libraries.
pub fn map_layer_urls(maps_base_url: &str, api_key: &str) -> BTreeMap<&'static str, String> {
    MapLayer::ALL
        .iter()
        .map(|l| (l.name(), l.url_template(maps_base_url, api_key)))
        .collect()
}
