use thiserror::Error;

pub type WeatherResult<T> = Result<T, WeatherError>;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("City not found: {0}")]
    CityNotFound(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Invalid layer code: {0}")]
    InvalidLayer(String),

    #[error("Upstream timeout: {0}")]
    Timeout(String),

    #[error("Upstream request failed: {0}")]
    Upstream(String),

    #[error("Failed to decode upstream response: {0}")]
    Decode(String),
}

impl WeatherError {
    /// Classify a transport or status error from reqwest.
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            WeatherError::Timeout(err.to_string())
        } else if err.is_decode() {
            WeatherError::Decode(err.to_string())
        } else {
            WeatherError::Upstream(err.to_string())
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WeatherError::CityNotFound(_) => "city_not_found",
            WeatherError::InvalidDate(_) => "invalid_date",
            WeatherError::InvalidLayer(_) => "invalid_layer",
            WeatherError::Timeout(_) => "timeout",
            WeatherError::Upstream(_) => "upstream",
            WeatherError::Decode(_) => "decode",
        }
    }

    /// Status used by the tile proxy.
    pub fn http_status_code(&self) -> u16 {
        match self {
            WeatherError::CityNotFound(_) => 404,
            WeatherError::InvalidDate(_) | WeatherError::InvalidLayer(_) => 400,
            WeatherError::Timeout(_) => 504,
            WeatherError::Upstream(_) | WeatherError::Decode(_) => 502,
        }
    }
}
