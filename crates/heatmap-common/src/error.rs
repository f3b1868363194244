//! Error types for the heatmap pipeline.

use thiserror::Error;

/// Result type alias using HeatmapError.
pub type HeatmapResult<T> = Result<T, HeatmapError>;

/// Primary error type for heatmap generation.
///
/// Every pipeline stage returns one of these; the HTTP boundary maps them to
/// a uniform JSON failure and keeps the detail in the logs.
#[derive(Debug, Error)]
pub enum HeatmapError {
    // === Asset Errors ===
    #[error("Boundary not found for region '{region}': {message}")]
    AssetMissing { region: String, message: String },

    // === Input Errors ===
    #[error("Missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("Malformed input: {0}")]
    InputMalformed(String),

    // === Algorithm Errors ===
    #[error("Interpolation failed: {0}")]
    InterpolationError(String),

    // === Rendering Errors ===
    #[error("Rendering failed: {0}")]
    RenderError(String),

    #[error("Image encoding failed: {0}")]
    EncodeError(String),
}

impl HeatmapError {
    pub fn asset_missing(region: impl Into<String>, message: impl Into<String>) -> Self {
        HeatmapError::AssetMissing {
            region: region.into(),
            message: message.into(),
        }
    }

    /// Short machine-readable category, used as a metrics label.
    pub fn kind(&self) -> &'static str {
        match self {
            HeatmapError::AssetMissing { .. } => "asset_missing",
            HeatmapError::MissingColumns(_) | HeatmapError::InputMalformed(_) => "input_malformed",
            HeatmapError::InterpolationError(_) => "interpolation",
            HeatmapError::RenderError(_) | HeatmapError::EncodeError(_) => "render",
        }
    }

    /// Get the HTTP status code for this error.
    pub fn http_status_code(&self) -> u16 {
        match self {
            HeatmapError::MissingColumns(_) | HeatmapError::InputMalformed(_) => 400,
            HeatmapError::AssetMissing { .. } => 404,
            HeatmapError::InterpolationError(_) => 422,
            HeatmapError::RenderError(_) | HeatmapError::EncodeError(_) => 500,
        }
    }

    /// Message safe to return to API callers.
    ///
    /// Rendering failures collapse to one generic message; the rest are
    /// descriptive because they describe the caller's own input.
    pub fn client_message(&self) -> String {
        match self {
            HeatmapError::RenderError(_) | HeatmapError::EncodeError(_) => {
                "Failed to generate heatmap, check the server logs".to_string()
            }
            other => other.to_string(),
        }
    }
}

impl From<serde_json::Error> for HeatmapError {
    fn from(err: serde_json::Error) -> Self {
        HeatmapError::InputMalformed(format!("JSON error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_columns_message_names_fields() {
        let err = HeatmapError::MissingColumns(vec!["lng".to_string(), "name".to_string()]);
        assert_eq!(err.to_string(), "Missing required columns: lng, name");
        assert_eq!(err.http_status_code(), 400);
    }

    #[test]
    fn test_render_errors_are_generic_for_clients() {
        let err = HeatmapError::RenderError("pixmap allocation failed".to_string());
        assert!(!err.client_message().contains("pixmap"));
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.kind(), "render");
    }

    #[test]
    fn test_asset_missing_mentions_region() {
        let err = HeatmapError::asset_missing("regionB", "boundary.geojson does not exist");
        assert!(err.client_message().contains("regionB"));
        assert!(err.client_message().contains("Boundary"));
        assert_eq!(err.http_status_code(), 404);
    }
}
