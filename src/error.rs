//! Error types shared across the service.

/// Errors raised while loading or validating configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Reading the config file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for [`crate::config::Config`].
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An environment variable is set but is not a number.
    #[error("Invalid value for {name}: {value:?}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Raw value found.
        value: String,
    },

    /// A parsed value is outside its allowed range.
    #[error("Invalid configuration: {message}")]
    Invalid {
        /// What is wrong.
        message: String,
    },
}

/// Errors from an elevation data provider.
#[derive(Debug, thiserror::Error)]
pub enum ElevationError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed elevation response: {message}")]
    InvalidResponse { message: String },
}

/// An hourly shading series did not cover exactly one non-leap year.
#[derive(Debug, thiserror::Error)]
#[error("Hourly shading series must hold {expected} values, got {actual}")]
pub struct HourlySeriesError {
    pub expected: usize,
    pub actual: usize,
}
