//! Error Types for the weather tools

use thiserror::Error;

pub type Result<T> = std::result::Result<T, WeatherError>;

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("Unrecognized region code '{0}'. Use a two-letter US state code like 'CA', 'NY' or 'IN'.")]
    InvalidRegion(String),

    #[error("Coordinates out of range: latitude {latitude} must be in [-90, 90], longitude {longitude} in [-180, 180]")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    #[error("Weather service returned {status} for {url}")]
    Status { status: u16, url: String },

    #[error("Weather service response is missing {0}")]
    MissingField(&'static str),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
