//! National Weather Service client (api.weather.gov)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue, USER_AGENT};
use serde::de::DeserializeOwned;

use super::WeatherClient;
use crate::error::{Result, WeatherError};
use crate::model::{Alert, AlertCollection, ForecastPeriod, ForecastResponse, PointResponse};

pub const DEFAULT_BASE_URL: &str = "https://api.weather.gov";
const USER_AGENT_VALUE: &str = "weather-app/1.0";
const ACCEPT_VALUE: &str = "application/geo+json";

/// NWS client configuration
#[derive(Clone, Debug)]
pub struct NwsConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for NwsConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 30,
        }
    }
}

/// HTTP client for api.weather.gov
#[derive(Clone)]
pub struct NwsClient {
    client: reqwest::Client,
    config: NwsConfig,
}

impl NwsClient {
    pub fn new(config: NwsConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_VALUE));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WeatherError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }

    pub const fn config(&self) -> &NwsConfig {
        &self.config
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        tracing::debug!(url, "NWS request");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            tracing::warn!(url, status = status.as_u16(), "NWS request failed");
            return Err(WeatherError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl WeatherClient for NwsClient {
    async fn active_alerts(&self, area: &str) -> Result<Vec<Alert>> {
        let url = format!("{}/alerts/active/area/{area}", self.config.base_url);
        let collection: AlertCollection = self.get_json(&url).await?;
        Ok(collection
            .features
            .into_iter()
            .map(|feature| feature.properties)
            .collect())
    }

    async fn forecast(&self, latitude: f64, longitude: f64) -> Result<Vec<ForecastPeriod>> {
        let points_url = format!(
            "{}/points/{latitude:.4},{longitude:.4}",
            self.config.base_url
        );
        let point: PointResponse = self.get_json(&points_url).await?;
        let forecast_url = point
            .properties
            .forecast
            .ok_or(WeatherError::MissingField("properties.forecast"))?;

        let forecast: ForecastResponse = self.get_json(&forecast_url).await?;
        Ok(forecast.properties.periods)
    }

    fn name(&self) -> &str {
        "nws"
    }
}
