//! Weather Forecast Tool

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use crate::api::WeatherClient;
use crate::error::{Result, WeatherError};
use crate::model::{SECTION_SEPARATOR, coordinates_in_range};

const TOOL_NAME: &str = "get_weather_forecast";

/// Number of upcoming periods included in a forecast
pub const FORECAST_PERIODS: usize = 5;

/// Forecast for a coordinate pair, rendered as text. Never fails.
pub async fn get_weather_forecast(client: &dyn WeatherClient, latitude: f64, longitude: f64) -> String {
    forecast_report(client, latitude, longitude)
        .await
        .unwrap_or_else(|e| e.to_string())
}

async fn forecast_report(client: &dyn WeatherClient, latitude: f64, longitude: f64) -> Result<String> {
    if !coordinates_in_range(latitude, longitude) {
        return Err(WeatherError::InvalidCoordinates { latitude, longitude });
    }

    let periods = match client.forecast(latitude, longitude).await {
        Ok(periods) => periods,
        // No gridpoint for this location (e.g. outside the US)
        Err(e @ (WeatherError::MissingField(_) | WeatherError::Status { status: 404, .. })) => {
            tracing::warn!(latitude, longitude, error = %e, "No forecast grid for location");
            return Ok("Unable to fetch forecast data for this location.".into());
        }
        Err(e) => {
            tracing::warn!(latitude, longitude, error = %e, "Forecast lookup failed");
            return Ok("Unable to fetch detailed forecast.".into());
        }
    };

    if periods.is_empty() {
        return Ok("Unable to fetch detailed forecast.".into());
    }

    Ok(periods
        .iter()
        .take(FORECAST_PERIODS)
        .map(|period| period.format())
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR))
}

/// Tool wrapper around [`get_weather_forecast`]
pub struct WeatherForecastTool {
    client: Arc<dyn WeatherClient>,
}

impl WeatherForecastTool {
    pub fn new(client: Arc<dyn WeatherClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WeatherForecastTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Get weather forecast for coordinates. Takes latitude and longitude as numbers."
                .into(),
            parameters: vec![
                ParameterSchema::required("latitude", "number", "Latitude in decimal degrees"),
                ParameterSchema::required("longitude", "number", "Longitude in decimal degrees"),
            ],
            category: Some("weather".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        // Presence and type are checked by `validate` before we get here
        let latitude = call.f64_arg("latitude").unwrap_or(f64::NAN);
        let longitude = call.f64_arg("longitude").unwrap_or(f64::NAN);

        Ok(
            match forecast_report(self.client.as_ref(), latitude, longitude).await {
                Ok(text) => ToolResult::success(TOOL_NAME, text),
                Err(e) => ToolResult::failure(TOOL_NAME, e.to_string()),
            },
        )
    }
}
