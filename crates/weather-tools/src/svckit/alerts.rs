//! Weather Alerts Tool
//!
//! Active NWS alerts for a US state or marine area.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{ParameterSchema, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema};

use crate::api::WeatherClient;
use crate::error::{Result, WeatherError};
use crate::model::{SECTION_SEPARATOR, normalize_region};

const TOOL_NAME: &str = "get_weather_alerts";

/// Active alerts for `state`, rendered as text.
///
/// Never fails: a bad code or an upstream problem is reported in the text.
pub async fn get_weather_alerts(client: &dyn WeatherClient, state: &str) -> String {
    alerts_report(client, state)
        .await
        .unwrap_or_else(|e| e.to_string())
}

/// Only input validation errors escape; upstream failures are soft.
async fn alerts_report(client: &dyn WeatherClient, state: &str) -> Result<String> {
    let area = normalize_region(state).ok_or_else(|| WeatherError::InvalidRegion(state.into()))?;

    let alerts = match client.active_alerts(&area).await {
        Ok(alerts) => alerts,
        Err(e) => {
            tracing::warn!(area = %area, error = %e, "Alert lookup failed");
            return Ok("Unable to fetch alerts or no alerts found.".into());
        }
    };

    if alerts.is_empty() {
        return Ok("No active alerts for this state.".into());
    }

    tracing::debug!(area = %area, count = alerts.len(), "Alerts fetched");
    Ok(alerts
        .iter()
        .map(|alert| alert.format())
        .collect::<Vec<_>>()
        .join(SECTION_SEPARATOR))
}

/// Tool wrapper around [`get_weather_alerts`]
pub struct WeatherAlertsTool {
    client: Arc<dyn WeatherClient>,
}

impl WeatherAlertsTool {
    pub fn new(client: Arc<dyn WeatherClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Tool for WeatherAlertsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Get weather alerts for a US state. Takes a state code like 'CA', 'NY', 'IN'."
                .into(),
            parameters: vec![ParameterSchema::required(
                "state",
                "string",
                "Two-letter US state code (e.g. 'CA', 'NY', 'IN')",
            )],
            category: Some("weather".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let state = call.str_arg("state").unwrap_or_default();

        Ok(match alerts_report(self.client.as_ref(), state).await {
            Ok(text) => ToolResult::success(TOOL_NAME, text),
            Err(e) => ToolResult::failure(TOOL_NAME, e.to_string()),
        })
    }
}
