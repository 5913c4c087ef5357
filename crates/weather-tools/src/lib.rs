//! # weather-tools
//!
//! US National Weather Service lookups packaged as agent tools.
//!
//! ```text
//! get_weather_alerts(state)              GET /alerts/active/area/{STATE}
//! get_weather_forecast(lat, lon)   ──►   GET /points/{lat},{lon}
//!                                        GET {properties.forecast}
//! ```
//!
//! Both tools validate their input before touching the network and turn
//! upstream failures into explanatory text.

pub mod api;
pub mod error;
pub mod model;
pub mod svckit;

use std::sync::Arc;

use agent_core::ToolRegistry;

pub use api::{NwsClient, NwsConfig, WeatherClient};
pub use error::{Result, WeatherError};
pub use model::{Alert, ForecastPeriod};
pub use svckit::{get_weather_alerts, get_weather_forecast};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{WeatherAlertsTool, WeatherForecastTool};
}

/// System prompt for the weather agent
pub const WEATHER_AGENT_PROMPT: &str = "You are a specialized weather agent. You execute weather-related tasks that are delegated to you by other agents. You have direct access to weather APIs and can provide detailed weather alerts and forecasts. Always provide complete, accurate information based on the tool results.";

/// Registry holding both weather tools backed by `client`
pub fn weather_tool_registry(client: Arc<dyn WeatherClient>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    registry.register(tools::WeatherAlertsTool::new(client.clone()));
    registry.register(tools::WeatherForecastTool::new(client));
    registry
}
