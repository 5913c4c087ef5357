//! Service Kit - Agent Tools
//!
//! Weather tools that implement `agent_core::Tool`. Upstream failures come
//! back as explanatory text rather than errors, so the model can tell the
//! user what went wrong.

mod alerts;
mod forecast;

pub use alerts::{WeatherAlertsTool, get_weather_alerts};
pub use forecast::{FORECAST_PERIODS, WeatherForecastTool, get_weather_forecast};
