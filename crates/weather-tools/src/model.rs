//! Weather Data Models
//!
//! GeoJSON shapes returned by api.weather.gov, trimmed to the fields the
//! tools report, plus their plain-text renderings.

use serde::{Deserialize, Serialize};

/// Separator between alerts or forecast periods in tool output
pub const SECTION_SEPARATOR: &str = "\n---\n";

/// US states, DC, territories and NWS marine areas accepted by `/alerts/active/area`
const AREA_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ",
    "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT", "VT",
    "VA", "WA", "WV", "WI", "WY", "DC", "PR", "VI", "GU", "AS", "MP", "AM", "AN", "GM", "LC",
    "LE", "LH", "LM", "LO", "LS", "PH", "PK", "PM", "PS", "PZ", "SL",
];

/// Normalize and check a region code: trimmed, upper-cased, known to NWS
pub fn normalize_region(code: &str) -> Option<String> {
    let code = code.trim().to_ascii_uppercase();
    AREA_CODES.contains(&code.as_str()).then_some(code)
}

/// Latitude in [-90, 90] and longitude in [-180, 180], both finite
pub fn coordinates_in_range(latitude: f64, longitude: f64) -> bool {
    (-90.0..=90.0).contains(&latitude) && (-180.0..=180.0).contains(&longitude)
}

/// `GET /alerts/active/area/{area}`
#[derive(Clone, Debug, Default, Deserialize)]
pub struct AlertCollection {
    #[serde(default)]
    pub features: Vec<AlertFeature>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct AlertFeature {
    pub properties: Alert,
}

/// A single active alert
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    pub event: Option<String>,
    pub area_desc: Option<String>,
    pub severity: Option<String>,
    pub description: Option<String>,
    pub instruction: Option<String>,
}

impl Alert {
    /// Plain-text rendering handed back to the model
    pub fn format(&self) -> String {
        format!(
            "Event: {}\nArea: {}\nSeverity: {}\nDescription: {}\nInstructions: {}",
            self.event.as_deref().unwrap_or("Unknown"),
            self.area_desc.as_deref().unwrap_or("Unknown"),
            self.severity.as_deref().unwrap_or("Unknown"),
            self.description.as_deref().unwrap_or("No description available"),
            self.instruction
                .as_deref()
                .unwrap_or("No specific instructions provided"),
        )
    }
}

/// `GET /points/{lat},{lon}`
#[derive(Clone, Debug, Deserialize)]
pub struct PointResponse {
    pub properties: PointProperties,
}

#[derive(Clone, Debug, Deserialize)]
pub struct PointProperties {
    /// Absolute URL of the gridpoint forecast
    pub forecast: Option<String>,
}

/// `GET {forecast url}`
#[derive(Clone, Debug, Deserialize)]
pub struct ForecastResponse {
    pub properties: ForecastProperties,
}

#[derive(Clone, Debug, Deserialize)]
pub struct ForecastProperties {
    #[serde(default)]
    pub periods: Vec<ForecastPeriod>,
}

/// One named forecast period ("Tonight", "Wednesday", ...)
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastPeriod {
    pub name: String,
    pub temperature: Option<i32>,
    pub temperature_unit: Option<String>,
    pub wind_speed: Option<String>,
    pub wind_direction: Option<String>,
    pub detailed_forecast: Option<String>,
}

impl ForecastPeriod {
    pub fn format(&self) -> String {
        let temperature = self
            .temperature
            .map_or_else(|| "Unknown".to_string(), |t| t.to_string());
        let wind = match (self.wind_speed.as_deref(), self.wind_direction.as_deref()) {
            (Some(speed), Some(dir)) if !dir.is_empty() => format!("{speed} {dir}"),
            (Some(speed), _) => speed.to_string(),
            (None, _) => "Unknown".to_string(),
        };
        format!(
            "{}:\nTemperature: {}°{}\nWind: {}\nForecast: {}",
            self.name,
            temperature,
            self.temperature_unit.as_deref().unwrap_or("F"),
            wind,
            self.detailed_forecast.as_deref().unwrap_or("No forecast available"),
        )
    }
}
