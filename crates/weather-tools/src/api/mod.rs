//! Weather Data Sources
//!
//! Abstraction over the upstream weather service so tools can be tested
//! without the network.

mod nws;

pub use nws::{NwsClient, NwsConfig};

use async_trait::async_trait;

use crate::error::Result;
use crate::model::{Alert, ForecastPeriod};

/// Weather client trait (Strategy pattern)
#[async_trait]
pub trait WeatherClient: Send + Sync {
    /// Active alerts for a normalized area code
    async fn active_alerts(&self, area: &str) -> Result<Vec<Alert>>;

    /// Forecast periods for a coordinate pair, nearest first
    async fn forecast(&self, latitude: f64, longitude: f64) -> Result<Vec<ForecastPeriod>>;

    fn name(&self) -> &str;
}
