//! Worker configuration, read from the environment (after `.env` is loaded).

use std::time::Duration;

use thiserror::Error;

use agent_core::provider::DEFAULT_MODEL;
use agent_runtime::openai::API_KEY_VAR;
use weather_tools::NwsConfig;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Listen address for `serve`
    pub bind_addr: String,

    pub model: String,
    pub temperature: f32,

    /// Model round trips allowed per query
    pub max_rounds: usize,

    pub round_timeout: Duration,

    /// Variable holding the model credential; read when a session starts
    pub api_key_var: String,

    pub nws: NwsConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8013".into(),
            model: DEFAULT_MODEL.into(),
            temperature: 0.7,
            max_rounds: 10,
            round_timeout: Duration::from_secs(60),
            api_key_var: API_KEY_VAR.into(),
            nws: NwsConfig::default(),
        }
    }
}

impl WorkerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from any variable source. Unset or blank variables keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut config = Self::default();

        if let Some(addr) = get("BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Some(model) = get("WEATHER_AGENT_MODEL") {
            config.model = model;
        }
        if let Some(raw) = get("WEATHER_AGENT_TEMPERATURE") {
            config.temperature = parse("WEATHER_AGENT_TEMPERATURE", raw)?;
        }
        if let Some(raw) = get("WEATHER_AGENT_MAX_ROUNDS") {
            config.max_rounds = parse("WEATHER_AGENT_MAX_ROUNDS", raw)?;
            if config.max_rounds == 0 {
                return Err(ConfigError::Invalid {
                    var: "WEATHER_AGENT_MAX_ROUNDS",
                    value: "0".into(),
                    reason: "must be at least 1".into(),
                });
            }
        }
        if let Some(raw) = get("WEATHER_AGENT_ROUND_TIMEOUT_SECS") {
            let secs: u64 = parse("WEATHER_AGENT_ROUND_TIMEOUT_SECS", raw)?;
            if secs == 0 {
                return Err(ConfigError::Invalid {
                    var: "WEATHER_AGENT_ROUND_TIMEOUT_SECS",
                    value: "0".into(),
                    reason: "must be at least 1".into(),
                });
            }
            config.round_timeout = Duration::from_secs(secs);
        }
        if let Some(url) = get("NWS_BASE_URL") {
            config.nws.base_url = url.trim_end_matches('/').to_string();
        }

        Ok(config)
    }
}

fn parse<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.parse().map_err(|e: T::Err| ConfigError::Invalid {
        var,
        reason: e.to_string(),
        value,
    })
}
