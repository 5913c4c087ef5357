//! Builds one weather agent per session.

use std::sync::Arc;

use agent_core::{Agent, AgentBuilder, AgentFactory, LlmProvider, Result};
use agent_runtime::{OpenAiConfig, OpenAiProvider};
use weather_tools::{WEATHER_AGENT_PROMPT, WeatherClient, weather_tool_registry};

use crate::config::WorkerConfig;

/// Produces the model provider for a new session
pub type ProviderBuilder = dyn Fn() -> Result<Arc<dyn LlmProvider>> + Send + Sync;

pub struct WeatherAgentFactory {
    config: WorkerConfig,
    weather: Arc<dyn WeatherClient>,
    provider: Arc<ProviderBuilder>,
}

impl WeatherAgentFactory {
    pub fn new(
        config: WorkerConfig,
        weather: Arc<dyn WeatherClient>,
        provider: Arc<ProviderBuilder>,
    ) -> Self {
        Self {
            config,
            weather,
            provider,
        }
    }

    /// Provider read from the environment at every session start, so a
    /// rotated key applies to new sessions
    pub fn openrouter(config: WorkerConfig, weather: Arc<dyn WeatherClient>) -> Self {
        let key_var = config.api_key_var.clone();
        let provider = move || -> Result<Arc<dyn LlmProvider>> {
            let openai = OpenAiConfig::from_env_var(&key_var)?;
            Ok(Arc::new(OpenAiProvider::from_config(openai)?))
        };
        Self::new(config, weather, Arc::new(provider))
    }

    pub const fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Names of the tools every agent is given
    pub fn tool_names(&self) -> Vec<String> {
        weather_tool_registry(self.weather.clone())
            .names()
            .into_iter()
            .map(String::from)
            .collect()
    }
}

impl AgentFactory for WeatherAgentFactory {
    fn build(&self) -> Result<Agent> {
        AgentBuilder::new()
            .provider((self.provider)()?)
            .tools(weather_tool_registry(self.weather.clone()))
            .system_prompt(WEATHER_AGENT_PROMPT)
            .model(self.config.model.clone())
            .temperature(self.config.temperature)
            .max_iterations(self.config.max_rounds)
            .round_timeout(self.config.round_timeout)
            .build()
    }
}
