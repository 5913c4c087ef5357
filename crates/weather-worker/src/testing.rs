//! Scripted model and offline weather client for the worker tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use serde_json::Value;

use agent_core::provider::FinishReason;
use agent_core::{
    AgentError, Completion, GenerationOptions, LlmProvider, Message, ModelTurn, Result,
    SessionRegistry, ToolCall, ToolSchema,
};
use weather_tools::{Alert, ForecastPeriod, NwsClient, NwsConfig, WeatherClient};

use crate::config::WorkerConfig;
use crate::factory::WeatherAgentFactory;

pub fn answer(text: &str) -> Completion {
    Completion {
        turn: ModelTurn::FinalAnswer(text.into()),
        model: "scripted".into(),
        usage: None,
        finish_reason: Some(FinishReason::Stop),
    }
}

/// One tool call, as the model would request it
pub fn tool_request(name: &str, args: Value) -> Completion {
    Completion {
        turn: ModelTurn::ToolRequest {
            content: String::new(),
            calls: vec![ToolCall {
                name: name.into(),
                arguments: serde_json::from_value(args).unwrap(),
                id: Some("call_0".into()),
            }],
        },
        model: "scripted".into(),
        usage: None,
        finish_reason: Some(FinishReason::ToolUse),
    }
}

/// Replays completions in order and records each request's messages
pub struct ScriptedModel {
    script: Mutex<VecDeque<Completion>>,
    requests: Mutex<Vec<Vec<Message>>>,
    stall: bool,
}

impl ScriptedModel {
    pub fn new(script: Vec<Completion>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
            stall: false,
        }
    }

    /// Never answers
    pub fn stalled() -> Self {
        Self {
            stall: true,
            ..Self::new(vec![])
        }
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(
        &self,
        messages: &[Message],
        _tools: &[ToolSchema],
        _options: &GenerationOptions,
    ) -> Result<Completion> {
        self.requests.lock().unwrap().push(messages.to_vec());
        if self.stall {
            std::future::pending::<()>().await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.ok_or_else(|| AgentError::Provider("script exhausted".into()))
    }
}

/// NWS client aimed at a closed port; tests never get as far as calling it
pub fn offline_weather() -> Arc<dyn WeatherClient> {
    Arc::new(
        NwsClient::new(NwsConfig {
            base_url: "http://127.0.0.1:9".into(),
            timeout_secs: 1,
        })
        .unwrap(),
    )
}

/// Serves one fixed alert and records the areas asked for
#[derive(Default)]
pub struct StubWeather {
    alert_areas: Mutex<Vec<String>>,
}

impl StubWeather {
    pub fn alert_areas(&self) -> Vec<String> {
        self.alert_areas.lock().unwrap().clone()
    }
}

#[async_trait]
impl WeatherClient for StubWeather {
    async fn active_alerts(&self, area: &str) -> weather_tools::Result<Vec<Alert>> {
        self.alert_areas.lock().unwrap().push(area.to_string());
        Ok(vec![Alert {
            event: Some("Flood Watch".into()),
            area_desc: Some("Monroe, IN".into()),
            severity: Some("Severe".into()),
            ..Alert::default()
        }])
    }

    async fn forecast(
        &self,
        _latitude: f64,
        _longitude: f64,
    ) -> weather_tools::Result<Vec<ForecastPeriod>> {
        Ok(vec![])
    }

    fn name(&self) -> &str {
        "stub"
    }
}

pub fn registry_with(model: Arc<ScriptedModel>) -> SessionRegistry {
    registry_with_weather(model, offline_weather())
}

pub fn registry_with_weather(
    model: Arc<ScriptedModel>,
    weather: Arc<dyn WeatherClient>,
) -> SessionRegistry {
    let model: Arc<dyn LlmProvider> = model;
    let factory = WeatherAgentFactory::new(
        WorkerConfig::default(),
        weather,
        Arc::new(move || -> Result<Arc<dyn LlmProvider>> { Ok(model.clone()) }),
    );
    SessionRegistry::new(Arc::new(factory))
}
