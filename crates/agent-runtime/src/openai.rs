//! OpenAI-compatible LLM Provider
//!
//! Implementation of `LlmProvider` for any `/chat/completions` endpoint with
//! native tool calling. Defaults target OpenRouter.

use std::collections::HashMap;
use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{Completion, FinishReason, GenerationOptions, LlmProvider, ModelTurn, TokenUsage},
    tool::{ToolCall, ToolSchema},
};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Environment variable holding the API credential
pub const API_KEY_VAR: &str = "OPENROUTER_API_KEY";

const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Provider configuration
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// Bearer credential
    pub api_key: String,

    /// API root, without the trailing `/chat/completions`
    pub base_url: String,

    /// HTTP request timeout in seconds
    pub timeout_secs: u64,

    /// Sent as `X-Title` so OpenRouter can attribute traffic
    pub app_name: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.into(),
            timeout_secs: 120,
            app_name: "weather-worker".into(),
        }
    }
}

impl OpenAiConfig {
    /// Read `OPENROUTER_API_KEY` (required) and `OPENROUTER_BASE_URL`
    pub fn from_env() -> Result<Self> {
        Self::from_env_var(API_KEY_VAR)
    }

    /// Read the credential from a custom variable name
    pub fn from_env_var(key_var: &str) -> Result<Self> {
        let api_key = std::env::var(key_var)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                AgentError::Config(format!(
                    "{key_var} environment variable is required. Get your key from https://openrouter.ai/"
                ))
            })?;

        Ok(Self {
            api_key,
            base_url: base_url_or_default(std::env::var("OPENROUTER_BASE_URL").ok()),
            ..Default::default()
        })
    }

    /// Key prefix that is safe to log
    pub fn redacted_key(&self) -> String {
        let prefix: String = self.api_key.chars().take(10).collect();
        format!("{prefix}...")
    }
}

/// Unset or blank falls back to OpenRouter
fn base_url_or_default(value: Option<String>) -> String {
    value
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_BASE_URL.into())
}

/// OpenAI-compatible chat-completions provider
pub struct OpenAiProvider {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    /// Create from configuration. Fails if the credential is empty.
    pub fn from_config(config: OpenAiConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AgentError::Config("API key must not be empty".into()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AgentError::Config(format!("HTTP client: {e}")))?;

        tracing::debug!(base_url = %config.base_url, key = %config.redacted_key(), "OpenAI-compatible provider ready");

        Ok(Self { client, config })
    }

    /// Create from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_config(OpenAiConfig::from_env()?)
    }

    pub const fn config(&self) -> &OpenAiConfig {
        &self.config
    }

    /// Convert agent messages to wire format
    fn convert_messages(messages: &[Message]) -> Vec<WireMessage> {
        messages
            .iter()
            .map(|m| {
                let tool_calls = m
                    .tool_calls
                    .iter()
                    .enumerate()
                    .map(|(i, call)| WireToolCall {
                        id: call.id.clone().unwrap_or_else(|| format!("call_{i}")),
                        kind: "function".into(),
                        function: WireFunction {
                            name: call.name.clone(),
                            arguments: serde_json::to_string(&call.arguments)
                                .unwrap_or_else(|_| "{}".into()),
                        },
                    })
                    .collect::<Vec<_>>();

                // Assistant tool-call turns may legitimately have no text
                let content = if m.role == Role::Assistant && m.content.is_empty() && !tool_calls.is_empty() {
                    None
                } else {
                    Some(m.content.clone())
                };

                WireMessage {
                    role: m.role.to_string(),
                    content,
                    tool_calls,
                    tool_call_id: m.tool_call_id.clone(),
                }
            })
            .collect()
    }

    fn build_request<'a>(
        messages: &[Message],
        tools: &[ToolSchema],
        options: &'a GenerationOptions,
    ) -> ChatRequest<'a> {
        let tools: Vec<Value> = tools.iter().map(ToolSchema::to_function_definition).collect();
        let tool_choice = (!tools.is_empty()).then_some("auto");

        ChatRequest {
            model: &options.model,
            messages: Self::convert_messages(messages),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            tools,
            tool_choice,
        }
    }

    /// Convert a wire response to a tagged completion
    fn convert_completion(response: ChatResponse, model: &str) -> Result<Completion> {
        if let Some(err) = response.error {
            return Err(AgentError::Provider(err.message));
        }

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Provider("response contained no choices".into()))?;

        let content = choice.message.content.unwrap_or_default();
        let finish_reason = choice.finish_reason.as_deref().map(FinishReason::from_wire);

        let turn = if choice.message.tool_calls.is_empty() {
            ModelTurn::FinalAnswer(content)
        } else {
            let calls = choice
                .message
                .tool_calls
                .into_iter()
                .map(Self::convert_tool_call)
                .collect::<Result<Vec<_>>>()?;
            ModelTurn::ToolRequest { content, calls }
        };

        Ok(Completion {
            turn,
            model: response.model.unwrap_or_else(|| model.to_string()),
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason,
        })
    }

    fn convert_tool_call(call: WireToolCall) -> Result<ToolCall> {
        let raw = call.function.arguments.trim();
        let arguments: HashMap<String, Value> = if raw.is_empty() {
            HashMap::new()
        } else {
            serde_json::from_str(raw).map_err(|e| {
                AgentError::Parse(format!(
                    "arguments for '{}' are not a JSON object: {e}",
                    call.function.name
                ))
            })?
        };

        Ok(ToolCall {
            name: call.function.name,
            arguments,
            id: Some(call.id),
        })
    }

    fn map_status(status: StatusCode, body: &str) -> AgentError {
        let detail = format!("{status} - {body}");
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(detail),
            StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(detail),
            s if s.is_server_error() => AgentError::ProviderUnavailable(detail),
            _ => AgentError::Provider(detail),
        }
    }

    fn map_transport(err: &reqwest::Error) -> AgentError {
        if err.is_timeout() || err.is_connect() {
            AgentError::ProviderUnavailable(err.to_string())
        } else {
            AgentError::Provider(err.to_string())
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "OpenAI-compatible"
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = Self::build_request(messages, tools, options);
        let url = format!("{}/chat/completions", self.config.base_url.trim_end_matches('/'));

        tracing::debug!(model = %options.model, messages = messages.len(), tools = tools.len(), "Requesting completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .header("X-Title", &self.config.app_name)
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::map_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::map_status(status, &body));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Parse(format!("invalid completion response: {e}")))?;

        Self::convert_completion(body, &options.model)
    }
}

// ============================================================================
// Wire types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<&'static str>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: String,
    #[serde(rename = "type", default = "function_kind")]
    kind: String,
    function: WireFunction,
}

fn function_kind() -> String {
    "function".into()
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    model: Option<String>,
    usage: Option<WireUsage>,
    error: Option<WireError>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: WireMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct WireError {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::tool::ParameterSchema;
    use mockito::Matcher;
    use serde_json::json;

    fn provider(base_url: String) -> OpenAiProvider {
        OpenAiProvider::from_config(OpenAiConfig {
            api_key: "test-key".into(),
            base_url,
            ..Default::default()
        })
        .unwrap()
    }

    fn alerts_schema() -> ToolSchema {
        ToolSchema {
            name: "get_weather_alerts".into(),
            description: "Get weather alerts for a US state.".into(),
            parameters: vec![ParameterSchema::required("state", "string", "Two-letter US state code")],
            category: None,
        }
    }

    #[test]
    fn test_config_defaults() {
        let config = OpenAiConfig::default();
        assert_eq!(config.base_url, "https://openrouter.ai/api/v1");
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_blank_base_url_uses_default() {
        assert_eq!(base_url_or_default(None), DEFAULT_BASE_URL);
        assert_eq!(base_url_or_default(Some(String::new())), DEFAULT_BASE_URL);
        assert_eq!(base_url_or_default(Some("   ".into())), DEFAULT_BASE_URL);
        assert_eq!(
            base_url_or_default(Some(" http://localhost:4000/v1/ ".into())),
            "http://localhost:4000/v1"
        );
    }

    #[test]
    fn test_missing_credential_is_config_error() {
        let err = OpenAiConfig::from_env_var("WEATHER_WORKER_TEST_UNSET_KEY_8F3A").unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("WEATHER_WORKER_TEST_UNSET_KEY_8F3A"));

        let err = OpenAiProvider::from_config(OpenAiConfig::default()).err().unwrap();
        assert!(err.is_config());
    }

    #[test]
    fn test_redacted_key() {
        let config = OpenAiConfig {
            api_key: "sk-or-v1-abcdefghijklmnop".into(),
            ..Default::default()
        };
        assert_eq!(config.redacted_key(), "sk-or-v1-a...");
    }

    #[test]
    fn test_message_conversion() {
        let messages = vec![
            Message::system("You are a weather agent."),
            Message::user("Alerts for CA?"),
            Message::assistant_tool_calls(
                "",
                vec![ToolCall {
                    name: "get_weather_alerts".into(),
                    arguments: HashMap::from([("state".into(), json!("CA"))]),
                    id: Some("call_abc".into()),
                }],
            ),
            Message::tool("No active alerts for this state.", Some("call_abc".into())),
        ];

        let wire = serde_json::to_value(OpenAiProvider::convert_messages(&messages)).unwrap();
        assert_eq!(wire[0]["role"], "system");
        assert_eq!(wire[2]["role"], "assistant");
        assert!(wire[2]["content"].is_null());
        assert_eq!(wire[2]["tool_calls"][0]["id"], "call_abc");
        assert_eq!(wire[2]["tool_calls"][0]["type"], "function");
        assert_eq!(wire[2]["tool_calls"][0]["function"]["arguments"], r#"{"state":"CA"}"#);
        assert_eq!(wire[3]["role"], "tool");
        assert_eq!(wire[3]["tool_call_id"], "call_abc");
    }

    #[test]
    fn test_convert_tool_request() {
        let response: ChatResponse = serde_json::from_value(json!({
            "model": "anthropic/claude-3.5-sonnet",
            "choices": [{
                "finish_reason": "tool_calls",
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "get_weather_forecast",
                            "arguments": "{\"latitude\": 39.1612, \"longitude\": -86.5264}"
                        }
                    }]
                }
            }]
        }))
        .unwrap();

        let completion = OpenAiProvider::convert_completion(response, "fallback").unwrap();
        assert_eq!(completion.finish_reason, Some(FinishReason::ToolUse));
        match completion.turn {
            ModelTurn::ToolRequest { calls, .. } => {
                assert_eq!(calls.len(), 1);
                assert_eq!(calls[0].name, "get_weather_forecast");
                assert_eq!(calls[0].f64_arg("latitude"), Some(39.1612));
                assert_eq!(calls[0].id.as_deref(), Some("call_1"));
            }
            ModelTurn::FinalAnswer(_) => panic!("expected a tool request"),
        }
    }

    #[test]
    fn test_convert_rejects_malformed_arguments() {
        let response: ChatResponse = serde_json::from_value(json!({
            "choices": [{
                "message": {
                    "role": "assistant",
                    "tool_calls": [{
                        "id": "call_1",
                        "function": {"name": "get_weather_alerts", "arguments": "{state: CA"}
                    }]
                }
            }]
        }))
        .unwrap();

        let err = OpenAiProvider::convert_completion(response, "m").unwrap_err();
        assert!(matches!(err, AgentError::Parse(_)));
    }

    #[test]
    fn test_error_body_with_ok_status() {
        let response: ChatResponse =
            serde_json::from_value(json!({"error": {"message": "No endpoints found", "code": 404}}))
                .unwrap();
        let err = OpenAiProvider::convert_completion(response, "m").unwrap_err();
        assert!(err.to_string().contains("No endpoints found"));
    }

    #[tokio::test]
    async fn test_complete_final_answer() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/chat/completions")
            .match_header("authorization", "Bearer test-key")
            .match_body(Matcher::AllOf(vec![
                Matcher::PartialJson(json!({
                    "model": "anthropic/claude-3.5-sonnet",
                    "tool_choice": "auto",
                })),
                Matcher::Regex(r#""name":"get_weather_alerts""#.into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "choices": [{
                        "finish_reason": "stop",
                        "message": {"role": "assistant", "content": "Hello!"}
                    }],
                    "usage": {"prompt_tokens": 12, "completion_tokens": 3, "total_tokens": 15}
                })
                .to_string(),
            )
            .create_async()
            .await;

        let completion = provider(server.url())
            .complete(
                &[Message::user("Hi")],
                &[alerts_schema()],
                &GenerationOptions::default(),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(completion.turn, ModelTurn::FinalAnswer("Hello!".into()));
        assert_eq!(completion.usage.unwrap().total_tokens, 15);
    }

    #[tokio::test]
    async fn test_complete_maps_http_errors() {
        let mut server = mockito::Server::new_async().await;
        let _unauthorized = server
            .mock("POST", "/chat/completions")
            .with_status(401)
            .with_body(r#"{"error":{"message":"bad key"}}"#)
            .create_async()
            .await;

        let err = provider(server.url())
            .complete(&[Message::user("Hi")], &[], &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::Auth(_)));
    }

    #[tokio::test]
    async fn test_complete_server_error_is_unavailable() {
        let mut server = mockito::Server::new_async().await;
        let _down = server
            .mock("POST", "/chat/completions")
            .with_status(503)
            .create_async()
            .await;

        let err = provider(server.url())
            .complete(&[Message::user("Hi")], &[], &GenerationOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ProviderUnavailable(_)));
    }
}
