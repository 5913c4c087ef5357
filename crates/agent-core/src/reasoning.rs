//! Dispatch Loop
//!
//! Mediates between a model provider and the tool registry: the model either
//! answers or asks for tools, tool results are fed back, and the loop repeats
//! until a final answer arrives or the round limit is hit.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message, Role};
use crate::provider::{GenerationOptions, LlmProvider, ModelTurn};
use crate::tool::{Tool, ToolCall, ToolRegistry, ToolResult};

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt
    pub system_prompt: String,

    /// Maximum model round trips before giving up
    pub max_iterations: usize,

    /// Upper bound on a single model call or tool call
    pub round_timeout: Duration,

    /// Generation options
    pub generation: GenerationOptions,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: 10,
            round_timeout: Duration::from_secs(60),
            generation: GenerationOptions::default(),
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. \
Use the available tools when they help answer the question, then \
synthesize their results into a concise, accurate response.";

/// The tool-dispatching agent
pub struct Agent {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry>,
    config: AgentConfig,
}

impl Agent {
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
        }
    }

    /// Run the dispatch loop over a conversation whose last message is the query.
    ///
    /// Assistant turns and tool results are appended to `conversation`.
    pub async fn run(&self, conversation: &mut Conversation) -> Result<String> {
        if conversation.messages().first().map(|m| m.role) != Some(Role::System) {
            conversation
                .messages_mut()
                .insert(0, Message::system(self.config.system_prompt.clone()));
        }

        let schemas = self.tools.schemas();

        for round in 1..=self.config.max_iterations {
            let completion = self
                .with_timeout(
                    format!("{} completion", self.provider.name()),
                    self.provider.complete(
                        conversation.messages(),
                        &schemas,
                        &self.config.generation,
                    ),
                )
                .await?;

            if let Some(usage) = &completion.usage {
                tracing::debug!(
                    round,
                    prompt_tokens = usage.prompt_tokens,
                    completion_tokens = usage.completion_tokens,
                    "Model round trip"
                );
            }

            match completion.turn {
                ModelTurn::FinalAnswer(text) => {
                    conversation.push(Message::assistant(&text));
                    return Ok(text);
                }
                ModelTurn::ToolRequest { content, calls } => {
                    conversation.push(Message::assistant_tool_calls(content, calls.clone()));

                    for call in &calls {
                        tracing::info!(round, tool = %call.name, args = ?call.arguments, "Executing tool");
                        let result = self.execute_tool(call).await?;
                        conversation.push(Message::tool(
                            Self::format_tool_result(&result),
                            call.id.clone(),
                        ));
                    }
                }
            }
        }

        tracing::warn!(max = self.config.max_iterations, "Round limit exceeded");
        Err(AgentError::MaxIterations(self.config.max_iterations))
    }

    /// Answer a single query in a fresh conversation
    pub async fn ask(&self, question: &str) -> Result<String> {
        let mut conversation = Conversation::with_system_prompt(self.config.system_prompt.clone());
        conversation.push(Message::user(question));
        self.run(&mut conversation).await
    }

    /// Execute a tool call.
    ///
    /// Unknown tools and bad arguments go back to the model as failed results;
    /// anything else aborts the run.
    async fn execute_tool(&self, call: &ToolCall) -> Result<ToolResult> {
        let outcome = self
            .with_timeout(format!("tool '{}'", call.name), self.tools.execute(call))
            .await;

        match outcome {
            Ok(result) => Ok(result.with_id(call.id.clone())),
            Err(e) if e.is_recoverable_tool_error() => {
                tracing::warn!(tool = %call.name, error = %e, "Tool call rejected");
                Ok(ToolResult::failure(&call.name, format!("Error: {e}")).with_id(call.id.clone()))
            }
            Err(e) => Err(e),
        }
    }

    async fn with_timeout<T>(
        &self,
        what: String,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::time::timeout(self.config.round_timeout, fut)
            .await
            .map_err(|_| AgentError::Timeout {
                what,
                secs: self.config.round_timeout.as_secs(),
            })?
    }

    /// Format tool result for conversation
    fn format_tool_result(result: &ToolResult) -> String {
        if result.success {
            result.output.clone()
        } else {
            format!("[Tool '{}' failed]\n{}", result.name, result.output)
        }
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Default for AgentBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tool<T: Tool + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn config(mut self, config: AgentConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub const fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    #[must_use]
    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    #[must_use]
    pub const fn round_timeout(mut self, timeout: Duration) -> Self {
        self.config.round_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<Agent> {
        let provider = self
            .provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        if self.config.max_iterations == 0 {
            return Err(AgentError::Config("max_iterations must be at least 1".into()));
        }

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}
