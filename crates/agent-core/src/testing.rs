//! Scripted provider and recording tool shared by the unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::{AgentError, Result};
use crate::message::Message;
use crate::provider::{Completion, FinishReason, GenerationOptions, LlmProvider, ModelTurn};
use crate::tool::{ParameterSchema, Tool, ToolCall, ToolResult, ToolSchema};

pub fn final_answer(text: &str) -> Completion {
    Completion {
        turn: ModelTurn::FinalAnswer(text.into()),
        model: "scripted".into(),
        usage: None,
        finish_reason: Some(FinishReason::Stop),
    }
}

pub fn tool_request(name: &str, args: Value) -> Completion {
    Completion {
        turn: ModelTurn::ToolRequest {
            content: String::new(),
            calls: vec![ToolCall {
                name: name.into(),
                arguments: serde_json::from_value(args).unwrap_or_default(),
                id: Some("call_0".into()),
            }],
        },
        model: "scripted".into(),
        usage: None,
        finish_reason: Some(FinishReason::ToolUse),
    }
}

/// Replays a fixed list of completions and records every request.
#[derive(Default)]
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Completion>>,
    requests: Mutex<Vec<Vec<Message>>>,
    offered: Mutex<Vec<Vec<String>>>,
    stalled: bool,
    delay: Option<Duration>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(script: Vec<Completion>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    /// Never answers
    pub fn stalled() -> Self {
        Self {
            stalled: true,
            ..Default::default()
        }
    }

    /// Answers from the script after sleeping `delay`
    pub fn with_delay(script: Vec<Completion>, delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::new(script)
        }
    }

    /// Highest number of overlapping `complete` calls seen
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().unwrap().clone()
    }

    pub fn offered_tools(&self) -> Vec<Vec<String>> {
        self.offered.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn complete(
        &self,
        messages: &[Message],
        tools: &[ToolSchema],
        _options: &GenerationOptions,
    ) -> Result<Completion> {
        self.requests.lock().unwrap().push(messages.to_vec());
        self.offered
            .lock()
            .unwrap()
            .push(tools.iter().map(|t| t.name.clone()).collect());

        if self.stalled {
            std::future::pending::<()>().await;
        }

        if let Some(delay) = self.delay {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }

        let next = self.script.lock().unwrap().pop_front();
        next.ok_or_else(|| AgentError::Provider("script exhausted".into()))
    }
}

/// Returns a canned output and remembers how it was called.
pub struct RecordingTool {
    name: String,
    output: String,
    fail: bool,
    calls: Arc<Mutex<Vec<ToolCall>>>,
}

impl RecordingTool {
    pub fn new(name: &str, output: &str) -> Self {
        Self {
            name: name.into(),
            output: output.into(),
            fail: false,
            calls: Arc::default(),
        }
    }

    pub fn failing(name: &str) -> Self {
        Self {
            fail: true,
            ..Self::new(name, "")
        }
    }

    pub fn calls(&self) -> Arc<Mutex<Vec<ToolCall>>> {
        self.calls.clone()
    }
}

#[async_trait]
impl Tool for RecordingTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name.clone(),
            description: "Test tool".into(),
            parameters: vec![ParameterSchema {
                name: "state".into(),
                param_type: "string".into(),
                description: "Two-letter state code".into(),
                required: false,
            }],
            category: None,
        }
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        self.calls.lock().unwrap().push(call.clone());
        if self.fail {
            return Err(AgentError::ToolExecution("upstream returned 500".into()));
        }
        Ok(ToolResult::success(&self.name, &self.output))
    }
}
