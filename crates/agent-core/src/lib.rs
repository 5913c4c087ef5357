//! # agent-core
//!
//! Core agent logic with provider-agnostic LLM abstraction, tool dispatch and
//! per-connection session lifecycle.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │  SessionRegistry ── Session (one per connection)              │
//! │                        │                                      │
//! │                        ▼                                      │
//! │  ┌─────────────┐  ┌─────────────┐  ┌─────────────────────┐    │
//! │  │  Dispatch   │  │    Tools    │  │   LlmProvider       │    │
//! │  │    Loop     │──│   Registry  │──│   (Strategy)        │    │
//! │  └─────────────┘  └─────────────┘  └─────────────────────┘    │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! The model's reply on each round is a [`ModelTurn`]: either a final answer
//! or a request to invoke tools. The loop matches on it until an answer
//! arrives or the round limit is hit.

pub mod error;
pub mod message;
pub mod provider;
pub mod reasoning;
pub mod registry;
pub mod session;
pub mod tool;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{AgentError, Result};
pub use message::{Conversation, Message, Role};
pub use provider::{Completion, GenerationOptions, LlmProvider, ModelTurn};
pub use reasoning::{Agent, AgentBuilder, AgentConfig};
pub use registry::SessionRegistry;
pub use session::{AgentFactory, ERROR_MARKER, Session, SessionId, SessionState};
pub use tool::{ParameterSchema, Tool, ToolCall, ToolRegistry, ToolResult, ToolSchema};
