//! Session Management
//!
//! One session per inbound connection. A session owns its dispatcher and
//! conversation state exclusively and moves through
//! `Created -> Started -> Stopped`.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message};
use crate::reasoning::Agent;

/// Prefix of every answer produced from a failed query
pub const ERROR_MARKER: &str = "❌ Error processing delegated request: ";

/// Unique session identifier
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Lifecycle state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    Created,
    Started,
    Stopped,
}

/// Builds a fresh dispatcher for a session at start time.
///
/// Credentials are read here, so a missing key fails `start` with
/// [`AgentError::Config`] before any network call.
pub trait AgentFactory: Send + Sync {
    fn build(&self) -> Result<Agent>;
}

impl<F> AgentFactory for F
where
    F: Fn() -> Result<Agent> + Send + Sync,
{
    fn build(&self) -> Result<Agent> {
        self()
    }
}

struct SessionInner {
    state: SessionState,
    agent: Option<Arc<Agent>>,
    conversation: Option<Conversation>,
}

/// A conversational session bound to one connection
pub struct Session {
    id: SessionId,
    factory: Arc<dyn AgentFactory>,
    inner: Mutex<SessionInner>,
    cancel: CancellationToken,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Create a new session in the `Created` state
    pub fn new(factory: Arc<dyn AgentFactory>) -> Self {
        Self::with_id(SessionId::new(), factory)
    }

    /// Create with specific ID
    pub fn with_id(id: SessionId, factory: Arc<dyn AgentFactory>) -> Self {
        Self {
            id,
            factory,
            inner: Mutex::new(SessionInner {
                state: SessionState::Created,
                agent: None,
                conversation: None,
            }),
            cancel: CancellationToken::new(),
        }
    }

    pub const fn id(&self) -> &SessionId {
        &self.id
    }

    pub async fn state(&self) -> SessionState {
        self.inner.lock().await.state
    }

    /// Build the dispatcher. Starting an already started session is a no-op.
    pub async fn start(&self) -> Result<()> {
        let mut inner = self.inner.lock().await;
        match inner.state {
            SessionState::Started => return Ok(()),
            SessionState::Stopped => {
                return Err(AgentError::Session(format!("session {} is stopped", self.id)));
            }
            SessionState::Created => {}
        }

        let agent = self.factory.build().inspect_err(|e| {
            tracing::error!(session = %self.id, error = %e, "Session failed to start");
        })?;

        tracing::info!(
            session = %self.id,
            model = %agent.config().generation.model,
            tools = ?agent.tools().names(),
            "Session started"
        );

        inner.agent = Some(Arc::new(agent));
        inner.conversation = Some(Conversation::new());
        inner.state = SessionState::Started;
        Ok(())
    }

    /// Answer one query. Never fails: errors come back as marked text.
    ///
    /// Calls on the same session are serialized; each call starts from an
    /// empty conversation.
    pub async fn execute(&self, query: &str) -> String {
        match self.try_execute(query).await {
            Ok(answer) => {
                tracing::info!(session = %self.id, chars = answer.len(), "Query answered");
                answer
            }
            Err(e) => {
                tracing::error!(session = %self.id, error = %e, "Query failed");
                format!("{ERROR_MARKER}{e}")
            }
        }
    }

    async fn try_execute(&self, query: &str) -> Result<String> {
        let mut inner = self.inner.lock().await;
        if inner.state != SessionState::Started {
            return Err(AgentError::Session(format!(
                "session {} is {:?}, not started",
                self.id, inner.state
            )));
        }
        let agent = inner
            .agent
            .clone()
            .ok_or_else(|| AgentError::Session("dispatcher missing".into()))?;

        tracing::info!(session = %self.id, query, "Processing delegated query");

        let conversation = inner.conversation.insert(Conversation::new());
        conversation.push(Message::user(query));

        tokio::select! {
            result = agent.run(conversation) => result,
            () = self.cancel.cancelled() => Err(AgentError::Cancelled),
        }
    }

    /// Abort in-flight work without releasing handles
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Cancel in-flight work and release all handles. Idempotent.
    pub async fn stop(&self) {
        self.cancel.cancel();

        let mut inner = self.inner.lock().await;
        if inner.state == SessionState::Stopped {
            return;
        }
        inner.agent = None;
        inner.conversation = None;
        inner.state = SessionState::Stopped;
        tracing::info!(session = %self.id, "Session stopped");
    }
}
