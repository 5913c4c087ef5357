//! Session Registry
//!
//! Owned by the server adapter. Maps connection identity to a started
//! session and drives the explicit create/destroy lifecycle.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::error::Result;
use crate::session::{AgentFactory, Session, SessionId};

/// Thread-safe registry of live sessions.
#[derive(Clone)]
pub struct SessionRegistry {
    factory: Arc<dyn AgentFactory>,
    sessions: Arc<RwLock<HashMap<SessionId, Arc<Session>>>>,
}

impl SessionRegistry {
    pub fn new(factory: Arc<dyn AgentFactory>) -> Self {
        Self {
            factory,
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Create and start a session. A session that fails to start is never registered.
    pub async fn create(&self) -> Result<Arc<Session>> {
        let session = Arc::new(Session::new(self.factory.clone()));
        session.start().await?;

        self.sessions
            .write()
            .await
            .insert(session.id().clone(), session.clone());

        tracing::debug!(session = %session.id(), "Session registered");
        Ok(session)
    }

    /// Start a session the registry does not track. The caller owns it and
    /// dropping it releases everything.
    pub async fn start_detached(&self) -> Result<Session> {
        let session = Session::new(self.factory.clone());
        session.start().await?;
        Ok(session)
    }

    pub async fn get(&self, id: &SessionId) -> Option<Arc<Session>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Remove and stop a session. Returns false if it was not registered.
    pub async fn destroy(&self, id: &SessionId) -> bool {
        let removed = self.sessions.write().await.remove(id);
        match removed {
            Some(session) => {
                session.stop().await;
                tracing::debug!(session = %id, "Session destroyed");
                true
            }
            None => false,
        }
    }

    pub async fn ids(&self) -> Vec<SessionId> {
        self.sessions.read().await.keys().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Stop every session (server shutdown)
    pub async fn shutdown(&self) {
        let drained: Vec<_> = self.sessions.write().await.drain().map(|(_, s)| s).collect();
        for session in &drained {
            session.stop().await;
        }
        if !drained.is_empty() {
            tracing::info!(count = drained.len(), "Stopped all sessions");
        }
    }
}
