//! Application State

use std::sync::Arc;

use agent_core::SessionRegistry;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Live sessions, one per connection or explicit `POST /sessions`
    pub registry: SessionRegistry,

    /// Reported by `/health`
    pub info: Arc<ServiceInfo>,
}

#[derive(Debug)]
pub struct ServiceInfo {
    pub model: String,
    pub tools: Vec<String>,
}
