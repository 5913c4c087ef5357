//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Agent error types
#[derive(Error, Debug)]
pub enum AgentError {
    /// LLM provider error
    #[error("Provider error: {0}")]
    Provider(String),

    /// Provider unavailable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Tool not found in registry
    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Tool validation failed
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    /// Tool execution failed
    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Round limit reached in the dispatch loop
    #[error("Round limit exceeded: {0} model round trips without a final answer")]
    MaxIterations(usize),

    /// A model or tool call did not finish within the round timeout
    #[error("Timed out after {secs}s waiting for {what}")]
    Timeout { what: String, secs: u64 },

    /// In-flight work was cancelled (connection closed or session stopped)
    #[error("Request cancelled")]
    Cancelled,

    /// Parse error (e.g., malformed tool call arguments)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Session error
    #[error("Session error: {0}")]
    Session(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rate limited
    #[error("Rate limited: {0}")]
    RateLimited(String),

    /// Authentication failed
    #[error("Authentication failed: {0}")]
    Auth(String),
}

impl AgentError {
    /// Configuration errors are the only ones allowed to escape a session's lifecycle.
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Whether the model should see this tool error and get a chance to correct itself
    pub const fn is_recoverable_tool_error(&self) -> bool {
        matches!(self, Self::ToolNotFound(_) | Self::ToolValidation(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(AgentError::Config("missing key".into()).is_config());
        assert!(!AgentError::Provider("boom".into()).is_config());

        assert!(AgentError::ToolNotFound("x".into()).is_recoverable_tool_error());
        assert!(AgentError::ToolValidation("x".into()).is_recoverable_tool_error());
        assert!(!AgentError::ToolExecution("x".into()).is_recoverable_tool_error());
    }

    #[test]
    fn test_round_limit_message() {
        let err = AgentError::MaxIterations(10);
        assert!(err.to_string().contains("Round limit exceeded"));
    }
}
