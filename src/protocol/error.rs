//! Error types for agent invocation

use thiserror::Error;

use super::task::TaskState;

/// Main error type for agent construction, discovery and invocation
#[derive(Debug, Error)]
pub enum AgentError {
    /// Transport-level error (network, connection, etc.)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Protocol-level error (invalid envelope, unexpected response kind, etc.)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Validation error (invalid request or response)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication or authorization error reported by the gateway
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A credential provider failed to produce credentials
    #[error("Credential error: {0}")]
    Credential(String),

    /// Invalid configuration (unparseable URL, missing deployment, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Local I/O error (rendering output, spawning a credential helper)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Request timeout error
    #[error("Request timeout")]
    Timeout,

    /// The agent or gateway could not be reached at all
    #[error("Agent unreachable at {url}: {reason}")]
    Unreachable { url: String, reason: String },

    /// The gateway answered but does not know the agent or document
    #[error("Agent not found: {url}")]
    AgentNotFound { url: String },

    /// An agent card was fetched but could not be understood
    #[error("Malformed agent card at {url}: {reason}")]
    MalformedDescriptor { url: String, reason: String },

    /// The agent answered without any response text
    #[error("Agent returned an empty response")]
    EmptyResponse,

    /// The remote task ended in a non-successful state
    #[error("Task ended in state '{state}': {message}")]
    TaskFailed { state: TaskState, message: String },

    /// JSON-RPC error object returned by an A2A endpoint
    #[error("JSON-RPC error {code}: {message}")]
    JsonRpc { code: i64, message: String },

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Generic error with custom message
    #[error("{0}")]
    Other(String),
}

impl From<reqwest::Error> for AgentError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AgentError::Timeout
        } else if err.is_connect() {
            AgentError::Unreachable {
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
                reason: err.to_string(),
            }
        } else {
            AgentError::Transport(err.to_string())
        }
    }
}

impl From<&str> for AgentError {
    fn from(s: &str) -> Self {
        AgentError::Other(s.to_string())
    }
}

impl From<String> for AgentError {
    fn from(s: String) -> Self {
        AgentError::Other(s)
    }
}
