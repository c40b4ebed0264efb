//! Client configuration

use std::time::Duration;

/// Configuration for a gateway client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// URL of the target: gateway load balancer, agents root or invocation endpoint
    pub agent_url: String,

    /// Time allowed for a request to produce a response
    ///
    /// For streamed responses this bounds the wait for the response head;
    /// the transport bounds each read of the body.
    pub timeout: Duration,
}

impl ClientConfig {
    /// Create a new client configuration
    pub fn new(agent_url: impl Into<String>) -> Self {
        Self {
            agent_url: agent_url.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Set the timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new("")
    }
}
