//! Gateway service request types

use std::collections::HashMap;

use crate::{layer::auth::AuthCredentials, protocol::operation::AgentOperation};

/// A request to the gateway service
///
/// This wraps an operation with the context needed to execute it
#[derive(Debug, Clone)]
pub struct AgentRequest {
    /// The operation to execute
    pub operation: AgentOperation,

    /// Request context (target, auth, extra headers)
    pub context: RequestContext,
}

impl AgentRequest {
    /// Create a new request
    pub fn new(operation: AgentOperation, context: RequestContext) -> Self {
        Self { operation, context }
    }
}

/// Request context containing credentials and extra headers
///
/// Timeouts are enforced by the service stack, not per request.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    /// URL of the target (gateway, agents root or invocation endpoint)
    pub agent_url: String,

    /// Authentication credentials, filled in by the auth layer
    pub auth: Option<AuthCredentials>,

    /// Additional headers, e.g. `x-thread-id`
    pub metadata: HashMap<String, String>,
}

impl RequestContext {
    /// Create a new request context
    pub fn new(agent_url: impl Into<String>) -> Self {
        Self {
            agent_url: agent_url.into(),
            ..Default::default()
        }
    }

    /// Set authentication credentials
    pub fn with_auth(mut self, auth: AuthCredentials) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Add a metadata header
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
