//! Client builder for constructing gateway clients with composable layers

use std::{sync::Arc, time::Duration};

use tower::{timeout::error::Elapsed, util::BoxCloneService, BoxError, ServiceBuilder};
use url::Url;

use crate::{
    client::{AgentClient, ClientConfig},
    codec::{Codec, JsonRpcCodec},
    credential::CredentialProvider,
    layer::{AgentValidationLayer, AuthCredentials, AuthLayer},
    protocol::error::AgentError,
    service::{AgentProtocolService, AgentRequest, AgentResponse},
    transport::{HttpTransport, Transport},
};

/// The assembled service stack behind an [`AgentClient`]
///
/// Layers, outermost first: error mapping, timeout, authentication,
/// validation, protocol service.
pub type AgentService = BoxCloneService<AgentRequest, AgentResponse, AgentError>;

/// Recover an [`AgentError`] from a boxed middleware error
fn map_boxed_error(error: BoxError) -> AgentError {
    if error.is::<Elapsed>() {
        return AgentError::Timeout;
    }

    match error.downcast::<AgentError>() {
        Ok(error) => *error,
        Err(other) => AgentError::Other(other.to_string()),
    }
}

/// Builder for constructing gateway clients
///
/// This builder provides a fluent API for configuring and building a client
/// with customizable transport, codec, authentication and timeout.
///
/// # Example
///
/// ```rust,no_run
/// use tower_chat_agent::prelude::*;
/// use std::time::Duration;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let url = "http://localhost:8080/api/v1/dev/aigateway/agents".parse().unwrap();
/// let mut client = AgentClientBuilder::new_http(url)
///     .with_bearer_auth("token123")
///     .with_timeout(Duration::from_secs(60))
///     .build()?;
///
/// let registry = client.list_agents().await?;
/// println!("{} agents", registry.agents.len());
/// # Ok(())
/// # }
/// ```
///
/// # Compiler Error
/// This will fail to compile if it is not clear to the compiler which type
/// implementing `Transport` is being used as underlying transport. This is
/// expected behaviour.
///
/// ```compile_fail
/// let client = AgentClientBuilder::new(agent_url()).build();
/// ```
pub struct AgentClientBuilder<T: Transport> {
    agent_url: Url,
    transport: Option<T>,
    codec: Option<Arc<dyn Codec>>,
    credentials: Option<Arc<dyn CredentialProvider>>,
    timeout: Duration,
}

impl<T: Transport> AgentClientBuilder<T> {
    /// Create a builder for a target URL
    ///
    /// # Arguments
    ///
    /// * `agent_url` - The URL of the target (used for request context)
    pub fn new(agent_url: Url) -> Self {
        Self {
            agent_url,
            transport: None,
            codec: None,
            credentials: None,
            timeout: Duration::from_secs(30),
        }
    }

    /// Use a custom transport
    ///
    /// # Arguments
    ///
    /// * `transport` - The transport implementation to use
    pub fn with_transport(mut self, transport: T) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Use a custom codec
    ///
    /// # Arguments
    ///
    /// * `codec` - The codec implementation to use
    pub fn with_codec(mut self, codec: Arc<dyn Codec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Enable bearer token authentication
    ///
    /// # Arguments
    ///
    /// * `token` - The bearer token for authentication
    pub fn with_bearer_auth(self, token: impl Into<String>) -> Self {
        self.with_auth(AuthCredentials::bearer(token))
    }

    /// Enable API key authentication
    ///
    /// # Arguments
    ///
    /// * `key` - The API key
    /// * `header` - The header name for the API key (e.g., "api-key")
    pub fn with_api_key_auth(self, key: impl Into<String>, header: impl Into<String>) -> Self {
        self.with_auth(AuthCredentials::api_key(key, header))
    }

    /// Set static authentication credentials
    pub fn with_auth(mut self, credentials: AuthCredentials) -> Self {
        self.credentials = Some(Arc::new(credentials));
        self
    }

    /// Ask a provider for credentials on every request
    ///
    /// Passing `None` removes any configured authentication.
    pub fn with_credential_provider(
        mut self,
        provider: Option<Arc<dyn CredentialProvider>>,
    ) -> Self {
        self.credentials = provider;
        self
    }

    /// Set the request timeout
    ///
    /// # Arguments
    ///
    /// * `timeout` - The timeout duration for requests
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Build the client
    ///
    /// This assembles all the Tower layers and returns a configured client.
    ///
    /// # Returns
    ///
    /// A configured `AgentClient` ready to use
    ///
    /// # Errors
    ///
    /// Returns an error if no transport has been configured
    pub fn build(self) -> Result<AgentClient<AgentService>, AgentError> {
        let transport = self.transport.ok_or_else(|| {
            AgentError::Config("Transport not configured. Call with_transport()".into())
        })?;

        let codec = self.codec.unwrap_or_else(|| Arc::new(JsonRpcCodec::new()));

        let service = ServiceBuilder::new()
            .map_err(map_boxed_error)
            .timeout(self.timeout)
            .layer(AuthLayer::optional(self.credentials))
            .layer(AgentValidationLayer::new())
            .service(AgentProtocolService::new(transport, codec));

        let config = ClientConfig::new(self.agent_url).with_timeout(self.timeout);

        Ok(AgentClient::new(BoxCloneService::new(service), config))
    }
}

impl AgentClientBuilder<HttpTransport> {
    /// Create a new client builder with HTTP transport (JSON-RPC binding)
    ///
    /// # Arguments
    ///
    /// * `agent_url` - The URL requests are sent to
    pub fn new_http(agent_url: Url) -> Self {
        let transport = HttpTransport::new(agent_url.clone());
        Self::new(agent_url).with_transport(transport)
    }
}
