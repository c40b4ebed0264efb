//! Authentication layer for gateway requests

use std::{
    fmt,
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use tower_layer::Layer;
use tower_service::Service;

use crate::{
    credential::CredentialProvider,
    protocol::error::AgentError,
    service::{AgentRequest, AgentResponse},
};

/// Authentication credentials
#[derive(Debug, Clone, PartialEq)]
pub enum AuthCredentials {
    /// Bearer token authentication
    Bearer(String),

    /// API key authentication
    ApiKey { key: String, header: String },
}

impl AuthCredentials {
    /// Create bearer token credentials
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer(token.into())
    }

    /// Create API key credentials
    pub fn api_key(key: impl Into<String>, header: impl Into<String>) -> Self {
        Self::ApiKey {
            key: key.into(),
            header: header.into(),
        }
    }

    /// Get the header name and value for this credential
    pub fn to_header(&self) -> (String, String) {
        match self {
            AuthCredentials::Bearer(token) => {
                ("Authorization".to_string(), format!("Bearer {}", token))
            }
            AuthCredentials::ApiKey { key, header } => (header.clone(), key.clone()),
        }
    }
}

/// Authentication layer
///
/// Asks its [`CredentialProvider`] for credentials on every request, so
/// expiring tokens are refreshed by the provider. Without a provider,
/// requests pass through untouched.
#[derive(Clone, Default)]
pub struct AuthLayer {
    provider: Option<Arc<dyn CredentialProvider>>,
}

impl AuthLayer {
    /// Create a new authentication layer
    pub fn new(provider: Arc<dyn CredentialProvider>) -> Self {
        Self {
            provider: Some(provider),
        }
    }

    /// Create a layer that authenticates only when a provider is given
    pub fn optional(provider: Option<Arc<dyn CredentialProvider>>) -> Self {
        Self { provider }
    }
}

impl fmt::Debug for AuthLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthLayer")
            .field("provider", &self.provider.is_some())
            .finish()
    }
}

impl<S> Layer<S> for AuthLayer {
    type Service = AuthService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthService {
            inner,
            provider: self.provider.clone(),
        }
    }
}

/// Authentication service
#[derive(Clone)]
pub struct AuthService<S> {
    inner: S,
    provider: Option<Arc<dyn CredentialProvider>>,
}

impl<S> Service<AgentRequest> for AuthService<S>
where
    S: Service<AgentRequest, Response = AgentResponse, Error = AgentError> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = AgentResponse;
    type Error = AgentError;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: AgentRequest) -> Self::Future {
        // The readied service handles this call; the clone stays for the next one
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let provider = self.provider.clone();

        Box::pin(async move {
            if let Some(provider) = provider {
                req.context.auth = Some(provider.credentials().await?);
            }
            inner.call(req).await
        })
    }
}
