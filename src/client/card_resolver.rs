//! Agent card resolution
//!
//! Resolves the card an A2A agent publishes under a well-known path of the
//! gateway's agents root. Each lookup builds a short-lived client over the
//! resolver's transport; the client is dropped when the lookup returns.

use std::{sync::Arc, time::Duration};

use tracing::{debug, warn};
use url::Url;

use crate::{
    client::{AgentClient, AgentClientBuilder, AgentService},
    codec::JsonCodec,
    config::DiscoveryConfig,
    credential::CredentialProvider,
    protocol::{AgentCard, AgentError, AgentOperation, AgentRegistry},
    transport::{HttpTransport, Transport},
};

/// Path of the standard public agent card
pub const DEFAULT_CARD_PATH: &str = "/.well-known/agent-card.json";

/// Path of the extended card served to authenticated callers
pub const EXTENDED_CARD_PATH: &str = "/agent/authenticatedExtendedCard";

/// Fetches agent cards and the agent registry from a gateway
///
/// # Example
///
/// ```rust,no_run
/// use std::time::Duration;
/// use tower_chat_agent::client::CardResolver;
///
/// # async fn example() -> Result<(), tower_chat_agent::protocol::AgentError> {
/// let base = "http://localhost:8080/api/v1/dev/aigateway/agents".parse().unwrap();
/// let resolver = CardResolver::new(base, Duration::from_secs(60))?;
///
/// let card = resolver.get_agent_card(Some("/.well-known/ai-gk-chatbot.json")).await?;
/// println!("{} at {}", card.name, card.url);
/// # Ok(())
/// # }
/// ```
pub struct CardResolver<T: Transport = HttpTransport> {
    transport: T,
    timeout: Duration,
    credentials: Option<Arc<dyn CredentialProvider>>,
}

impl CardResolver<HttpTransport> {
    /// Create a resolver for an agents root URL
    ///
    /// # Arguments
    ///
    /// * `base_url` - Agents root the card paths are resolved against
    /// * `timeout` - Bound on connecting, on each read and on the whole lookup
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, AgentError> {
        let transport = HttpTransport::with_timeout(base_url, timeout)?;
        Ok(Self::with_transport(transport).with_timeout(timeout))
    }

    /// Create a resolver from a discovery configuration
    pub fn from_config(config: &DiscoveryConfig) -> Result<Self, AgentError> {
        Ok(Self::new(config.base_url.clone(), config.timeout)?
            .with_credentials(config.credential.clone().into_provider()))
    }
}

impl<T: Transport> CardResolver<T> {
    /// Create a resolver over an existing transport
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport,
            timeout: DiscoveryConfig::DEFAULT_TIMEOUT,
            credentials: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Authenticate lookups with the given provider
    pub fn with_credentials(mut self, credentials: Option<Arc<dyn CredentialProvider>>) -> Self {
        self.credentials = credentials;
        self
    }

    /// The agents root card paths are resolved against
    pub fn base_url(&self) -> &Url {
        self.transport.base_url()
    }

    fn client(&self) -> Result<AgentClient<AgentService>, AgentError> {
        AgentClientBuilder::new(self.transport.base_url().clone())
            .with_transport(self.transport.clone())
            .with_codec(Arc::new(JsonCodec::new()))
            .with_credential_provider(self.credentials.clone())
            .with_timeout(self.timeout)
            .build()
    }

    /// Fetch and parse an agent card
    ///
    /// # Arguments
    ///
    /// * `path` - Card path relative to the agents root, defaults to
    ///   [`DEFAULT_CARD_PATH`]
    ///
    /// # Errors
    ///
    /// - [`AgentError::Unreachable`] if the gateway cannot be reached
    /// - [`AgentError::AgentNotFound`], [`AgentError::Auth`] or
    ///   [`AgentError::Transport`] for error statuses
    /// - [`AgentError::MalformedDescriptor`] if the document is not a valid card
    pub async fn get_agent_card(&self, path: Option<&str>) -> Result<AgentCard, AgentError> {
        let path = path.unwrap_or(DEFAULT_CARD_PATH).to_string();
        let url = self.transport.url_for(
            &AgentOperation::GetAgentCard { path: path.clone() }.endpoint(),
        );

        debug!(url = %url, "resolving agent card");

        let mut client = self.client()?;
        match client.get_agent_card(path).await {
            Ok(card) => {
                debug!(name = %card.name, url = %card.url, "resolved agent card");
                Ok(card)
            }
            Err(AgentError::Serialization(e)) => Err(AgentError::MalformedDescriptor {
                url,
                reason: e.to_string(),
            }),
            Err(AgentError::Validation(reason)) | Err(AgentError::Protocol(reason)) => {
                Err(AgentError::MalformedDescriptor { url, reason })
            }
            Err(e) => Err(e),
        }
    }

    /// Upgrade a public card to the authenticated extended card
    ///
    /// Returns the public card unchanged when it does not advertise an
    /// extended card or when fetching it fails.
    pub async fn get_extended_card(&self, public: AgentCard) -> AgentCard {
        if !public.supports_authenticated_extended_card {
            return public;
        }

        match self.get_agent_card(Some(EXTENDED_CARD_PATH)).await {
            Ok(extended) => extended,
            Err(e) => {
                warn!(agent = %public.name, error = %e, "extended agent card unavailable, using public card");
                public
            }
        }
    }

    /// Fetch the gateway's registry of exposed agents
    pub async fn list_agents(&self) -> Result<AgentRegistry, AgentError> {
        self.client()?.list_agents().await
    }
}
