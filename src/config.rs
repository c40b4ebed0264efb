//! Configuration for gateway chat agents, remote agents and discovery
//!
//! Every config has a `new`/`default` constructor, `with_*` setters and a
//! `from_env` constructor. Defaults match a local gateway on port 8080.
//!
//! Environment variables:
//! - `AIGATEWAY_BASE_URL`, `AIGATEWAY_DEPLOYMENT`, `AIGATEWAY_API_VERSION`
//! - `AIGATEWAY_API_KEY`, `AIGATEWAY_BEARER_TOKEN`, `AIGATEWAY_USE_AZURE_CLI`
//! - `AIGATEWAY_AGENT_URL`, `AIGATEWAY_AGENT_NAME`, `AIGATEWAY_AGENT_DESCRIPTION`
//! - `AIGATEWAY_AGENTS_URL`, `AIGATEWAY_CARD_PATH`, `AIGATEWAY_AGENT_ID`,
//!   `AIGATEWAY_USE_EXTENDED_CARD`
//! - `AIGATEWAY_MAX_TOKENS`, `AIGATEWAY_TEMPERATURE`

use std::{fmt, str::FromStr, sync::Arc, time::Duration};

use serde_json::{Map, Value};
use url::Url;

use crate::{
    credential::{AzureCliCredential, CredentialProvider},
    layer::auth::AuthCredentials,
    protocol::{agent::AgentCard, chat::ChatCompletionRequest, error::AgentError},
};

/// Placeholder in card path templates
pub const AGENT_NAME_PLACEHOLDER: &str = "{agent-name}";

fn parse_url(value: &str, what: &str) -> Result<Url, AgentError> {
    Url::parse(value)
        .map_err(|e| AgentError::Config(format!("Invalid {} '{}': {}", what, value, e)))
}

fn parse_var<T>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, AgentError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|e| AgentError::Config(format!("Invalid {} '{}': {}", key, value, e)))
        })
        .transpose()
}

fn parse_flag(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<bool> {
    lookup(key).map(|value| matches!(value.trim(), "1" | "true" | "yes"))
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.is_empty())
}

/// How requests authenticate against the gateway
#[derive(Clone, Default, PartialEq)]
pub enum CredentialConfig {
    /// No authentication
    #[default]
    None,

    /// Static API key sent in the given header
    ApiKey { key: String, header: String },

    /// Static bearer token
    Bearer(String),

    /// Entra ID tokens from a logged-in Azure CLI
    AzureCli,
}

impl CredentialConfig {
    /// Header the gateway reads API keys from
    pub const API_KEY_HEADER: &'static str = "api-key";

    /// API key credentials in the default header
    pub fn api_key(key: impl Into<String>) -> Self {
        Self::ApiKey {
            key: key.into(),
            header: Self::API_KEY_HEADER.to_string(),
        }
    }

    /// Build the provider the auth layer asks for credentials
    pub fn into_provider(self) -> Option<Arc<dyn CredentialProvider>> {
        match self {
            CredentialConfig::None => None,
            CredentialConfig::ApiKey { key, header } => {
                Some(Arc::new(AuthCredentials::api_key(key, header)))
            }
            CredentialConfig::Bearer(token) => Some(Arc::new(AuthCredentials::bearer(token))),
            CredentialConfig::AzureCli => Some(Arc::new(AzureCliCredential::new())),
        }
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>, default: Self) -> Self {
        if let Some(key) = lookup("AIGATEWAY_API_KEY") {
            return Self::api_key(key);
        }
        if let Some(token) = lookup("AIGATEWAY_BEARER_TOKEN") {
            return Self::Bearer(token);
        }
        match parse_flag(lookup, "AIGATEWAY_USE_AZURE_CLI") {
            Some(true) => Self::AzureCli,
            Some(false) => Self::None,
            None => default,
        }
    }
}

impl fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialConfig::None => f.write_str("None"),
            CredentialConfig::ApiKey { header, .. } => f
                .debug_struct("ApiKey")
                .field("key", &"[REDACTED]")
                .field("header", header)
                .finish(),
            CredentialConfig::Bearer(_) => f.debug_tuple("Bearer").field(&"[REDACTED]").finish(),
            CredentialConfig::AzureCli => f.write_str("AzureCli"),
        }
    }
}

/// Sampling parameters for generation
///
/// Applied to chat completion requests directly and sent to A2A agents as
/// `metadata.modelParams`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GenerationParams {
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub presence_penalty: Option<f32>,
    pub frequency_penalty: Option<f32>,

    /// End-user tag
    pub user: Option<String>,
}

impl GenerationParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_top_p(mut self, top_p: f32) -> Self {
        self.top_p = Some(top_p);
        self
    }

    pub fn with_presence_penalty(mut self, penalty: f32) -> Self {
        self.presence_penalty = Some(penalty);
        self
    }

    pub fn with_frequency_penalty(mut self, penalty: f32) -> Self {
        self.frequency_penalty = Some(penalty);
        self
    }

    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Read `AIGATEWAY_MAX_TOKENS` and `AIGATEWAY_TEMPERATURE`
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if a variable is set but not a number
    pub fn from_env() -> Result<Self, AgentError> {
        Self::from_lookup(&env_lookup)
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, AgentError> {
        Ok(Self {
            max_tokens: parse_var(lookup, "AIGATEWAY_MAX_TOKENS")?,
            temperature: parse_var(lookup, "AIGATEWAY_TEMPERATURE")?,
            ..Default::default()
        })
    }

    /// Fill unset fields from `defaults`
    pub fn or(self, defaults: GenerationParams) -> Self {
        Self {
            max_tokens: self.max_tokens.or(defaults.max_tokens),
            temperature: self.temperature.or(defaults.temperature),
            top_p: self.top_p.or(defaults.top_p),
            presence_penalty: self.presence_penalty.or(defaults.presence_penalty),
            frequency_penalty: self.frequency_penalty.or(defaults.frequency_penalty),
            user: self.user.or(defaults.user),
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Copy the parameters onto a chat completion request
    pub fn apply(&self, request: &mut ChatCompletionRequest) {
        request.max_tokens = self.max_tokens;
        request.temperature = self.temperature;
        request.top_p = self.top_p;
        request.presence_penalty = self.presence_penalty;
        request.frequency_penalty = self.frequency_penalty;
        request.user = self.user.clone();
    }

    /// The `modelParams` object understood by the gateway's A2A endpoint
    ///
    /// Returns `None` when no parameter is set.
    pub fn to_model_params(&self) -> Option<Value> {
        let mut params = Map::new();

        if let Some(max_tokens) = self.max_tokens {
            params.insert("max_completion_tokens".into(), max_tokens.into());
        }
        if let Some(temperature) = self.temperature {
            params.insert("temperature".into(), temperature.into());
        }
        if let Some(top_p) = self.top_p {
            params.insert("top_p".into(), top_p.into());
        }
        if let Some(penalty) = self.presence_penalty {
            params.insert("presence_penalty".into(), penalty.into());
        }
        if let Some(penalty) = self.frequency_penalty {
            params.insert("frequency_penalty".into(), penalty.into());
        }
        if let Some(user) = &self.user {
            params.insert("user".into(), user.clone().into());
        }

        (!params.is_empty()).then_some(Value::Object(params))
    }
}

/// Configuration of a chat agent behind the gateway's load balancer
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Load balancer URL, e.g. `https://host:port/api/v1/dev/aigateway/lb`
    pub base_url: Url,

    /// Model deployment the requests are routed to
    pub deployment: String,

    /// Optional `api-version` query parameter
    pub api_version: Option<String>,

    pub credential: CredentialConfig,

    pub timeout: Duration,
}

impl GatewayConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8080/api/v1/dev/aigateway/lb";
    pub const DEFAULT_DEPLOYMENT: &'static str = "ai-gk-chatbot";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    /// Create a configuration for a deployment
    ///
    /// Authenticates with the Azure CLI unless another credential is set.
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if the URL does not parse or the
    /// deployment is empty
    pub fn new(base_url: &str, deployment: impl Into<String>) -> Result<Self, AgentError> {
        let deployment = deployment.into();
        if deployment.trim().is_empty() {
            return Err(AgentError::Config("Deployment name cannot be empty".into()));
        }

        Ok(Self {
            base_url: parse_url(base_url, "gateway URL")?,
            deployment,
            api_version: None,
            credential: CredentialConfig::AzureCli,
            timeout: Self::DEFAULT_TIMEOUT,
        })
    }

    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = Some(api_version.into());
        self
    }

    pub fn with_credential(mut self, credential: CredentialConfig) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Creates configuration from `AIGATEWAY_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] for malformed values
    pub fn from_env() -> Result<Self, AgentError> {
        Self::from_lookup(&env_lookup)
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, AgentError> {
        let base_url =
            lookup("AIGATEWAY_BASE_URL").unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string());
        let deployment =
            lookup("AIGATEWAY_DEPLOYMENT").unwrap_or_else(|| Self::DEFAULT_DEPLOYMENT.to_string());

        let credential = CredentialConfig::from_lookup(lookup, CredentialConfig::AzureCli);
        let mut config = Self::new(&base_url, deployment)?.with_credential(credential);
        config.api_version = lookup("AIGATEWAY_API_VERSION");

        Ok(config)
    }
}

/// Configuration of an A2A agent at a fixed invocation URL
#[derive(Debug, Clone)]
pub struct RemoteAgentConfig {
    pub name: String,
    pub description: Option<String>,

    /// JSON-RPC invocation endpoint
    pub url: Url,

    pub timeout: Duration,
    pub credential: CredentialConfig,

    /// Sent as `metadata.modelParams` on every message
    pub params: GenerationParams,
}

impl RemoteAgentConfig {
    pub const DEFAULT_NAME: &'static str = "test-agent";
    pub const DEFAULT_DESCRIPTION: &'static str = "test-agent-description";
    pub const DEFAULT_URL: &'static str =
        "http://localhost:8080/api/v1/dev/aigateway/agents/ai-gk-chatbot/invoke";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Create a configuration for an invocation URL
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if the URL does not parse
    pub fn new(name: impl Into<String>, url: &str) -> Result<Self, AgentError> {
        Ok(Self::with_url(name, parse_url(url, "agent URL")?))
    }

    fn with_url(name: impl Into<String>, url: Url) -> Self {
        Self {
            name: name.into(),
            description: None,
            url,
            timeout: Self::DEFAULT_TIMEOUT,
            credential: CredentialConfig::None,
            params: GenerationParams::default(),
        }
    }

    /// Configuration for the agent a card describes
    pub fn from_card(card: &AgentCard) -> Self {
        let mut config = Self::with_url(card.name.clone(), card.url.clone());
        if !card.description.is_empty() {
            config.description = Some(card.description.clone());
        }
        config
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_credential(mut self, credential: CredentialConfig) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    /// Creates configuration from `AIGATEWAY_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] for malformed values
    pub fn from_env() -> Result<Self, AgentError> {
        Self::from_lookup(&env_lookup)
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, AgentError> {
        let name = lookup("AIGATEWAY_AGENT_NAME").unwrap_or_else(|| Self::DEFAULT_NAME.to_string());
        let url = lookup("AIGATEWAY_AGENT_URL").unwrap_or_else(|| Self::DEFAULT_URL.to_string());
        let description = lookup("AIGATEWAY_AGENT_DESCRIPTION")
            .unwrap_or_else(|| Self::DEFAULT_DESCRIPTION.to_string());

        let credential = CredentialConfig::from_lookup(lookup, CredentialConfig::None);

        Ok(Self::new(name, &url)?
            .with_description(description)
            .with_credential(credential)
            .with_params(GenerationParams::from_lookup(lookup)?))
    }
}

/// Configuration for resolving an agent card from the gateway
#[derive(Debug, Clone)]
pub struct DiscoveryConfig {
    /// Agents root, e.g. `http://localhost:8080/api/v1/dev/aigateway/agents`
    pub base_url: Url,

    /// Card path template, may contain `{agent-name}`
    pub card_path: String,

    /// Agent id substituted into the card path
    pub agent_name: String,

    pub timeout: Duration,
    pub credential: CredentialConfig,

    /// Generation parameters for the resolved agent
    pub params: GenerationParams,

    /// Fetch the authenticated extended card when the public card offers one
    pub use_extended_card: bool,
}

impl DiscoveryConfig {
    pub const DEFAULT_BASE_URL: &'static str = "http://localhost:8080/api/v1/dev/aigateway/agents";
    pub const DEFAULT_CARD_PATH: &'static str = "/.well-known/{agent-name}.json";
    pub const DEFAULT_AGENT_NAME: &'static str = "ai-gk-chatbot";
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
    pub const DEFAULT_USE_EXTENDED_CARD: bool = true;

    /// Create a configuration for an agents root URL
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] if the URL does not parse
    pub fn new(base_url: &str) -> Result<Self, AgentError> {
        Ok(Self {
            base_url: parse_url(base_url, "agents URL")?,
            card_path: Self::DEFAULT_CARD_PATH.to_string(),
            agent_name: Self::DEFAULT_AGENT_NAME.to_string(),
            timeout: Self::DEFAULT_TIMEOUT,
            credential: CredentialConfig::None,
            params: GenerationParams::default(),
            use_extended_card: Self::DEFAULT_USE_EXTENDED_CARD,
        })
    }

    pub fn with_card_path(mut self, card_path: impl Into<String>) -> Self {
        self.card_path = card_path.into();
        self
    }

    pub fn with_agent_name(mut self, agent_name: impl Into<String>) -> Self {
        self.agent_name = agent_name.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_credential(mut self, credential: CredentialConfig) -> Self {
        self.credential = credential;
        self
    }

    pub fn with_params(mut self, params: GenerationParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_extended_card(mut self, use_extended_card: bool) -> Self {
        self.use_extended_card = use_extended_card;
        self
    }

    /// Card path with the agent name filled in
    pub fn card_path(&self) -> String {
        let agent_name = self.agent_name.as_str();
        self.card_path.replace(AGENT_NAME_PLACEHOLDER, agent_name)
    }

    /// Creates configuration from `AIGATEWAY_*` environment variables
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Config`] for malformed values
    pub fn from_env() -> Result<Self, AgentError> {
        Self::from_lookup(&env_lookup)
    }

    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Self, AgentError> {
        let base_url =
            lookup("AIGATEWAY_AGENTS_URL").unwrap_or_else(|| Self::DEFAULT_BASE_URL.to_string());

        let credential = CredentialConfig::from_lookup(lookup, CredentialConfig::None);
        let mut config = Self::new(&base_url)?
            .with_credential(credential)
            .with_params(GenerationParams::from_lookup(lookup)?);

        if let Some(card_path) = lookup("AIGATEWAY_CARD_PATH") {
            config.card_path = card_path;
        }
        if let Some(agent_id) = lookup("AIGATEWAY_AGENT_ID") {
            config.agent_name = agent_id;
        }
        if let Some(use_extended_card) = parse_flag(lookup, "AIGATEWAY_USE_EXTENDED_CARD") {
            config.use_extended_card = use_extended_card;
        }

        Ok(config)
    }
}
