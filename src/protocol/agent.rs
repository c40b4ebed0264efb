//! Agent discovery types: agent cards and the gateway's agent registry

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use url::Url;

/// Agent Card for agent discovery
///
/// The gateway publishes one card per exposed agent at
/// `{agents}/.well-known/{agent-name}.json`. The `url` field is the
/// agent's JSON-RPC invocation endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentCard {
    /// A2A protocol version implemented by the agent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_version: Option<String>,

    /// Name of the agent
    pub name: String,

    /// Human-readable description of the agent
    #[serde(default)]
    pub description: String,

    /// Invocation endpoint
    pub url: Url,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_transport: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub provider: Option<AgentProvider>,

    #[serde(default)]
    pub capabilities: AgentCapabilities,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_input_modes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub default_output_modes: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skills: Vec<AgentSkill>,

    /// Named authentication schemes; `null` when gateway auth is off
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_schemes: Option<HashMap<String, SecurityScheme>>,

    /// Scheme requirements, keyed by scheme name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security: Option<Vec<HashMap<String, Vec<String>>>>,

    /// Agent version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation_url: Option<String>,

    /// Whether an extended card is served to authenticated callers
    #[serde(default)]
    pub supports_authenticated_extended_card: bool,
}

impl AgentCard {
    /// Create a new agent card
    pub fn new(name: impl Into<String>, description: impl Into<String>, url: Url) -> Self {
        Self {
            protocol_version: None,
            name: name.into(),
            description: description.into(),
            url,
            preferred_transport: None,
            provider: None,
            capabilities: AgentCapabilities::default(),
            default_input_modes: Vec::new(),
            default_output_modes: Vec::new(),
            skills: Vec::new(),
            security_schemes: None,
            security: None,
            version: None,
            documentation_url: None,
            supports_authenticated_extended_card: false,
        }
    }

    /// Whether the agent requires any authentication scheme
    pub fn requires_auth(&self) -> bool {
        self.security
            .as_ref()
            .map(|requirements| !requirements.is_empty())
            .unwrap_or(false)
    }
}

/// Agent capabilities
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AgentCapabilities {
    /// Supports `message/stream`
    #[serde(default)]
    pub streaming: bool,

    #[serde(default)]
    pub push_notifications: bool,

    #[serde(default)]
    pub state_transition_history: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentProvider {
    pub organization: String,
    #[serde(default)]
    pub url: Option<String>,
}

/// A capability advertised by an agent
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentSkill {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// API Key security scheme
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiKeySecurityScheme {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "in")]
    pub location: String,
    pub name: String,
}

/// HTTP authentication security scheme
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HttpAuthSecurityScheme {
    #[serde(default)]
    pub description: Option<String>,
    pub scheme: String,
    #[serde(default)]
    pub bearer_format: Option<String>,
}

/// OAuth flow configuration
///
/// URLs are kept as strings: gateways may publish templated values.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlow {
    #[serde(default)]
    pub authorization_url: Option<String>,
    #[serde(default)]
    pub token_url: Option<String>,
    #[serde(default)]
    pub refresh_url: Option<String>,
    #[serde(default)]
    pub scopes: HashMap<String, String>,
}

/// OAuth flows configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OAuthFlows {
    #[serde(default)]
    pub authorization_code: Option<OAuthFlow>,
    #[serde(default)]
    pub client_credentials: Option<OAuthFlow>,
    #[serde(default)]
    pub implicit: Option<OAuthFlow>,
    #[serde(default)]
    pub password: Option<OAuthFlow>,
}

/// OAuth2 security scheme
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OAuth2SecurityScheme {
    #[serde(default)]
    pub description: Option<String>,
    pub flows: OAuthFlows,
    #[serde(default)]
    pub oauth2_metadata_url: Option<String>,
}

/// OpenID Connect security scheme
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OpenIdConnectSecurityScheme {
    #[serde(default)]
    pub description: Option<String>,
    pub open_id_connect_url: String,
}

/// Security scheme for authentication, discriminated by `type`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum SecurityScheme {
    #[serde(rename = "apiKey")]
    ApiKey(ApiKeySecurityScheme),
    #[serde(rename = "http")]
    HttpAuth(HttpAuthSecurityScheme),
    #[serde(rename = "oauth2")]
    OAuth2(Box<OAuth2SecurityScheme>),
    #[serde(rename = "openIdConnect")]
    OpenIdConnect(OpenIdConnectSecurityScheme),
}

/// The gateway's `/.well-known/agents.json` document
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentRegistry {
    #[serde(default)]
    pub agents: Vec<RegistryEntry>,
}

impl AgentRegistry {
    /// Find an agent by name
    pub fn find(&self, name: &str) -> Option<&RegistryEntry> {
        self.agents.iter().find(|entry| entry.name == name)
    }
}

/// One agent listed in the registry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistryEntry {
    pub name: String,

    #[serde(default)]
    pub description: Option<String>,

    /// Whether the agent is active
    #[serde(default)]
    pub state: bool,

    #[serde(default)]
    pub a2a: Option<RegistryA2a>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistryA2a {
    #[serde(default)]
    pub schema_version: Option<String>,
    pub endpoints: RegistryEndpoints,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegistryEndpoints {
    /// Absolute URL of the agent card
    pub card: String,
    /// Absolute invocation URL
    pub url: String,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn gateway_card() -> serde_json::Value {
        json!({
            "protocolVersion": "0.3.0",
            "name": "ai-gk-chatbot",
            "description": "General knowledge chatbot",
            "url": "http://localhost:8080/api/v1/dev/aigateway/agents/ai-gk-chatbot/invoke",
            "preferredTransport": "JSONRPC",
            "provider": {"organization": "Example Org", "url": "https://example.org"},
            "capabilities": {"streaming": true, "pushNotifications": false},
            "defaultInputModes": ["application/json", "text/plain"],
            "defaultOutputModes": ["application/json"],
            "skills": [{
                "id": "ai-gk-chatbot",
                "name": "GK Chatbot",
                "description": "App Type: chat",
                "tags": ["chat-completion"]
            }],
            "securitySchemes": null,
            "security": null,
            "version": "1.0.0"
        })
    }

    #[test]
    fn test_gateway_card_deserialization() {
        let card: AgentCard = serde_json::from_value(gateway_card()).unwrap();

        assert_eq!(card.name, "ai-gk-chatbot");
        assert!(card.capabilities.streaming);
        assert_eq!(card.skills[0].tags, vec!["chat-completion"]);
        assert_eq!(
            card.url.as_str(),
            "http://localhost:8080/api/v1/dev/aigateway/agents/ai-gk-chatbot/invoke"
        );
        assert!(card.security_schemes.is_none());
        assert!(!card.requires_auth());
        assert!(!card.supports_authenticated_extended_card);
    }

    #[test]
    fn test_card_with_security_schemes() {
        let mut value = gateway_card();
        value["securitySchemes"] = json!({
            "aadOAuth": {
                "type": "oauth2",
                "description": "Microsoft Entra ID",
                "flows": {
                    "clientCredentials": {
                        "tokenUrl": "https://login.example.com/tenant/oauth2/v2.0/token",
                        "scopes": {"api://client/.default": "App roles"}
                    }
                },
                "x-aad": {"issuer": "https://login.example.com/tenant/v2.0"}
            },
            "aadBearer": {"type": "http", "scheme": "bearer", "bearerFormat": "JWT"}
        });
        value["security"] = json!([{"aadBearer": []}]);

        let card: AgentCard = serde_json::from_value(value).unwrap();
        let schemes = card.security_schemes.as_ref().unwrap();

        assert!(matches!(schemes["aadOAuth"], SecurityScheme::OAuth2(_)));
        match &schemes["aadBearer"] {
            SecurityScheme::HttpAuth(http) => {
                assert_eq!(http.scheme, "bearer");
                assert_eq!(http.bearer_format.as_deref(), Some("JWT"));
            }
            _ => panic!("Expected http security scheme"),
        }
        assert!(card.requires_auth());
    }

    #[test]
    fn test_card_requires_url() {
        let mut value = gateway_card();
        value.as_object_mut().unwrap().remove("url");
        assert!(serde_json::from_value::<AgentCard>(value).is_err());
    }

    #[test]
    fn test_registry_lookup() {
        let registry: AgentRegistry = serde_json::from_value(json!({
            "agents": [{
                "name": "ai-gk-chatbot",
                "description": "General knowledge chatbot",
                "state": true,
                "a2a": {
                    "schema_version": "0.3.0",
                    "endpoints": {
                        "card": "http://localhost:8080/agents/.well-known/ai-gk-chatbot.json",
                        "url": "http://localhost:8080/agents/ai-gk-chatbot/invoke"
                    }
                }
            }]
        }))
        .unwrap();

        let entry = registry.find("ai-gk-chatbot").unwrap();
        assert!(entry.state);
        assert_eq!(
            entry.a2a.as_ref().unwrap().endpoints.url,
            "http://localhost:8080/agents/ai-gk-chatbot/invoke"
        );
        assert!(registry.find("missing").is_none());
    }
}
