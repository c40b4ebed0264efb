//! One-shot agent invocation
//!
//! Connects to an agent, sends a single message and renders the response.
//! The three agent sources and the two response modes combine into every
//! invocation flavour the demos need.

use std::io::Write;

use tracing::info;

use crate::{
    agent::{Agent, AgentOptions, ChatClient, RemoteAgent},
    client::CardResolver,
    config::{DiscoveryConfig, GatewayConfig, RemoteAgentConfig},
    protocol::{agent::AgentCard, error::AgentError, message::ChatMessage},
    render::Renderer,
};

/// Where the agent comes from
#[derive(Debug, Clone)]
pub enum AgentSource {
    /// A chat agent over a model deployment behind the gateway
    Gateway {
        config: GatewayConfig,
        options: AgentOptions,
    },

    /// An A2A agent at a fixed invocation URL
    Remote(RemoteAgentConfig),

    /// An A2A agent resolved from its agent card
    Discovered(DiscoveryConfig),
}

impl AgentSource {
    /// Build the agent handle
    ///
    /// For discovered agents this fetches the card; the resolver is dropped
    /// before the agent is returned.
    ///
    /// # Errors
    ///
    /// Returns configuration errors, and for discovered agents any error
    /// from resolving the card
    pub async fn connect(self) -> Result<Box<dyn Agent>, AgentError> {
        match self {
            AgentSource::Gateway { config, options } => {
                let agent = ChatClient::new(config)?.create_agent(options)?;
                Ok(Box::new(agent))
            }
            AgentSource::Remote(config) => Ok(Box::new(RemoteAgent::new(config)?)),
            AgentSource::Discovered(config) => {
                let card = resolve_card(&config).await?;
                info!(name = %card.name, url = %card.url, "connecting to discovered agent");

                let agent_config = RemoteAgentConfig::from_card(&card)
                    .with_credential(config.credential)
                    .with_params(config.params);
                Ok(Box::new(RemoteAgent::new(agent_config)?))
            }
        }
    }
}

async fn resolve_card(config: &DiscoveryConfig) -> Result<AgentCard, AgentError> {
    let resolver = CardResolver::from_config(config)?;
    let card = resolver.get_agent_card(Some(&config.card_path())).await?;

    if config.use_extended_card {
        Ok(resolver.get_extended_card(card).await)
    } else {
        Ok(card)
    }
}

/// How the response is consumed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseMode {
    /// Wait for the whole response and print it as one block
    Complete,

    /// Print fragments as they arrive
    Streaming,
}

/// A single message exchange and how to render it
#[derive(Debug, Clone)]
pub struct Invocation {
    mode: ResponseMode,
    echo_user: bool,
    label: Option<String>,
}

impl Invocation {
    pub fn new(mode: ResponseMode) -> Self {
        Self {
            mode,
            echo_user: false,
            label: None,
        }
    }

    pub fn complete() -> Self {
        Self::new(ResponseMode::Complete)
    }

    pub fn streaming() -> Self {
        Self::new(ResponseMode::Streaming)
    }

    /// Print `User message:  <text>` before the response
    pub fn with_echo(mut self, echo_user: bool) -> Self {
        self.echo_user = echo_user;
        self
    }

    /// Label printed ahead of the response
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn mode(&self) -> ResponseMode {
        self.mode
    }

    /// Send `message` to an existing agent and render the response
    ///
    /// # Returns
    ///
    /// The full response text
    pub async fn run<W: Write + Send>(
        &self,
        agent: &mut dyn Agent,
        message: ChatMessage,
        renderer: &mut Renderer<W>,
    ) -> Result<String, AgentError> {
        if self.echo_user {
            renderer.user_message(message.text())?;
        }

        match self.mode {
            ResponseMode::Complete => {
                let response = agent.run(message).await?;
                renderer.complete(self.label.as_deref(), response.text())?;
                Ok(response.text().to_string())
            }
            ResponseMode::Streaming => {
                let updates = agent.run_stream(message).await?;
                renderer.stream(self.label.as_deref(), updates).await
            }
        }
    }

    /// Connect to the agent, then send `message` and render the response
    ///
    /// Nothing is rendered when connecting fails.
    pub async fn invoke<W: Write + Send>(
        &self,
        source: AgentSource,
        message: ChatMessage,
        renderer: &mut Renderer<W>,
    ) -> Result<String, AgentError> {
        let mut agent = source.connect().await?;
        self.run(agent.as_mut(), message, renderer).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invocation_defaults() {
        let invocation = Invocation::streaming().with_label("Agent:");

        assert_eq!(invocation.mode(), ResponseMode::Streaming);
        assert!(!invocation.echo_user);
        assert_eq!(invocation.label.as_deref(), Some("Agent:"));
    }
}
