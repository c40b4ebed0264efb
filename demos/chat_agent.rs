//! Ask a chat agent over a gateway model deployment for a joke
//!
//! Configure with `AIGATEWAY_BASE_URL`, `AIGATEWAY_DEPLOYMENT` and one of
//! `AIGATEWAY_API_KEY`, `AIGATEWAY_BEARER_TOKEN` or an `az login` session.

use tower_chat_agent::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let source = AgentSource::Gateway {
        config: GatewayConfig::from_env()?,
        options: AgentOptions::new("Joker").with_instructions("You are good at telling jokes."),
    };

    let mut renderer = Renderer::stdout();
    Invocation::complete()
        .invoke(
            source,
            ChatMessage::user("Tell me a joke about a pirate."),
            &mut renderer,
        )
        .await?;

    Ok(())
}
