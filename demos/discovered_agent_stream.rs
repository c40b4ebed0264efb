//! Resolve an A2A agent from its agent card and stream a story from it
//!
//! Configure with `AIGATEWAY_AGENTS_URL`, `AIGATEWAY_CARD_PATH` and
//! `AIGATEWAY_AGENT_NAME`. Run with `RUST_LOG=tower_chat_agent=debug` to see
//! the card being resolved.

use tower_chat_agent::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = DiscoveryConfig::from_env()?;
    let message = ChatMessage::new("test1234", ChatRole::User, "Tell me a story about boats");

    let mut renderer = Renderer::stdout();
    Invocation::streaming()
        .with_echo(true)
        .with_label("Agent Response:")
        .invoke(AgentSource::Discovered(config), message, &mut renderer)
        .await?;

    Ok(())
}
