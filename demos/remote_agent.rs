//! Ask an A2A agent at a fixed invocation URL for a joke
//!
//! Configure with `AIGATEWAY_AGENT_URL`, `AIGATEWAY_AGENT_NAME` and
//! `AIGATEWAY_AGENT_DESCRIPTION`.

use tower_chat_agent::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = RemoteAgentConfig::from_env()?;
    let message = ChatMessage::new("test1234", ChatRole::User, "Tell me a joke about rain");

    let mut renderer = Renderer::stdout();
    Invocation::complete()
        .with_echo(true)
        .with_label("Agent Response:")
        .invoke(AgentSource::Remote(config), message, &mut renderer)
        .await?;

    Ok(())
}
