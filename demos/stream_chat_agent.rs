//! Stream a short story from a chat agent over a gateway model deployment

use tower_chat_agent::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let params = GenerationParams::from_env()?.or(GenerationParams::new()
        .with_max_tokens(1000)
        .with_temperature(0.7));

    let source = AgentSource::Gateway {
        config: GatewayConfig::from_env()?,
        options: AgentOptions::new("StoryTeller")
            .with_instructions("You are good at telling great stories.")
            .with_params(params),
    };

    let mut renderer = Renderer::stdout();
    Invocation::streaming()
        .with_label("Agent:")
        .invoke(
            source,
            ChatMessage::user("Tell me a short story about a robot"),
            &mut renderer,
        )
        .await?;

    Ok(())
}
