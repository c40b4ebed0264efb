//! Agent discovery against an unreachable gateway

use std::time::Duration;

use tower_chat_agent::prelude::*;

fn unreachable_config() -> DiscoveryConfig {
    DiscoveryConfig::new("http://127.0.0.1:1/api/v1/dev/aigateway/agents")
        .unwrap()
        .with_agent_name("ai-gk-chatbot")
        .with_timeout(Duration::from_secs(2))
}

#[tokio::test]
async fn test_resolver_reports_unreachable_gateway() {
    let config = unreachable_config();
    let resolver = CardResolver::from_config(&config).unwrap();

    match resolver.get_agent_card(Some(&config.card_path())).await {
        Err(AgentError::Unreachable { .. }) | Err(AgentError::Timeout) => {}
        other => panic!("Expected Unreachable error, got {:?}", other.err()),
    }
}

#[tokio::test]
async fn test_failed_discovery_prints_no_response() {
    let mut renderer = Renderer::new(Vec::new());

    let result = Invocation::streaming()
        .with_echo(true)
        .with_label("Agent Response:")
        .invoke(
            AgentSource::Discovered(unreachable_config()),
            ChatMessage::new("test1234", ChatRole::User, "Tell me a story about boats"),
            &mut renderer,
        )
        .await;

    assert!(result.is_err());

    let printed = String::from_utf8(renderer.into_inner()).unwrap();
    assert!(!printed.contains("Agent Response"));
}
