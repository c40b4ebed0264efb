//! High-level client API for the gateway

pub mod agent;
pub mod builder;
pub mod card_resolver;
pub mod config;

pub use agent::AgentClient;
pub use builder::{AgentClientBuilder, AgentService};
pub use card_resolver::CardResolver;
pub use config::ClientConfig;
