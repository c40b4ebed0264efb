//! Credential providers for gateway authentication
//!
//! A [`CredentialProvider`] hands the auth layer fresh credentials for each
//! request. Static credentials implement it directly. [`AzureCliCredential`]
//! obtains Entra ID tokens from a logged-in Azure CLI and caches them until
//! shortly before they expire.

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;
use tokio::{process::Command, sync::Mutex};

use crate::{layer::auth::AuthCredentials, protocol::error::AgentError};

/// Resource the gateway's Entra ID tokens are issued for
pub const COGNITIVE_SERVICES_RESOURCE: &str = "https://cognitiveservices.azure.com";

/// Tokens are refreshed this many minutes before they expire
const REFRESH_MARGIN_MINUTES: i64 = 5;

/// Source of credentials for outgoing requests
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Credentials to attach to the next request
    ///
    /// # Errors
    ///
    /// Returns [`AgentError::Credential`] if no credentials can be obtained
    async fn credentials(&self) -> Result<AuthCredentials, AgentError>;
}

#[async_trait]
impl CredentialProvider for AuthCredentials {
    async fn credentials(&self) -> Result<AuthCredentials, AgentError> {
        Ok(self.clone())
    }
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + chrono::Duration::minutes(REFRESH_MARGIN_MINUTES) < self.expires_at
    }
}

/// Output of `az account get-access-token --output json`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzCliToken {
    access_token: String,

    /// Local time, e.g. `2025-01-01 12:00:00.000000`
    #[serde(default)]
    expires_on: Option<String>,

    /// Unix timestamp, reported by newer CLI versions
    #[serde(default, rename = "expires_on")]
    expires_on_unix: Option<i64>,
}

impl AzCliToken {
    fn expires_at(&self) -> DateTime<Utc> {
        self.expires_on_unix
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .or_else(|| self.expires_on.as_deref().and_then(parse_local_expiry))
            .unwrap_or_else(Utc::now)
    }
}

fn parse_local_expiry(value: &str) -> Option<DateTime<Utc>> {
    let naive = NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f").ok()?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// Entra ID tokens from the Azure CLI
///
/// Requires a prior `az login`. Tokens are cached and reused until five
/// minutes before expiry.
#[derive(Debug)]
pub struct AzureCliCredential {
    resource: String,
    cached: Mutex<Option<CachedToken>>,
}

impl AzureCliCredential {
    /// Create a credential for the Cognitive Services resource
    pub fn new() -> Self {
        Self::with_resource(COGNITIVE_SERVICES_RESOURCE)
    }

    /// Create a credential for a different resource
    pub fn with_resource(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            cached: Mutex::new(None),
        }
    }

    fn program() -> &'static str {
        if cfg!(windows) {
            "az.cmd"
        } else {
            "az"
        }
    }

    async fn fetch_token(&self) -> Result<CachedToken, AgentError> {
        tracing::debug!(resource = %self.resource, "requesting token from Azure CLI");

        let output = Command::new(Self::program())
            .args([
                "account",
                "get-access-token",
                "--resource",
                &self.resource,
                "--output",
                "json",
            ])
            .output()
            .await
            .map_err(|e| AgentError::Credential(format!("Failed to run Azure CLI: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AgentError::Credential(format!(
                "Azure CLI token request failed: {}",
                stderr.trim()
            )));
        }

        Self::parse_output(&output.stdout)
    }

    fn parse_output(stdout: &[u8]) -> Result<CachedToken, AgentError> {
        let token: AzCliToken = serde_json::from_slice(stdout).map_err(|e| {
            AgentError::Credential(format!("Unexpected Azure CLI output: {}", e))
        })?;

        if token.access_token.is_empty() {
            return Err(AgentError::Credential(
                "Azure CLI returned an empty access token".into(),
            ));
        }

        Ok(CachedToken {
            expires_at: token.expires_at(),
            token: token.access_token,
        })
    }
}

impl Default for AzureCliCredential {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CredentialProvider for AzureCliCredential {
    async fn credentials(&self) -> Result<AuthCredentials, AgentError> {
        let mut cached = self.cached.lock().await;

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(AuthCredentials::bearer(token.token.clone()));
        }

        let token = self.fetch_token().await?;
        let credentials = AuthCredentials::bearer(token.token.clone());
        *cached = Some(token);

        Ok(credentials)
    }
}
