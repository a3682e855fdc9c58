//! # Client Configuration
//!
//! Transport-level settings for the session client. The API key travels with
//! each request (`SessionConfig` / `RefreshTokenRequest`), not here.

use std::env;

/// Environment variable overriding the API base URL
pub const API_BASE_URL_VAR: &str = "RAMP_API_BASE_URL";

/// Session client configuration
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// API base URL override (for testing/self-hosted gateways).
    /// When unset, the request's environment decides.
    pub api_base_url: Option<String>,

    /// User-Agent header sent with every request
    pub user_agent: Option<String>,
}

impl ClientConfig {
    /// Load overrides from environment variables.
    ///
    /// Optional env vars:
    /// - `RAMP_API_BASE_URL`
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self {
            api_base_url: env::var(API_BASE_URL_VAR)
                .ok()
                .filter(|v| !v.trim().is_empty()),
            user_agent: None,
        }
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    /// Builder: set the User-Agent header
    pub fn with_user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = Some(agent.into());
        self
    }

    pub(crate) fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("ramp-kit/{}", env!("CARGO_PKG_VERSION")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builders() {
        let config = ClientConfig::default()
            .with_api_base_url("http://127.0.0.1:9999")
            .with_user_agent("merchant/1.0");

        assert_eq!(config.api_base_url.as_deref(), Some("http://127.0.0.1:9999"));
        assert_eq!(config.user_agent(), "merchant/1.0");
    }

    #[test]
    fn test_default_user_agent() {
        assert!(ClientConfig::default().user_agent().starts_with("ramp-kit/"));
    }
}
