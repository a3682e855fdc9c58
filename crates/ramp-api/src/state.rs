//! # Application State
//!
//! Shared state for the Axum application.
//! Holds the API key, the session issuer and per-deployment session defaults.

use ramp_core::{BoxedSessionIssuer, Environment};
use ramp_session::RampSessionClient;
use serde::Deserialize;
use std::sync::Arc;

/// Application configuration
#[derive(Clone)]
pub struct AppConfig {
    /// Host to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Ramp API key; never leaves this process
    pub api_key: String,
    /// Ramp environment sessions are opened in
    pub environment: Environment,
}

impl AppConfig {
    /// Load from environment variables.
    ///
    /// Required: `RAMP_API_KEY`. Optional: `RAMP_ENVIRONMENT`, `HOST`, `PORT`.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("RAMP_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| anyhow::anyhow!("RAMP_API_KEY not set"))?;

        let environment = match std::env::var("RAMP_ENVIRONMENT") {
            Ok(value) => value.parse()?,
            Err(_) => Environment::default(),
        };

        Ok(Self {
            host: std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            api_key,
            environment,
        })
    }

    /// Get the socket address to bind to
    pub fn socket_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("Invalid socket address: {}", e))
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("api_key", &"<redacted>")
            .field("environment", &self.environment)
            .finish()
    }
}

/// Defaults applied when a session request leaves a field out
#[derive(Debug, Clone, Deserialize)]
pub struct SessionDefaults {
    #[serde(default = "default_quote_currency")]
    pub quote_currency: String,
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    #[serde(default)]
    pub webhook_url: Option<String>,
}

fn default_quote_currency() -> String {
    "USD".to_string()
}

fn default_base_currency() -> String {
    "BTC".to_string()
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            quote_currency: default_quote_currency(),
            base_currency: default_base_currency(),
            webhook_url: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RampFile {
    #[serde(default)]
    session: Option<SessionDefaults>,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Session issuer (remote API client)
    pub issuer: BoxedSessionIssuer,
    /// Session defaults
    pub defaults: SessionDefaults,
    /// Application config
    pub config: AppConfig,
}

impl AppState {
    /// Create a new AppState backed by the HTTP session client
    pub fn new() -> anyhow::Result<Self> {
        let config = AppConfig::from_env()?;
        let defaults = load_session_defaults()?;

        let client = RampSessionClient::from_env()
            .map_err(|e| anyhow::anyhow!("Failed to initialize session client: {}", e))?;

        Ok(Self::with_issuer(config, defaults, Arc::new(client)))
    }

    /// Assemble state from parts (used by tests)
    pub fn with_issuer(
        config: AppConfig,
        defaults: SessionDefaults,
        issuer: BoxedSessionIssuer,
    ) -> Self {
        Self {
            issuer,
            defaults,
            config,
        }
    }
}

/// Parse the `[session]` table of a ramp.toml document
pub fn parse_session_defaults(content: &str) -> anyhow::Result<SessionDefaults> {
    let file: RampFile = toml::from_str(content)?;
    Ok(file.session.unwrap_or_default())
}

/// Load session defaults from config file
fn load_session_defaults() -> anyhow::Result<SessionDefaults> {
    let config_paths = [
        "config/ramp.toml",
        "../config/ramp.toml",
        "../../config/ramp.toml",
    ];

    for path in config_paths {
        if let Ok(content) = std::fs::read_to_string(path) {
            let defaults = parse_session_defaults(&content)
                .map_err(|e| anyhow::anyhow!("Failed to parse {}: {}", path, e))?;
            tracing::info!("Loaded session defaults from {}", path);
            return Ok(defaults);
        }
    }

    tracing::warn!("No ramp.toml found, using built-in session defaults");
    Ok(SessionDefaults::default())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_session_defaults() {
        let defaults = parse_session_defaults(
            r#"
            [session]
            quote_currency = "EUR"
            webhook_url = "https://merchant.test/hooks/ramp"
            "#,
        )
        .unwrap();

        assert_eq!(defaults.quote_currency, "EUR");
        assert_eq!(defaults.base_currency, "BTC");
        assert_eq!(
            defaults.webhook_url.as_deref(),
            Some("https://merchant.test/hooks/ramp")
        );
    }

    #[test]
    fn test_empty_file_uses_builtin_defaults() {
        let defaults = parse_session_defaults("").unwrap();
        assert_eq!(defaults.quote_currency, "USD");
        assert!(defaults.webhook_url.is_none());
    }

    #[test]
    fn test_socket_addr() {
        let config = AppConfig {
            host: "0.0.0.0".to_string(),
            port: 3000,
            api_key: "sk_secret_123".to_string(),
            environment: Environment::X1,
        };

        assert_eq!(config.socket_addr().unwrap().to_string(), "0.0.0.0:3000");
        assert!(!format!("{:?}", config).contains("sk_secret_123"));
    }
}
