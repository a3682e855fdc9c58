//! # ramp-session
//!
//! HTTP session client for ramp-kit.
//!
//! `RampSessionClient` implements `SessionIssuer` against the remote ramp API:
//!
//! 1. **init_session** - `POST /api/v1/ramp-widget`
//!    - Opens a ramp session for one end user (email or access token)
//!    - Returns the session token and a ready-to-embed widget URL
//!
//! 2. **refresh_token** - `POST /api/v1/access-tokens/refresh`
//!    - Exchanges a refresh token for a new access/refresh pair
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ramp_session::RampSessionClient;
//! use ramp_core::{SessionConfig, SessionIssuer, Environment};
//!
//! let client = RampSessionClient::from_env()?;
//!
//! let config = SessionConfig::builder()
//!     .api_key(api_key)
//!     .destination("satoshi@example.com")
//!     .quote_currency("USD")
//!     .base_currency("BTC")
//!     .email("user@example.com")
//!     .environment(Environment::X1)
//!     .build()?;
//!
//! let token = client.init_session(&config).await?;
//! // Hand token.session_token to the browser widget
//! ```
//!
//! Keep the API key on a server: see `ramp-api` for a ready-made broker.

pub mod client;
pub mod config;

// Re-exports
pub use client::{RampSessionClient, INIT_SESSION_PATH, REFRESH_TOKEN_PATH};
pub use config::ClientConfig;
