//! # Session Issuer Trait
//!
//! Seam between callers that need session tokens and the component that
//! talks to the remote API. The reqwest-backed implementation lives in
//! `ramp-session`; services hold an `Arc<dyn SessionIssuer>` so tests can
//! substitute a stub.

use crate::error::RampResult;
use crate::session::{RefreshTokenRequest, RefreshedTokenPair, SessionConfig, SessionToken};
use async_trait::async_trait;
use std::sync::Arc;

/// Issues and refreshes ramp sessions.
///
/// Calls are independent: no retry, no timeout and no deduplication of
/// overlapping requests.
#[async_trait]
pub trait SessionIssuer: Send + Sync {
    /// Open a ramp session and return the token to embed.
    async fn init_session(&self, config: &SessionConfig) -> RampResult<SessionToken>;

    /// Exchange a refresh token for a new access/refresh pair.
    async fn refresh_token(&self, request: &RefreshTokenRequest)
        -> RampResult<RefreshedTokenPair>;

    /// Name used in logs.
    fn issuer_name(&self) -> &'static str;
}

/// Type alias for a shared issuer (dynamic dispatch)
pub type BoxedSessionIssuer = Arc<dyn SessionIssuer>;
