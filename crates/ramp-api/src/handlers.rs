//! # Request Handlers
//!
//! Axum request handlers for the session broker.
//! Browser callers never see the API key; it is attached here.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use ramp_core::{RampError, RefreshTokenRequest, RefreshedTokenPair, SessionConfig, SessionToken};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{error, info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Open session request
#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    /// Payout destination (e.g., a lightning address)
    pub destination: String,
    /// End-user email (exclusive with `access_token`)
    #[serde(default)]
    pub email: Option<String>,
    /// Pre-existing access token (exclusive with `email`)
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub quote_currency: Option<String>,
    #[serde(default)]
    pub base_currency: Option<String>,
    #[serde(default)]
    pub webhook_url: Option<String>,
    #[serde(default)]
    pub reference_id: Option<String>,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

/// Refresh request
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub access_token_id: String,
    pub refresh_token: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
        }
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn ramp_error_to_response(err: RampError) -> ApiError {
    let code = err.status_code();
    let response = ErrorResponse::new(err.to_string(), code);
    (
        StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        Json(response),
    )
}

impl CreateSessionRequest {
    fn into_config(self, state: &AppState) -> Result<SessionConfig, RampError> {
        let mut builder = SessionConfig::builder()
            .api_key(state.config.api_key.clone())
            .environment(state.config.environment)
            .destination(self.destination)
            .quote_currency(
                self.quote_currency
                    .unwrap_or_else(|| state.defaults.quote_currency.clone()),
            )
            .base_currency(
                self.base_currency
                    .unwrap_or_else(|| state.defaults.base_currency.clone()),
            );

        if let Some(email) = self.email {
            builder = builder.email(email);
        }
        if let Some(token) = self.access_token {
            builder = builder.access_token(token);
        }
        if let Some(url) = self.webhook_url.or_else(|| state.defaults.webhook_url.clone()) {
            builder = builder.webhook_url(url);
        }
        if let Some(id) = self.reference_id {
            builder = builder.reference_id(id);
        }
        if let Some(metadata) = self.metadata {
            builder = builder.metadata(metadata);
        }

        builder.build()
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "ramp-broker",
        "environment": state.config.environment,
        "issuer": state.issuer.issuer_name(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Open a ramp session for a browser caller
#[instrument(skip(state, request), fields(reference_id = ?request.reference_id))]
pub async fn create_session(
    State(state): State<AppState>,
    Json(request): Json<CreateSessionRequest>,
) -> Result<Json<SessionToken>, ApiError> {
    let config = request
        .into_config(&state)
        .map_err(ramp_error_to_response)?;

    let token = state.issuer.init_session(&config).await.map_err(|e| {
        error!("Failed to open ramp session: {}", e);
        ramp_error_to_response(e)
    })?;

    info!("Issued ramp session: expires_at={}", token.expires_at);
    Ok(Json(token))
}

/// Refresh an end-user access token
#[instrument(skip(state, request))]
pub async fn refresh_access_token(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshedTokenPair>, ApiError> {
    let request = RefreshTokenRequest::new(
        state.config.api_key.clone(),
        request.access_token_id,
        request.refresh_token,
        state.config.environment,
    )
    .map_err(ramp_error_to_response)?;

    let pair = state.issuer.refresh_token(&request).await.map_err(|e| {
        error!("Failed to refresh access token: {}", e);
        ramp_error_to_response(e)
    })?;

    Ok(Json(pair))
}
