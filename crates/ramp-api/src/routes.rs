//! # Routes
//!
//! Axum router configuration for the session broker.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
///   - GET  /health - Health check
///   - POST /api/v1/ramp-session - Open a ramp session
///   - POST /api/v1/access-tokens/refresh - Refresh an access token
pub fn create_router(state: AppState) -> Router {
    // The widget page calls us cross-origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/ramp-session", post(handlers::create_session))
        .route("/access-tokens/refresh", post(handlers::refresh_access_token));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}
