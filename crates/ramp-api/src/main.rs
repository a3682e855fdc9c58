//! # Ramp Broker
//!
//! Mints ramp sessions for browser callers.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables
//! export RAMP_API_KEY=...
//! export RAMP_ENVIRONMENT=x1   # optional, defaults to production
//!
//! # Run the server
//! ramp-broker
//! ```

use ramp_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    let state = AppState::new()?;
    let addr = state.config.socket_addr()?;

    info!("Ramp environment: {}", state.config.environment);
    info!(
        "Session defaults: quote={}, base={}",
        state.defaults.quote_currency, state.defaults.base_currency
    );

    let app = routes::create_router(state);

    info!("Ramp broker starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
