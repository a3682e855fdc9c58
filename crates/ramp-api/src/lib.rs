//! # ramp-api
//!
//! Session broker for ramp-kit.
//!
//! Browser pages embedding the widget need a session token, and minting one
//! needs the ramp API key. This service keeps the key server-side:
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | POST | `/api/v1/ramp-session` | Open a ramp session |
//! | POST | `/api/v1/access-tokens/refresh` | Refresh an access token |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState, SessionDefaults};
