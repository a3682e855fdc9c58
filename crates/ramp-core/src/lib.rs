//! # ramp-core
//!
//! Core types and the widget lifecycle for ramp-kit.
//!
//! This crate provides:
//! - `Environment` for resolving API and widget hosts
//! - `SessionConfig`, `SessionToken` and `RefreshedTokenPair` for session calls
//! - `SessionIssuer` trait implemented by HTTP clients
//! - `WidgetController` and the `WidgetHost` platform trait
//! - `MessageRelay` for validating and decoding widget postMessage traffic
//! - `RampError` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use ramp_core::{RampCallbacks, WidgetController, WidgetOptions, Environment};
//!
//! // Obtain a session token from your backend first
//! let token = issuer.init_session(&config).await?;
//!
//! let callbacks = RampCallbacks::new()
//!     .on_ready(|| println!("widget ready"))
//!     .on_step_change(|step| println!("step: {:?}", step));
//!
//! let options = WidgetOptions::new(token.session_token)
//!     .with_environment(Environment::X1)
//!     .with_selector("#ramp")
//!     .with_callbacks(callbacks);
//!
//! let mut widget = WidgetController::new(host, options)?;
//! widget.mount(None)?;
//! ```

pub mod callbacks;
pub mod controller;
pub mod environment;
pub mod error;
pub mod event;
pub mod issuer;
pub mod message;
pub mod session;
pub mod widget;

// Re-exports for convenience
pub use callbacks::RampCallbacks;
pub use controller::{WidgetController, WidgetHost};
pub use environment::Environment;
pub use error::{RampError, RampResult, ResponseBody};
pub use event::{LogLevel, WidgetError, WidgetEvent, WidgetLog};
pub use issuer::{BoxedSessionIssuer, SessionIssuer};
pub use message::{InboundMessage, MessagePayload, MessageRelay};
pub use session::{
    ApiEnvelope, Identity, RefreshTokenRequest, RefreshedTokenPair, SessionConfig,
    SessionConfigBuilder, SessionToken,
};
pub use widget::{build_widget_url, ContainerRef, Dimension, FrameSpec, WidgetOptions};
