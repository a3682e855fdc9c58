//! # Ramp Error Types
//!
//! Typed error handling for ramp-kit.
//! Session calls and widget lifecycle operations return `Result<T, RampError>`.
//! Malformed widget traffic never becomes a `RampError`; it is logged and dropped.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Body of a failed HTTP response, kept as JSON when it parses.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
    Empty,
}

impl ResponseBody {
    /// Interpret raw response text, preferring JSON.
    pub fn from_text(text: String) -> Self {
        if text.trim().is_empty() {
            return ResponseBody::Empty;
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(json) => ResponseBody::Json(json),
            Err(_) => ResponseBody::Text(text),
        }
    }
}

impl fmt::Display for ResponseBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResponseBody::Json(json) => write!(f, "{}", json),
            ResponseBody::Text(text) => f.write_str(text),
            ResponseBody::Empty => f.write_str("<empty body>"),
        }
    }
}

/// Core error type for all ramp operations
#[derive(Debug, Error)]
pub enum RampError {
    /// Missing or malformed construction/mount arguments
    #[error("Validation error: {0}")]
    Validation(String),

    /// No container was given at construction or mount time
    #[error("Container is required for mounting")]
    ContainerMissing,

    /// Selector did not match any element
    #[error("Container element not found: {selector}")]
    ContainerNotFound { selector: String },

    /// `mount` called while an iframe is already attached
    #[error("Widget is already mounted; call unmount() first")]
    AlreadyMounted,

    /// Instance was destroyed and can no longer be used
    #[error("Widget has been destroyed")]
    Destroyed,

    /// Host platform (DOM) refused an operation
    #[error("Host error: {0}")]
    Host(String),

    /// Remote API answered with a non-success status
    #[error("Failed to {operation}: {status} {status_text} - {body}")]
    RequestFailed {
        operation: &'static str,
        status: u16,
        status_text: String,
        body: ResponseBody,
    },

    /// Network-level failure talking to the remote API
    #[error("Failed to {operation}: {message}")]
    TransportFailed {
        operation: &'static str,
        message: String,
    },

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl RampError {
    /// Returns the HTTP status code appropriate for this error
    pub fn status_code(&self) -> u16 {
        match self {
            RampError::Validation(_)
            | RampError::ContainerMissing
            | RampError::ContainerNotFound { .. } => 400,
            RampError::AlreadyMounted | RampError::Destroyed => 409,
            RampError::RequestFailed { status, .. } if (400..500).contains(status) => *status,
            RampError::RequestFailed { .. } => 502,
            RampError::TransportFailed { .. } => 503,
            RampError::Host(_) | RampError::Serialization(_) => 500,
        }
    }

    /// True for caller mistakes that are reported synchronously
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RampError::Validation(_)
                | RampError::ContainerMissing
                | RampError::ContainerNotFound { .. }
                | RampError::AlreadyMounted
                | RampError::Destroyed
        )
    }
}

/// Result type alias for ramp operations
pub type RampResult<T> = Result<T, RampError>;
