//! # Widget Events
//!
//! Closed set of events the hosted widget reports through postMessage.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub const WIDGET_SUCCESS: &str = "WIDGET_SUCCESS";
pub const WIDGET_ERROR: &str = "WIDGET_ERROR";
pub const WIDGET_STEP_CHANGE: &str = "WIDGET_STEP_CHANGE";
pub const WIDGET_LOG: &str = "WIDGET_LOG";
pub const WIDGET_READY: &str = "WIDGET_READY";
pub const WIDGET_CLOSE: &str = "WIDGET_CLOSE";

pub const UNKNOWN_ERROR_CODE: &str = "UNKNOWN_ERROR";
pub const DEFAULT_ERROR_MESSAGE: &str = "An error occurred";

/// Error reported by the widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetError {
    pub code: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Severity of a widget log line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Unrecognized levels fall back to `Info`.
    pub fn parse_lossy(level: &str) -> Self {
        match level {
            "debug" => LogLevel::Debug,
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Log line forwarded from the widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WidgetLog {
    pub level: LogLevel,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// Decoded widget message
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetEvent {
    /// Ramp completed; payload passed through untouched (`Null` when absent)
    Success(Value),
    Error(WidgetError),
    StepChange(Option<String>),
    Log(WidgetLog),
    Ready,
    Close,
}

impl WidgetEvent {
    /// Map a message tag and its optional payload to an event.
    ///
    /// Returns `None` for tags outside the known set.
    pub fn from_tagged(tag: &str, payload: Option<&Value>) -> Option<Self> {
        let event = match tag {
            WIDGET_SUCCESS => WidgetEvent::Success(payload.cloned().unwrap_or(Value::Null)),
            WIDGET_ERROR => WidgetEvent::Error(WidgetError {
                code: text_field(payload, "code")
                    .unwrap_or_else(|| UNKNOWN_ERROR_CODE.to_string()),
                message: text_field(payload, "message")
                    .unwrap_or_else(|| DEFAULT_ERROR_MESSAGE.to_string()),
                details: value_field(payload, "details"),
            }),
            WIDGET_STEP_CHANGE => WidgetEvent::StepChange(
                payload
                    .and_then(|p| p.get("step"))
                    .and_then(Value::as_str)
                    .map(String::from),
            ),
            WIDGET_LOG => WidgetEvent::Log(WidgetLog {
                level: text_field(payload, "level")
                    .map(|l| LogLevel::parse_lossy(&l))
                    .unwrap_or_default(),
                message: text_field(payload, "message").unwrap_or_default(),
                data: value_field(payload, "data"),
            }),
            WIDGET_READY => WidgetEvent::Ready,
            WIDGET_CLOSE => WidgetEvent::Close,
            _ => return None,
        };
        Some(event)
    }

    /// Wire tag of this event
    pub fn tag(&self) -> &'static str {
        match self {
            WidgetEvent::Success(_) => WIDGET_SUCCESS,
            WidgetEvent::Error(_) => WIDGET_ERROR,
            WidgetEvent::StepChange(_) => WIDGET_STEP_CHANGE,
            WidgetEvent::Log(_) => WIDGET_LOG,
            WidgetEvent::Ready => WIDGET_READY,
            WidgetEvent::Close => WIDGET_CLOSE,
        }
    }
}

// Falsy values (null, false, 0, "") count as missing. Other scalars are
// rendered as text so a numeric code survives.
fn text_field(payload: Option<&Value>, key: &str) -> Option<String> {
    match payload.and_then(|p| p.get(key))? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

fn value_field(payload: Option<&Value>, key: &str) -> Option<Value> {
    payload
        .and_then(|p| p.get(key))
        .filter(|v| !v.is_null())
        .cloned()
}
