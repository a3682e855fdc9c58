//! # Inbound Message Relay
//!
//! Validates and decodes postMessage traffic from the widget iframe and
//! forwards decoded events to the registered callbacks.
//!
//! ```text
//! origin check ──► noise filter ──► JSON parse ──► tag dispatch ──► callback
//!   (drop)           (drop)          (warn)         (debug)
//! ```
//!
//! Nothing in this pipeline surfaces an error to the caller.

use crate::callbacks::RampCallbacks;
use crate::event::WidgetEvent;
use serde_json::Value;
use tracing::{debug, trace, warn};
use url::Url;

/// Marker emitted by the iframe-resizer helper running inside the widget
pub const IFRAME_RESIZER_MARKER: &str = "[iFrameResizerChild]";

/// Raw message data as delivered by the host
#[derive(Debug, Clone, PartialEq)]
pub enum MessagePayload {
    Text(String),
    Structured(Value),
}

/// Outcome of decoding one message
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Event(WidgetEvent),
    /// Traffic from embedded tooling, not protocol messages
    Noise,
    /// Looked like JSON but could not be decoded
    Malformed(String),
    UnknownType(String),
}

/// True when `origin` is an https origin whose host is exactly `widget_host`.
pub fn origin_matches(origin: &str, widget_host: &str) -> bool {
    match Url::parse(origin) {
        Ok(url) => url.scheme() == "https" && url.host_str() == Some(widget_host),
        Err(_) => false,
    }
}

/// String payloads that are not JSON objects or carry the resizer marker.
pub fn is_protocol_noise(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.starts_with('{') || trimmed.contains(IFRAME_RESIZER_MARKER)
}

/// Decode a payload that already passed the origin check.
pub fn decode(payload: &MessagePayload) -> InboundMessage {
    let parsed;
    let value = match payload {
        MessagePayload::Structured(value) => value,
        MessagePayload::Text(text) => {
            if is_protocol_noise(text) {
                return InboundMessage::Noise;
            }
            parsed = match serde_json::from_str::<Value>(text.trim()) {
                Ok(value) => value,
                Err(e) => return InboundMessage::Malformed(e.to_string()),
            };
            &parsed
        }
    };

    // Untagged traffic takes the unknown-type path.
    let tag = match value.get("type") {
        Some(Value::String(tag)) => tag,
        Some(other) => return InboundMessage::UnknownType(other.to_string()),
        None => return InboundMessage::UnknownType(String::new()),
    };

    match WidgetEvent::from_tagged(tag, value.get("payload")) {
        Some(event) => InboundMessage::Event(event),
        None => InboundMessage::UnknownType(tag.to_string()),
    }
}

/// Listener-side state: the trusted host plus the callbacks to feed.
#[derive(Debug)]
pub struct MessageRelay {
    widget_host: String,
    callbacks: RampCallbacks,
}

impl MessageRelay {
    pub fn new(widget_host: impl Into<String>, callbacks: RampCallbacks) -> Self {
        Self {
            widget_host: widget_host.into(),
            callbacks,
        }
    }

    pub fn widget_host(&self) -> &str {
        &self.widget_host
    }

    /// Trust check hosts can run before converting the raw payload.
    pub fn accepts_origin(&self, origin: &str) -> bool {
        origin_matches(origin, &self.widget_host)
    }

    /// Handle one message event. Returns whether a callback ran.
    pub fn relay(&self, origin: &str, payload: &MessagePayload) -> bool {
        if !self.accepts_origin(origin) {
            trace!(origin, "Ignoring message from untrusted origin");
            return false;
        }

        match decode(payload) {
            InboundMessage::Event(event) => {
                debug!(event = event.tag(), "Widget event");
                self.callbacks.dispatch(event)
            }
            InboundMessage::Noise => false,
            InboundMessage::Malformed(reason) => {
                warn!(reason = %reason, raw = ?payload, "Failed to parse message from widget");
                false
            }
            InboundMessage::UnknownType(tag) => {
                debug!(tag = %tag, "Unknown message type from widget");
                false
            }
        }
    }
}
