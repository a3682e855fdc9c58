//! # DOM Host
//!
//! `WidgetHost` backed by the browser window and document.

use ramp_core::{FrameSpec, MessagePayload, MessageRelay, RampError, RampResult, WidgetHost};
use std::rc::Rc;
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlIFrameElement, MessageEvent, Window};

/// Registered `message` listener. Dropping it frees the closure.
///
/// Reentrant: a callback may post another message while one is being handled.
pub struct MessageListener {
    closure: Closure<dyn Fn(MessageEvent)>,
}

/// Browser implementation of [`WidgetHost`]
pub struct DomHost {
    window: Window,
    document: Document,
}

impl DomHost {
    pub fn new() -> RampResult<Self> {
        let window = web_sys::window().ok_or_else(|| RampError::Host("no global window".into()))?;
        let document = window
            .document()
            .ok_or_else(|| RampError::Host("window has no document".into()))?;
        Ok(Self { window, document })
    }
}

/// Convert a thrown JS value into a host error.
pub(crate) fn host_error(context: &str, err: JsValue) -> RampError {
    let detail = err
        .dyn_ref::<js_sys::Error>()
        .map(|e| String::from(e.message()))
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{:?}", err));
    RampError::Host(format!("{}: {}", context, detail))
}

/// Map `event.data` onto the relay's payload type.
fn payload_from_js(data: JsValue) -> Option<MessagePayload> {
    if let Some(text) = data.as_string() {
        return Some(MessagePayload::Text(text));
    }
    match serde_wasm_bindgen::from_value::<serde_json::Value>(data) {
        Ok(value) => Some(MessagePayload::Structured(value)),
        Err(e) => {
            debug!("Dropping non-JSON message data: {}", e);
            None
        }
    }
}

impl WidgetHost for DomHost {
    type Element = HtmlElement;
    type Frame = HtmlIFrameElement;
    type Listener = MessageListener;

    fn query_selector(&self, selector: &str) -> RampResult<Option<HtmlElement>> {
        let element = self
            .document
            .query_selector(selector)
            .map_err(|e| host_error("querySelector", e))?;
        Ok(element.and_then(|e| e.dyn_into::<HtmlElement>().ok()))
    }

    fn create_frame(&self, spec: &FrameSpec) -> RampResult<HtmlIFrameElement> {
        let frame = self
            .document
            .create_element("iframe")
            .map_err(|e| host_error("createElement", e))?
            .dyn_into::<HtmlIFrameElement>()
            .map_err(|_| RampError::Host("created element is not an iframe".into()))?;

        frame.set_src(&spec.src);
        let style = frame.style();
        for (property, value) in spec.style() {
            style
                .set_property(property, value)
                .map_err(|e| host_error("style", e))?;
        }
        frame
            .set_attribute("allow", &spec.allow)
            .map_err(|e| host_error("setAttribute", e))?;
        frame
            .set_attribute("allowtransparency", "true")
            .map_err(|e| host_error("setAttribute", e))?;

        Ok(frame)
    }

    fn append_frame(&self, container: &HtmlElement, frame: &HtmlIFrameElement) -> RampResult<()> {
        container
            .append_child(frame)
            .map(|_| ())
            .map_err(|e| host_error("appendChild", e))
    }

    fn remove_frame(&self, frame: &HtmlIFrameElement) {
        // No-op when the page already detached it
        frame.remove();
    }

    fn add_message_listener(&self, relay: Rc<MessageRelay>) -> RampResult<MessageListener> {
        let closure = Closure::<dyn Fn(MessageEvent)>::new(move |event: MessageEvent| {
            let origin = event.origin();
            if !relay.accepts_origin(&origin) {
                return;
            }
            if let Some(payload) = payload_from_js(event.data()) {
                relay.relay(&origin, &payload);
            }
        });

        self.window
            .add_event_listener_with_callback("message", closure.as_ref().unchecked_ref())
            .map_err(|e| host_error("addEventListener", e))?;

        Ok(MessageListener { closure })
    }

    fn remove_message_listener(&self, listener: MessageListener) {
        let _ = self.window.remove_event_listener_with_callback(
            "message",
            listener.closure.as_ref().unchecked_ref(),
        );
    }
}
