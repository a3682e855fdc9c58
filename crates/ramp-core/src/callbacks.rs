//! # Widget Callbacks
//!
//! Optional handlers invoked for decoded widget events. Handlers run
//! synchronously in the message-delivery context; a panicking handler is not
//! caught here.

use crate::event::{WidgetError, WidgetEvent, WidgetLog};
use serde_json::Value;
use std::fmt;

type Handler<T> = Option<Box<dyn Fn(T)>>;

/// Set of optional event handlers
#[derive(Default)]
pub struct RampCallbacks {
    on_success: Handler<Value>,
    on_error: Handler<WidgetError>,
    on_step_change: Handler<Option<String>>,
    on_log: Handler<WidgetLog>,
    on_ready: Option<Box<dyn Fn()>>,
    on_close: Option<Box<dyn Fn()>>,
}

impl RampCallbacks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, f: impl Fn(Value) + 'static) -> Self {
        self.on_success = Some(Box::new(f));
        self
    }

    pub fn on_error(mut self, f: impl Fn(WidgetError) + 'static) -> Self {
        self.on_error = Some(Box::new(f));
        self
    }

    pub fn on_step_change(mut self, f: impl Fn(Option<String>) + 'static) -> Self {
        self.on_step_change = Some(Box::new(f));
        self
    }

    pub fn on_log(mut self, f: impl Fn(WidgetLog) + 'static) -> Self {
        self.on_log = Some(Box::new(f));
        self
    }

    pub fn on_ready(mut self, f: impl Fn() + 'static) -> Self {
        self.on_ready = Some(Box::new(f));
        self
    }

    pub fn on_close(mut self, f: impl Fn() + 'static) -> Self {
        self.on_close = Some(Box::new(f));
        self
    }

    /// Invoke the handler registered for `event`, if any.
    ///
    /// Returns whether a handler ran.
    pub fn dispatch(&self, event: WidgetEvent) -> bool {
        match event {
            WidgetEvent::Success(payload) => call(&self.on_success, payload),
            WidgetEvent::Error(error) => call(&self.on_error, error),
            WidgetEvent::StepChange(step) => call(&self.on_step_change, step),
            WidgetEvent::Log(log) => call(&self.on_log, log),
            WidgetEvent::Ready => call_unit(&self.on_ready),
            WidgetEvent::Close => call_unit(&self.on_close),
        }
    }
}

fn call<T>(handler: &Handler<T>, arg: T) -> bool {
    match handler {
        Some(f) => {
            f(arg);
            true
        }
        None => false,
    }
}

fn call_unit(handler: &Option<Box<dyn Fn()>>) -> bool {
    match handler {
        Some(f) => {
            f();
            true
        }
        None => false,
    }
}

impl fmt::Debug for RampCallbacks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RampCallbacks")
            .field("on_success", &self.on_success.is_some())
            .field("on_error", &self.on_error.is_some())
            .field("on_step_change", &self.on_step_change.is_some())
            .field("on_log", &self.on_log.is_some())
            .field("on_ready", &self.on_ready.is_some())
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_dispatch_routes_to_matching_handler() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let steps = seen.clone();
        let readies = seen.clone();

        let callbacks = RampCallbacks::new()
            .on_step_change(move |step| steps.borrow_mut().push(format!("step:{:?}", step)))
            .on_ready(move || readies.borrow_mut().push("ready".to_string()));

        assert!(callbacks.dispatch(WidgetEvent::StepChange(Some("kyc".into()))));
        assert!(callbacks.dispatch(WidgetEvent::Ready));
        assert!(!callbacks.dispatch(WidgetEvent::Close));

        assert_eq!(
            *seen.borrow(),
            vec!["step:Some(\"kyc\")".to_string(), "ready".to_string()]
        );
    }

    #[test]
    fn test_missing_handlers_are_silent() {
        let callbacks = RampCallbacks::default();
        assert!(!callbacks.dispatch(WidgetEvent::Success(Value::Null)));
        assert!(format!("{:?}", callbacks).contains("on_ready: false"));
    }
}
