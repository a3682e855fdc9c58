//! # JS Options
//!
//! Reads the plain JS options object passed to `new RampWidget(...)` into
//! `WidgetOptions`. Values are copied, so later mutation of the caller's
//! object has no effect.

use js_sys::{Function, Reflect};
use ramp_core::{
    ContainerRef, Dimension, Environment, RampCallbacks, RampError, RampResult, WidgetOptions,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

fn get(object: &JsValue, key: &str) -> Option<JsValue> {
    Reflect::get(object, &JsValue::from_str(key))
        .ok()
        .filter(|v| !v.is_undefined() && !v.is_null())
}

fn get_string(object: &JsValue, key: &str) -> Option<String> {
    get(object, key).and_then(|v| v.as_string())
}

fn get_function(object: &JsValue, key: &str) -> RampResult<Option<Function>> {
    match get(object, key) {
        None => Ok(None),
        Some(value) => value
            .dyn_into::<Function>()
            .map(Some)
            .map_err(|_| RampError::Validation(format!("{} must be a function", key))),
    }
}

/// `HTMLElement` or selector string
pub(crate) fn container_from_js(value: JsValue) -> RampResult<Option<ContainerRef<HtmlElement>>> {
    if value.is_undefined() || value.is_null() {
        return Ok(None);
    }
    if let Some(selector) = value.as_string() {
        if selector.is_empty() {
            return Ok(None);
        }
        return Ok(Some(ContainerRef::Selector(selector)));
    }
    value
        .dyn_into::<HtmlElement>()
        .map(|element| Some(ContainerRef::Element(element)))
        .map_err(|_| {
            RampError::Validation("container must be an HTMLElement or a selector".to_string())
        })
}

/// Numbers are pixels, strings are CSS lengths
fn dimension_from_js(object: &JsValue, key: &str) -> RampResult<Option<Dimension>> {
    match get(object, key) {
        None => Ok(None),
        Some(value) => {
            if let Some(px) = value.as_f64() {
                Ok(Some(Dimension::Pixels(px)))
            } else if let Some(css) = value.as_string() {
                Ok(Some(Dimension::Css(css)))
            } else {
                Err(RampError::Validation(format!(
                    "{} must be a number or a string",
                    key
                )))
            }
        }
    }
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    let serializer = serde_wasm_bindgen::Serializer::json_compatible();
    value.serialize(&serializer).unwrap_or(JsValue::UNDEFINED)
}

/// Invoke a JS callback; a thrown exception propagates to the page.
fn invoke(f: &Function, args: &[JsValue]) {
    let result = match args {
        [] => f.call0(&JsValue::NULL),
        [a] => f.call1(&JsValue::NULL, a),
        _ => f.apply(&JsValue::NULL, &args.iter().collect::<js_sys::Array>()),
    };
    if let Err(exception) = result {
        wasm_bindgen::throw_val(exception);
    }
}

fn callbacks_from_js(object: &JsValue) -> RampResult<RampCallbacks> {
    let mut callbacks = RampCallbacks::new();

    if let Some(f) = get_function(object, "onSuccess")? {
        callbacks = callbacks.on_success(move |payload| invoke(&f, &[to_js(&payload)]));
    }
    if let Some(f) = get_function(object, "onError")? {
        callbacks = callbacks.on_error(move |error| invoke(&f, &[to_js(&error)]));
    }
    if let Some(f) = get_function(object, "onStepChange")? {
        callbacks = callbacks.on_step_change(move |step| {
            let step = step.map(|s| JsValue::from_str(&s)).unwrap_or(JsValue::UNDEFINED);
            invoke(&f, &[step])
        });
    }
    if let Some(f) = get_function(object, "onLog")? {
        callbacks = callbacks.on_log(move |log| invoke(&f, &[to_js(&log)]));
    }
    if let Some(f) = get_function(object, "onReady")? {
        callbacks = callbacks.on_ready(move || invoke(&f, &[]));
    }
    if let Some(f) = get_function(object, "onClose")? {
        callbacks = callbacks.on_close(move || invoke(&f, &[]));
    }

    Ok(callbacks)
}

/// Read a JS options object.
pub(crate) fn options_from_js(object: &JsValue) -> RampResult<WidgetOptions<HtmlElement>> {
    if !object.is_object() {
        return Err(RampError::Validation("options object is required".to_string()));
    }

    let session_token = get_string(object, "sessionToken")
        .ok_or_else(|| RampError::Validation("sessionToken is required".to_string()))?;

    let mut options = WidgetOptions::new(session_token);

    if let Some(environment) = get_string(object, "environment") {
        options = options.with_environment(environment.parse::<Environment>()?);
    }
    if let Some(secret) = get_string(object, "secret") {
        options = options.with_secret(secret);
    }
    let container = get(object, "container").unwrap_or(JsValue::UNDEFINED);
    if let Some(container) = container_from_js(container)? {
        options = options.with_container(container);
    }
    options.width = dimension_from_js(object, "width")?;
    options.height = dimension_from_js(object, "height")?;
    options.allow_camera = get(object, "allowCamera")
        .and_then(|v| v.as_bool())
        .unwrap_or(false);

    Ok(options.with_callbacks(callbacks_from_js(object)?))
}
