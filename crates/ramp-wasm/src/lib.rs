//! # ramp-wasm
//!
//! WebAssembly bindings for embedding the hosted ramp widget.
//!
//! This crate provides:
//! - `RampWidget`, a JS class with `mount`, `unmount` and `destroy`
//! - `DomHost`, the browser implementation of `WidgetHost`
//! - Console logging for the widget's diagnostics
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { RampWidget } from 'ramp-wasm';
//!
//! await init();
//!
//! // sessionToken comes from your backend (see ramp-api)
//! const ramp = new RampWidget({
//!   sessionToken,
//!   environment: 'x1',
//!   container: '#ramp-container',
//!   width: 420,
//!   height: '90vh',
//!   onReady: () => console.log('ready'),
//!   onStepChange: (step) => console.log('step', step),
//!   onSuccess: (data) => console.log('done', data),
//!   onError: (err) => console.error(err.code, err.message),
//! });
//!
//! ramp.mount();
//! // later
//! ramp.destroy();
//! ```
//!
//! Exceptions thrown by callbacks are rethrown into the page's message
//! handler and surface as uncaught errors.
//!
//! ## Building
//!
//! ```bash
//! wasm-pack build crates/ramp-wasm --target web
//! ```

pub mod console;
pub mod dom;
mod options;

pub use dom::{DomHost, MessageListener};

use ramp_core::{build_widget_url, Environment, RampResult, WidgetController};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};
use wasm_bindgen::prelude::*;

/// Initialize the WASM module (called automatically)
#[wasm_bindgen(start)]
pub fn init() {
    let layer = fmt::layer()
        .without_time()
        .with_ansi(false)
        .with_target(false)
        .with_writer(console::MakeConsoleWriter);

    // A host page may load the module twice; keep the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(layer)
        .with(LevelFilter::INFO)
        .try_init();
}

/// Embedded ramp widget
#[wasm_bindgen]
pub struct RampWidget {
    inner: WidgetController<DomHost>,
}

#[wasm_bindgen]
impl RampWidget {
    /// Create a widget from a JS options object. Throws when
    /// `sessionToken` is missing.
    #[wasm_bindgen(constructor)]
    pub fn new(options: JsValue) -> Result<RampWidget, JsError> {
        Ok(Self::build(&options)?)
    }

    /// Attach the iframe. `container` (element or selector) overrides the
    /// one given at construction.
    pub fn mount(&mut self, container: JsValue) -> Result<(), JsError> {
        let container = options::container_from_js(container)?;
        self.inner.mount(container)?;
        Ok(())
    }

    /// Detach the iframe and stop listening. Safe to call repeatedly.
    pub fn unmount(&mut self) {
        self.inner.unmount();
    }

    /// Unmount and release everything; later `mount` calls throw.
    pub fn destroy(&mut self) {
        self.inner.destroy();
    }

    #[wasm_bindgen(getter, js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.inner.is_mounted()
    }
}

impl RampWidget {
    fn build(options: &JsValue) -> RampResult<RampWidget> {
        let options = options::options_from_js(options)?;
        let inner = WidgetController::new(DomHost::new()?, options)?;
        Ok(RampWidget { inner })
    }
}

/// Factory mirroring `new RampWidget(options)`
#[wasm_bindgen(js_name = createRamp)]
pub fn create_ramp(options: JsValue) -> Result<RampWidget, JsError> {
    RampWidget::new(options)
}

/// Widget URL for an environment, session token and optional secret
#[wasm_bindgen(js_name = widgetUrl)]
pub fn widget_url(
    environment: &str,
    session_token: &str,
    secret: Option<String>,
) -> Result<String, JsError> {
    let environment: Environment = environment.parse()?;
    Ok(build_widget_url(environment, session_token, secret.as_deref())?)
}

/// Get library version
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
