//! # Widget Options
//!
//! Construction-time options for an embedded widget and the iframe
//! description derived from them.

use crate::callbacks::RampCallbacks;
use crate::environment::Environment;
use crate::error::{RampError, RampResult};
use std::fmt;
use url::Url;

pub const MIN_FRAME_HEIGHT: &str = "600px";
pub const FRAME_BORDER: &str = "none";
pub const FRAME_BORDER_RADIUS: &str = "8px";

/// Width or height of the iframe
#[derive(Debug, Clone, PartialEq)]
pub enum Dimension {
    /// Rendered as `<n>px`
    Pixels(f64),
    /// Any CSS length, used verbatim
    Css(String),
}

impl Dimension {
    pub fn to_css(&self) -> String {
        match self {
            Dimension::Pixels(px) => format!("{}px", px),
            Dimension::Css(value) => value.clone(),
        }
    }
}

impl Default for Dimension {
    fn default() -> Self {
        Dimension::Css("100%".to_string())
    }
}

impl From<u32> for Dimension {
    fn from(px: u32) -> Self {
        Dimension::Pixels(px as f64)
    }
}

impl From<f64> for Dimension {
    fn from(px: f64) -> Self {
        Dimension::Pixels(px)
    }
}

impl From<&str> for Dimension {
    fn from(css: &str) -> Self {
        Dimension::Css(css.to_string())
    }
}

impl From<String> for Dimension {
    fn from(css: String) -> Self {
        Dimension::Css(css)
    }
}

/// Where the iframe is mounted: a host element or a selector to look up
#[derive(Clone, PartialEq)]
pub enum ContainerRef<E> {
    Element(E),
    Selector(String),
}

impl<E> fmt::Debug for ContainerRef<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerRef::Element(_) => f.write_str("Element(..)"),
            ContainerRef::Selector(s) => write!(f, "Selector({:?})", s),
        }
    }
}

/// Options for one embedded widget
#[derive(Debug)]
pub struct WidgetOptions<E> {
    pub session_token: String,
    pub environment: Environment,
    /// Display secret forwarded to the widget as a query parameter
    pub secret: Option<String>,
    pub container: Option<ContainerRef<E>>,
    pub width: Option<Dimension>,
    pub height: Option<Dimension>,
    /// Grant camera access for identity-capture steps
    pub allow_camera: bool,
    pub callbacks: RampCallbacks,
}

impl<E> WidgetOptions<E> {
    pub fn new(session_token: impl Into<String>) -> Self {
        Self {
            session_token: session_token.into(),
            environment: Environment::default(),
            secret: None,
            container: None,
            width: None,
            height: None,
            allow_camera: false,
            callbacks: RampCallbacks::default(),
        }
    }

    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    pub fn with_secret(mut self, secret: impl Into<String>) -> Self {
        self.secret = Some(secret.into());
        self
    }

    pub fn with_container(mut self, container: ContainerRef<E>) -> Self {
        self.container = Some(container);
        self
    }

    pub fn with_selector(self, selector: impl Into<String>) -> Self {
        self.with_container(ContainerRef::Selector(selector.into()))
    }

    pub fn with_size(mut self, width: impl Into<Dimension>, height: impl Into<Dimension>) -> Self {
        self.width = Some(width.into());
        self.height = Some(height.into());
        self
    }

    pub fn with_camera(mut self) -> Self {
        self.allow_camera = true;
        self
    }

    pub fn with_callbacks(mut self, callbacks: RampCallbacks) -> Self {
        self.callbacks = callbacks;
        self
    }

    pub(crate) fn validate(&self) -> RampResult<()> {
        if self.session_token.trim().is_empty() {
            return Err(RampError::Validation("sessionToken is required".to_string()));
        }
        Ok(())
    }

    /// Widget URL carrying the session token and, when set, the secret.
    pub fn widget_url(&self) -> RampResult<String> {
        build_widget_url(
            self.environment,
            &self.session_token,
            self.secret.as_deref(),
        )
    }

    pub fn frame_spec(&self) -> RampResult<FrameSpec> {
        Ok(FrameSpec {
            src: self.widget_url()?,
            width: self.width.clone().unwrap_or_default().to_css(),
            height: self.height.clone().unwrap_or_default().to_css(),
            allow: allow_attribute(self.allow_camera).to_string(),
        })
    }
}

/// Append the session token (and optional secret) to the widget base URL.
pub fn build_widget_url(
    environment: Environment,
    session_token: &str,
    secret: Option<&str>,
) -> RampResult<String> {
    let mut url = Url::parse(&environment.widget_base_url())
        .map_err(|e| RampError::Validation(format!("invalid widget URL: {}", e)))?;
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("session_token", session_token);
        if let Some(secret) = secret.filter(|s| !s.is_empty()) {
            query.append_pair("secret", secret);
        }
    }
    Ok(url.to_string())
}

fn allow_attribute(allow_camera: bool) -> &'static str {
    if allow_camera {
        "payment; camera"
    } else {
        "payment"
    }
}

/// Everything a host needs to create the widget iframe
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSpec {
    pub src: String,
    pub width: String,
    pub height: String,
    pub allow: String,
}

impl FrameSpec {
    /// Inline style declarations, in application order
    pub fn style(&self) -> [(&'static str, &str); 5] {
        [
            ("width", self.width.as_str()),
            ("height", self.height.as_str()),
            ("min-height", MIN_FRAME_HEIGHT),
            ("border", FRAME_BORDER),
            ("border-radius", FRAME_BORDER_RADIUS),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension_css() {
        assert_eq!(Dimension::from(400u32).to_css(), "400px");
        assert_eq!(Dimension::from(320.5).to_css(), "320.5px");
        assert_eq!(Dimension::from("80vh").to_css(), "80vh");
        assert_eq!(Dimension::default().to_css(), "100%");
    }

    #[test]
    fn test_widget_url_query() {
        let url = build_widget_url(Environment::X1, "st_abc", None).unwrap();
        assert_eq!(url, "https://ramp.x1.example.com/?session_token=st_abc");

        let url = build_widget_url(Environment::Production, "st abc", Some("s3cret")).unwrap();
        assert_eq!(
            url,
            "https://ramp.example.com/?session_token=st+abc&secret=s3cret"
        );
    }

    #[test]
    fn test_frame_spec_defaults() {
        let options: WidgetOptions<()> = WidgetOptions::new("st_abc");
        let spec = options.frame_spec().unwrap();

        assert_eq!(spec.width, "100%");
        assert_eq!(spec.height, "100%");
        assert_eq!(spec.allow, "payment");
        assert_eq!(spec.style()[2], ("min-height", "600px"));
    }

    #[test]
    fn test_frame_spec_sized_with_camera() {
        let options: WidgetOptions<()> = WidgetOptions::new("st_abc")
            .with_size(420u32, "90vh")
            .with_camera();
        let spec = options.frame_spec().unwrap();

        assert_eq!(spec.width, "420px");
        assert_eq!(spec.height, "90vh");
        assert_eq!(spec.allow, "payment; camera");
    }

    #[test]
    fn test_blank_token_rejected() {
        let options: WidgetOptions<()> = WidgetOptions::new("  ");
        assert!(matches!(options.validate(), Err(RampError::Validation(_))));
    }
}
