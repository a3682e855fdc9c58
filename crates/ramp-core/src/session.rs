//! # Session Types
//!
//! Request and response shapes for opening a ramp session and refreshing
//! access tokens against the remote API.

use crate::environment::Environment;
use crate::error::{RampError, RampResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// End-user credential sent with a session request.
///
/// Exactly one is always present; serializes as a single `email` or
/// `access_token` key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Identity {
    Email(String),
    AccessToken(String),
}

/// Parameters for opening a ramp session
#[derive(Clone)]
pub struct SessionConfig {
    api_key: String,
    destination: String,
    quote_currency: String,
    base_currency: String,
    identity: Identity,
    webhook_url: Option<String>,
    reference_id: Option<String>,
    metadata: Option<Map<String, Value>>,
    environment: Environment,
}

impl fmt::Debug for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionConfig")
            .field("api_key", &"<redacted>")
            .field("destination", &self.destination)
            .field("quote_currency", &self.quote_currency)
            .field("base_currency", &self.base_currency)
            .field("identity", &self.identity)
            .field("webhook_url", &self.webhook_url)
            .field("reference_id", &self.reference_id)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

/// JSON body of `POST /api/v1/ramp-widget`
#[derive(Debug, Serialize)]
struct InitSessionBody<'a> {
    destination: &'a str,
    quote_currency: &'a str,
    base_currency: &'a str,
    #[serde(flatten)]
    identity: &'a Identity,
    #[serde(skip_serializing_if = "Option::is_none")]
    webhook_url: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a Map<String, Value>>,
}

impl SessionConfig {
    pub fn builder() -> SessionConfigBuilder {
        SessionConfigBuilder::default()
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn quote_currency(&self) -> &str {
        &self.quote_currency
    }

    pub fn base_currency(&self) -> &str {
        &self.base_currency
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    pub fn webhook_url(&self) -> Option<&str> {
        self.webhook_url.as_deref()
    }

    pub fn reference_id(&self) -> Option<&str> {
        self.reference_id.as_deref()
    }

    pub fn metadata(&self) -> Option<&Map<String, Value>> {
        self.metadata.as_ref()
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    /// Build the request body. Absent optional fields are omitted, never null.
    pub fn request_body(&self) -> RampResult<Value> {
        let body = InitSessionBody {
            destination: &self.destination,
            quote_currency: &self.quote_currency,
            base_currency: &self.base_currency,
            identity: &self.identity,
            webhook_url: self.webhook_url.as_deref(),
            reference_id: self.reference_id.as_deref(),
            metadata: self.metadata.as_ref(),
        };
        serde_json::to_value(&body).map_err(|e| RampError::Serialization(e.to_string()))
    }
}

/// Builder for [`SessionConfig`]
#[derive(Debug, Clone, Default)]
pub struct SessionConfigBuilder {
    api_key: Option<String>,
    destination: Option<String>,
    quote_currency: Option<String>,
    base_currency: Option<String>,
    email: Option<String>,
    access_token: Option<String>,
    webhook_url: Option<String>,
    reference_id: Option<String>,
    metadata: Option<Map<String, Value>>,
    environment: Environment,
}

impl SessionConfigBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn destination(mut self, destination: impl Into<String>) -> Self {
        self.destination = Some(destination.into());
        self
    }

    pub fn quote_currency(mut self, currency: impl Into<String>) -> Self {
        self.quote_currency = Some(currency.into());
        self
    }

    pub fn base_currency(mut self, currency: impl Into<String>) -> Self {
        self.base_currency = Some(currency.into());
        self
    }

    pub fn email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.webhook_url = Some(url.into());
        self
    }

    pub fn reference_id(mut self, id: impl Into<String>) -> Self {
        self.reference_id = Some(id.into());
        self
    }

    pub fn metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    pub fn environment(mut self, environment: Environment) -> Self {
        self.environment = environment;
        self
    }

    /// Validate and freeze the configuration.
    ///
    /// Fails when a required field is blank or when the number of identity
    /// credentials is anything other than one.
    pub fn build(self) -> RampResult<SessionConfig> {
        let identity = match (non_blank(self.email), non_blank(self.access_token)) {
            (Some(email), None) => Identity::Email(email),
            (None, Some(token)) => Identity::AccessToken(token),
            (Some(_), Some(_)) => {
                return Err(RampError::Validation(
                    "email and access_token are mutually exclusive".to_string(),
                ))
            }
            (None, None) => {
                return Err(RampError::Validation(
                    "one of email or access_token is required".to_string(),
                ))
            }
        };

        Ok(SessionConfig {
            api_key: required("apikey", self.api_key)?,
            destination: required("destination", self.destination)?,
            quote_currency: required("quote_currency", self.quote_currency)?,
            base_currency: required("base_currency", self.base_currency)?,
            identity,
            webhook_url: non_blank(self.webhook_url),
            reference_id: non_blank(self.reference_id),
            metadata: self.metadata,
            environment: self.environment,
        })
    }
}

/// Session issued by the remote API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionToken {
    pub session_token: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub expires_at: DateTime<Utc>,
    pub widget_url: String,
}

impl SessionToken {
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Parameters for `POST /api/v1/access-tokens/refresh`
#[derive(Clone)]
pub struct RefreshTokenRequest {
    api_key: String,
    access_token_id: String,
    refresh_token: String,
    environment: Environment,
}

impl fmt::Debug for RefreshTokenRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RefreshTokenRequest")
            .field("access_token_id", &self.access_token_id)
            .field("environment", &self.environment)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Serialize)]
struct RefreshTokenBody<'a> {
    access_token_id: &'a str,
    refresh_token: &'a str,
}

impl RefreshTokenRequest {
    pub fn new(
        api_key: impl Into<String>,
        access_token_id: impl Into<String>,
        refresh_token: impl Into<String>,
        environment: Environment,
    ) -> RampResult<Self> {
        Ok(Self {
            api_key: required("apikey", Some(api_key.into()))?,
            access_token_id: required("access_token_id", Some(access_token_id.into()))?,
            refresh_token: required("refresh_token", Some(refresh_token.into()))?,
            environment,
        })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn request_body(&self) -> RampResult<Value> {
        serde_json::to_value(RefreshTokenBody {
            access_token_id: &self.access_token_id,
            refresh_token: &self.refresh_token,
        })
        .map_err(|e| RampError::Serialization(e.to_string()))
    }
}

/// Fresh access/refresh token pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshedTokenPair {
    pub access_token_id: String,
    pub access_token: String,
    pub refresh_token: String,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub access_token_expires_at: DateTime<Utc>,
    #[serde(deserialize_with = "timestamp::deserialize")]
    pub refresh_token_expires_at: DateTime<Utc>,
}

/// Response envelope shared by every API endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Expiry timestamps as the API sends them: RFC 3339, or a zone-less
/// `YYYY-MM-DD HH:MM:SS` (optionally `T`-separated) read as UTC.
mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer};

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

    pub(super) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
            .map(|naive| naive.and_utc())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", raw)))
    }
}

fn required(field: &str, value: Option<String>) -> RampResult<String> {
    non_blank(value).ok_or_else(|| RampError::Validation(format!("{} is required", field)))
}
