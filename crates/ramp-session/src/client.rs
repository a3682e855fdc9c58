//! # Ramp Session Client
//!
//! reqwest implementation of [`SessionIssuer`]. One POST per call; no retry,
//! no timeout.

use crate::config::ClientConfig;
use async_trait::async_trait;
use ramp_core::{
    ApiEnvelope, Environment, RampError, RampResult, RefreshTokenRequest, RefreshedTokenPair,
    ResponseBody, SessionConfig, SessionIssuer, SessionToken,
};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, instrument};

pub const INIT_SESSION_PATH: &str = "/api/v1/ramp-widget";
pub const REFRESH_TOKEN_PATH: &str = "/api/v1/access-tokens/refresh";

const INIT_SESSION_OP: &str = "initialize ramp session";
const REFRESH_TOKEN_OP: &str = "refresh access token";

/// HTTP client for the ramp session endpoints
pub struct RampSessionClient {
    config: ClientConfig,
    client: Client,
}

impl RampSessionClient {
    /// Create a new session client
    pub fn new(config: ClientConfig) -> RampResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| RampError::TransportFailed {
                operation: "build HTTP client",
                message: e.to_string(),
            })?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> RampResult<Self> {
        Self::new(ClientConfig::from_env())
    }

    /// Builder: set custom API base URL (for testing)
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.config.api_base_url = Some(url.into());
        self
    }

    fn endpoint(&self, environment: Environment, path: &str) -> String {
        let base = match &self.config.api_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => environment.api_base_url(),
        };
        format!("{}{}", base, path)
    }

    async fn post<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        url: &str,
        api_key: &str,
        body: &Value,
    ) -> RampResult<T> {
        let transport = |e: reqwest::Error| RampError::TransportFailed {
            operation,
            message: e.to_string(),
        };

        let response = self
            .client
            .post(url)
            .header("apikey", api_key)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        let text = response.text().await.map_err(transport)?;

        if !status.is_success() {
            let body = ResponseBody::from_text(text);
            error!("Ramp API error: operation={}, status={}, body={}", operation, status, body);
            return Err(request_failed(operation, status, body));
        }

        let envelope: ApiEnvelope<T> = serde_json::from_str(&text).map_err(|e| {
            RampError::Serialization(format!("Failed to parse {} response: {}", operation, e))
        })?;

        match envelope.data {
            Some(data) => Ok(data),
            None => {
                error!(
                    "Ramp API returned no data: operation={}, error={:?}, message={:?}",
                    operation, envelope.error, envelope.message
                );
                let body = ResponseBody::Json(serde_json::json!({
                    "error": envelope.error,
                    "message": envelope.message,
                    "success": envelope.success,
                }));
                Err(request_failed(operation, status, body))
            }
        }
    }
}

fn request_failed(operation: &'static str, status: StatusCode, body: ResponseBody) -> RampError {
    RampError::RequestFailed {
        operation,
        status: status.as_u16(),
        status_text: status.canonical_reason().unwrap_or_default().to_string(),
        body,
    }
}

#[async_trait]
impl SessionIssuer for RampSessionClient {
    #[instrument(skip(self, config), fields(environment = %config.environment()))]
    async fn init_session(&self, config: &SessionConfig) -> RampResult<SessionToken> {
        let url = self.endpoint(config.environment(), INIT_SESSION_PATH);
        let body = config.request_body()?;

        debug!("Opening ramp session: url={}", url);

        let token: SessionToken = self
            .post(INIT_SESSION_OP, &url, config.api_key(), &body)
            .await?;

        info!("Opened ramp session: expires_at={}", token.expires_at);
        Ok(token)
    }

    #[instrument(skip(self, request), fields(environment = %request.environment()))]
    async fn refresh_token(
        &self,
        request: &RefreshTokenRequest,
    ) -> RampResult<RefreshedTokenPair> {
        let url = self.endpoint(request.environment(), REFRESH_TOKEN_PATH);
        let body = request.request_body()?;

        let pair: RefreshedTokenPair = self
            .post(REFRESH_TOKEN_OP, &url, request.api_key(), &body)
            .await?;

        info!(
            "Refreshed access token: id={}, expires_at={}",
            pair.access_token_id, pair.access_token_expires_at
        );
        Ok(pair)
    }

    fn issuer_name(&self) -> &'static str {
        "ramp-api"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn session_config() -> SessionConfig {
        SessionConfig::builder()
            .api_key("key_test")
            .destination("satoshi@example.com")
            .quote_currency("USD")
            .base_currency("BTC")
            .email("user@example.com")
            .reference_id("order-7")
            .build()
            .unwrap()
    }

    fn client_for(server: &MockServer) -> RampSessionClient {
        RampSessionClient::new(ClientConfig::default())
            .unwrap()
            .with_api_base_url(server.uri())
    }

    #[test]
    fn test_endpoint_follows_environment() {
        let client = RampSessionClient::new(ClientConfig::default()).unwrap();
        assert_eq!(
            client.endpoint(Environment::Production, INIT_SESSION_PATH),
            "https://api.example.com/api/v1/ramp-widget"
        );
        assert_eq!(
            client.endpoint(Environment::X2, REFRESH_TOKEN_PATH),
            "https://api.x2.example.com/api/v1/access-tokens/refresh"
        );

        let client = client.with_api_base_url("http://localhost:4000/");
        assert_eq!(
            client.endpoint(Environment::X2, INIT_SESSION_PATH),
            "http://localhost:4000/api/v1/ramp-widget"
        );
    }

    #[tokio::test]
    async fn test_init_session_success() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(INIT_SESSION_PATH))
            .and(header("apikey", "key_test"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "destination": "satoshi@example.com",
                "quote_currency": "USD",
                "base_currency": "BTC",
                "email": "user@example.com",
                "reference_id": "order-7"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "session_token": "st_123",
                    "expires_at": "2030-06-01T12:00:00Z",
                    "widget_url": "https://ramp.example.com/?session_token=st_123"
                },
                "error": null,
                "success": true,
                "message": "Session created"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let token = client_for(&server)
            .init_session(&session_config())
            .await
            .unwrap();

        assert_eq!(token.session_token, "st_123");
        assert_eq!(
            token.widget_url,
            "https://ramp.example.com/?session_token=st_123"
        );
        assert_eq!(token.expires_at.to_rfc3339(), "2030-06-01T12:00:00+00:00");
    }

    #[tokio::test]
    async fn test_init_session_json_error_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(INIT_SESSION_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({"error": "bad"})))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .init_session(&session_config())
            .await
            .unwrap_err();

        match &err {
            RampError::RequestFailed { status, body, .. } => {
                assert_eq!(*status, 500);
                assert_eq!(*body, ResponseBody::Json(json!({"error": "bad"})));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        let message = err.to_string();
        assert!(message.contains("500"));
        assert!(message.contains("bad"));
    }

    #[tokio::test]
    async fn test_init_session_text_error_body() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(INIT_SESSION_PATH))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .init_session(&session_config())
            .await
            .unwrap_err();

        let message = err.to_string();
        assert!(message.contains("401"));
        assert!(message.contains("Unauthorized"));
        assert!(matches!(
            err,
            RampError::RequestFailed {
                body: ResponseBody::Text(_),
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_envelope_without_data() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(INIT_SESSION_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": null,
                "error": "destination not allowed",
                "success": false,
                "message": "rejected"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .init_session(&session_config())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("destination not allowed"));
    }

    #[tokio::test]
    async fn test_transport_failure() {
        let client = RampSessionClient::new(ClientConfig::default())
            .unwrap()
            .with_api_base_url("http://127.0.0.1:1");

        let err = client.init_session(&session_config()).await.unwrap_err();
        assert!(matches!(err, RampError::TransportFailed { .. }));
    }

    #[tokio::test]
    async fn test_refresh_token() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(REFRESH_TOKEN_PATH))
            .and(header("apikey", "key_test"))
            .and(body_json(json!({
                "access_token_id": "ati_1",
                "refresh_token": "rt_old"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "data": {
                    "access_token_id": "ati_1",
                    "access_token": "at_new",
                    "refresh_token": "rt_new",
                    "access_token_expires_at": "2030-01-01T00:00:00Z",
                    "refresh_token_expires_at": "2030-02-01T00:00:00Z"
                },
                "error": null,
                "success": true,
                "message": "ok"
            })))
            .mount(&server)
            .await;

        let request =
            RefreshTokenRequest::new("key_test", "ati_1", "rt_old", Environment::X1).unwrap();
        let pair = client_for(&server).refresh_token(&request).await.unwrap();

        assert_eq!(pair.access_token, "at_new");
        assert_eq!(pair.refresh_token, "rt_new");
        assert!(pair.refresh_token_expires_at > pair.access_token_expires_at);
    }
}
