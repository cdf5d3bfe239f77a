use std::future::Future;
use std::pin::Pin;

use snafu::ResultExt;
use url::Url;

use super::error::{
    BuildClientSnafu, DecodeSnafu, InvalidBaseUrlSnafu, RequestSnafu, StatusSnafu,
    TransportResult,
};
use super::types::{ExchangeReply, SendMessageResponse, SessionToken};

/// Path of the single backend operation, relative to the base address.
pub const SEND_MESSAGE_PATH: &str = "api/send-message";

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    base_url: Url,
}

impl TransportConfig {
    /// Parses the backend base address.
    ///
    /// The path always gains a trailing slash, so `http://host/prefix` sends to
    /// `http://host/prefix/api/send-message`.
    pub fn new(base_url: &str) -> TransportResult<Self> {
        let raw = base_url.trim();
        let mut base_url = Url::parse(raw).context(InvalidBaseUrlSnafu {
            stage: "parse-base-url",
            raw: raw.to_string(),
        })?;

        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn send_message_url(&self) -> TransportResult<Url> {
        self.base_url
            .join(SEND_MESSAGE_PATH)
            .context(InvalidBaseUrlSnafu {
                stage: "join-send-message-path",
                raw: self.base_url.to_string(),
            })
    }
}

/// Outbound seam to the chat backend.
pub trait ChatTransport: Send + Sync {
    /// Sends one user message. The caller supplies the session token it holds;
    /// implementations never look one up themselves.
    fn send_message<'a>(
        &'a self,
        text: &'a str,
        session_token: Option<&'a SessionToken>,
    ) -> BoxFuture<'a, TransportResult<ExchangeReply>>;
}

/// reqwest-backed transport. No retry and no timeout are applied.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    config: TransportConfig,
    endpoint: Url,
    http: reqwest::Client,
}

impl HttpTransport {
    pub fn new(config: TransportConfig) -> TransportResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .context(BuildClientSnafu {
                stage: "build-http-client",
            })?;
        Self::with_client(config, http)
    }

    pub fn with_client(config: TransportConfig, http: reqwest::Client) -> TransportResult<Self> {
        let endpoint = config.send_message_url()?;
        Ok(Self {
            config,
            endpoint,
            http,
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    async fn post_message(
        &self,
        text: &str,
        session_token: Option<&SessionToken>,
    ) -> TransportResult<ExchangeReply> {
        let session_id = session_token.map(SessionToken::as_str).unwrap_or_default();

        tracing::debug!(
            endpoint = %self.endpoint,
            has_session = session_token.is_some(),
            text_len = text.len(),
            "sending chat message"
        );

        let response = self
            .http
            .post(self.endpoint.clone())
            .query(&[("user_input", text), ("session_id", session_id)])
            .send()
            .await
            .context(RequestSnafu {
                stage: "send-message-request",
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return StatusSnafu {
                stage: "send-message-status",
                status: status.as_u16(),
                body,
            }
            .fail();
        }

        let payload = response
            .json::<SendMessageResponse>()
            .await
            .context(DecodeSnafu {
                stage: "decode-send-message-response",
            })?;

        Ok(ExchangeReply::from(payload))
    }
}

impl ChatTransport for HttpTransport {
    fn send_message<'a>(
        &'a self,
        text: &'a str,
        session_token: Option<&'a SessionToken>,
    ) -> BoxFuture<'a, TransportResult<ExchangeReply>> {
        Box::pin(self.post_message(text, session_token))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::net::SocketAddr;
    use std::sync::{Arc, Mutex};

    use axum::extract::{Query, State};
    use axum::http::{Method, StatusCode};
    use axum::routing::{any, post};
    use axum::{Json, Router};

    use super::*;
    use crate::TransportError;

    type Seen = Arc<Mutex<Vec<(Method, HashMap<String, String>)>>>;

    async fn record(
        State(seen): State<Seen>,
        method: Method,
        Query(params): Query<HashMap<String, String>>,
    ) -> Json<serde_json::Value> {
        let user_input = params.get("user_input").cloned().unwrap_or_default();
        seen.lock().unwrap().push((method, params));
        Json(serde_json::json!({
            "user_message": user_input,
            "bot_response": "hello",
            "session_id": "s1",
        }))
    }

    async fn spawn_backend(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    fn transport_for(base: &str) -> HttpTransport {
        HttpTransport::new(TransportConfig::new(base).unwrap()).unwrap()
    }

    #[test]
    fn config_appends_trailing_slash_before_joining() {
        let root = TransportConfig::new("http://localhost:8000").unwrap();
        let prefixed = TransportConfig::new(" http://localhost:8000/chat ").unwrap();

        assert_eq!(
            root.send_message_url().unwrap().as_str(),
            "http://localhost:8000/api/send-message"
        );
        assert_eq!(
            prefixed.send_message_url().unwrap().as_str(),
            "http://localhost:8000/chat/api/send-message"
        );
    }

    #[test]
    fn config_rejects_relative_base() {
        let error = TransportConfig::new("not a url").unwrap_err();
        assert!(matches!(error, TransportError::InvalidBaseUrl { .. }));
        assert_eq!(error.stage(), "parse-base-url");
    }

    #[tokio::test]
    async fn posts_query_parameters_and_decodes_reply() {
        let seen: Seen = Arc::default();
        let router = Router::new()
            .route("/api/send-message", any(record))
            .with_state(seen.clone());
        let addr = spawn_backend(router).await;
        let transport = transport_for(&format!("http://{addr}"));
        let token = SessionToken::new("s0").unwrap();

        let first = transport.send_message("hi there", None).await.unwrap();
        let second = transport.send_message("again", Some(&token)).await.unwrap();

        assert_eq!(first.user_text, "hi there");
        assert_eq!(first.bot_text, "hello");
        assert_eq!(first.session_token, SessionToken::new("s1"));
        assert_eq!(second.user_text, "again");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0].0, Method::POST);
        assert_eq!(seen[0].1.get("user_input").map(String::as_str), Some("hi there"));
        assert_eq!(seen[0].1.get("session_id").map(String::as_str), Some(""));
        assert_eq!(seen[1].1.get("session_id").map(String::as_str), Some("s0"));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let router = Router::new().route(
            "/api/send-message",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let addr = spawn_backend(router).await;

        let error = transport_for(&format!("http://{addr}"))
            .send_message("hi", None)
            .await
            .unwrap_err();

        match error {
            TransportError::Status { status, body, .. } => {
                assert_eq!(status, 500);
                assert_eq!(body, "boom");
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let router = Router::new().route("/api/send-message", post(|| async { "not json" }));
        let addr = spawn_backend(router).await;

        let error = transport_for(&format!("http://{addr}"))
            .send_message("hi", None)
            .await
            .unwrap_err();

        assert!(matches!(error, TransportError::Decode { .. }));
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_request_error() {
        // Bind then drop to get a port nothing listens on.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let error = transport_for(&format!("http://{addr}"))
            .send_message("hi", None)
            .await
            .unwrap_err();

        assert!(matches!(error, TransportError::Request { .. }));
    }
}
