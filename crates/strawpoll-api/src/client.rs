use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::{classify, ApiError, ResultExt};
use crate::ratelimit::{RateLimiter, DEFAULT_PERIOD, DEFAULT_RATE};
use crate::transport::{RetryTransport, DEFAULT_MAX_RETRIES};

pub const DEFAULT_BASE_URL: &str = "https://api.strawpoll.com/v3";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const API_KEY_HEADER: &str = "X-API-Key";

const JSON: &str = "application/json";

#[derive(Debug, Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub api_key: Option<String>,
    /// Per-attempt bound, independent of time spent waiting on the limiter.
    pub timeout: Duration,
    pub max_retries: u32,
    pub rate: u32,
    pub period: Duration,
    pub user_agent: String,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout: DEFAULT_TIMEOUT,
            max_retries: DEFAULT_MAX_RETRIES,
            rate: DEFAULT_RATE,
            period: DEFAULT_PERIOD,
            user_agent: concat!("strawpoll-cli/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Rate-limited, retrying JSON client for the StrawPoll v3 API.
///
/// Every call goes limiter -> retry transport -> classifier. Construct it
/// inside a Tokio runtime; the limiter spawns its refill task immediately.
pub struct Client {
    http: RetryTransport<reqwest::Client>,
    limiter: RateLimiter,
    api_key: Option<String>,
    base_url: String,
}

impl Client {
    pub fn new(api_key: Option<String>) -> Result<Self, ApiError> {
        Self::with_options(ClientOptions {
            api_key,
            ..ClientOptions::default()
        })
    }

    pub fn with_options(options: ClientOptions) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent)
            .build()?;

        Ok(Self {
            http: RetryTransport::with_max_retries(http, options.max_retries),
            limiter: RateLimiter::new(options.rate, options.period),
            api_key: options.api_key.filter(|key| !key.is_empty()),
            base_url: options.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Issue one API call and decode the response.
    ///
    /// Returns `Ok(None)` for a successful response with an empty body.
    pub async fn request<B, R>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        cancel: &CancellationToken,
    ) -> Result<Option<R>, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let payload = body
            .map(|body| serde_json::to_vec(body).map_err(ApiError::Encode))
            .transpose()?;
        let bytes = self.send(method, path, payload, cancel).await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(ApiError::Decode)
    }

    /// GET. An empty 2xx body decodes as `R::default()`.
    pub async fn get<R>(&self, path: &str, cancel: &CancellationToken) -> Result<R, ApiError>
    where
        R: DeserializeOwned + Default,
    {
        self.request::<(), R>(Method::GET, path, None, cancel)
            .await
            .map(Option::unwrap_or_default)
    }

    pub async fn post<B, R>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned + Default,
    {
        self.request(Method::POST, path, Some(body), cancel)
            .await
            .map(Option::unwrap_or_default)
    }

    pub async fn put<B, R>(
        &self,
        path: &str,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<R, ApiError>
    where
        B: Serialize + ?Sized,
        R: DeserializeOwned + Default,
    {
        self.request(Method::PUT, path, Some(body), cancel)
            .await
            .map(Option::unwrap_or_default)
    }

    /// DELETE, ignoring whatever body comes back.
    pub async fn delete(&self, path: &str, cancel: &CancellationToken) -> Result<(), ApiError> {
        self.send(Method::DELETE, path, None, cancel).await?;
        Ok(())
    }

    /// Stop the limiter's refill task. Idempotent; dropping the client does
    /// the same.
    pub fn close(&self) {
        self.limiter.close();
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        payload: Option<Vec<u8>>,
        cancel: &CancellationToken,
    ) -> Result<Vec<u8>, ApiError> {
        self.limiter.acquire(cancel).await.context("rate limiter")?;

        let url = format!("{}{}", self.base_url, path);
        let mut builder = self
            .http
            .inner()
            .request(method.clone(), url)
            .header(ACCEPT, JSON);
        if let Some(key) = &self.api_key {
            builder = builder.header(API_KEY_HEADER, key);
        }
        if let Some(payload) = payload {
            builder = builder.header(CONTENT_TYPE, JSON).body(payload);
        }
        let request = builder.build()?;

        let response = self.http.execute(request, cancel).await?;
        let status = response.status();
        let bytes = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(ApiError::Cancelled),
            bytes = response.bytes() => bytes?,
        };
        tracing::debug!(%method, path, status = status.as_u16(), len = bytes.len(), "response");

        if !status.is_success() {
            return Err(classify(status.as_u16(), &bytes));
        }
        Ok(bytes.to_vec())
    }
}

impl Drop for Client {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Canned, FakeServer};
    use serde_json::{json, Value};

    #[tokio::test]
    async fn api_key_header_is_sent_when_configured() {
        let server = FakeServer::start(Canned::ok(json!({"ok": true}))).await;
        let client = server.client(Some("secret"));

        let value: Value = client
            .get("/polls/abc", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(value, json!({"ok": true}));
        let seen = server.last();
        assert_eq!(seen.method, "GET");
        assert_eq!(seen.path, "/polls/abc");
        assert_eq!(seen.api_key.as_deref(), Some("secret"));
        assert_eq!(seen.content_type, None);
        assert!(seen.body.is_empty());
    }

    #[tokio::test]
    async fn api_key_header_is_omitted_without_key() {
        let server = FakeServer::start(Canned::ok(json!({}))).await;
        for key in [None, Some("")] {
            let client = server.client(key);
            let _: Value = client
                .get("/polls/abc", &CancellationToken::new())
                .await
                .unwrap();
            assert_eq!(server.last().api_key, None);
        }
    }

    #[tokio::test]
    async fn post_sends_json_body() {
        let server = FakeServer::start(Canned::ok(json!({"id": "new"}))).await;
        let client = server.client(None);

        let value: Value = client
            .post("/polls", &json!({"title": "Lunch"}), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(value["id"], "new");
        let seen = server.last();
        assert_eq!(seen.method, "POST");
        assert_eq!(seen.content_type.as_deref(), Some("application/json"));
        let sent: Value = serde_json::from_slice(&seen.body).unwrap();
        assert_eq!(sent, json!({"title": "Lunch"}));
    }

    #[tokio::test]
    async fn non_success_status_is_classified() {
        let server = FakeServer::start(Canned::status(
            404,
            json!({"error": {"message": "Poll not found", "code": 404}}),
        ))
        .await;
        let client = server.client(None);

        let err = client
            .get::<Value>("/polls/missing", &CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert_eq!(err.message(), Some("Poll not found"));
    }

    #[tokio::test]
    async fn unauthorized_is_auth_error() {
        let server = FakeServer::start(Canned::status(
            401,
            json!({"error": {"message": "Invalid API key", "code": 401}}),
        ))
        .await;
        let client = server.client(Some("wrong"));

        let err = client
            .get::<Value>("/polls/abc", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(err.is_auth());
        assert_eq!(err.to_string(), "authentication failed: Invalid API key");
    }

    #[tokio::test]
    async fn empty_success_body_is_none() {
        let server = FakeServer::start(Canned::empty(204)).await;
        let client = server.client(None);

        let result: Option<Value> = client
            .request::<Value, Value>(Method::DELETE, "/polls/abc", None, &CancellationToken::new())
            .await
            .unwrap();
        assert!(result.is_none());
        client
            .delete("/polls/abc", &CancellationToken::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn cancelled_token_fails_before_sending() {
        let server = FakeServer::start(Canned::ok(json!({}))).await;
        let client = server.client(None);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let err = client.get::<Value>("/polls/abc", &cancel).await.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(server.count(), 0);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let client = Client::new(None).unwrap();
        client.close();
        client.close();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert!(!client.has_api_key());
    }
}
