use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::header::RETRY_AFTER;
use reqwest::{Request, Response, StatusCode};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;

pub const DEFAULT_MAX_RETRIES: u32 = 3;

const RETRYABLE: [StatusCode; 5] = [
    StatusCode::TOO_MANY_REQUESTS,
    StatusCode::INTERNAL_SERVER_ERROR,
    StatusCode::BAD_GATEWAY,
    StatusCode::SERVICE_UNAVAILABLE,
    StatusCode::GATEWAY_TIMEOUT,
];

// Obsolete HTTP-date forms still allowed by RFC 9110 (RFC 850 and asctime).
const LEGACY_HTTP_DATE_FORMATS: [&str; 2] = ["%A, %d-%b-%y %H:%M:%S GMT", "%a %b %e %H:%M:%S %Y"];

/// A single request/response exchange with no retry logic of its own.
pub trait RoundTrip {
    fn round_trip(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Response, reqwest::Error>> + Send;
}

impl RoundTrip for reqwest::Client {
    fn round_trip(
        &self,
        request: Request,
    ) -> impl Future<Output = Result<Response, reqwest::Error>> + Send {
        self.execute(request)
    }
}

/// Retries transient statuses with exponential backoff.
///
/// Only 429/500/502/503/504 are retried. Connection-level failures are
/// returned straight away, and once the retry budget is spent the last
/// response is handed back untouched so the caller can classify it.
#[derive(Debug, Clone)]
pub struct RetryTransport<T = reqwest::Client> {
    inner: T,
    max_retries: u32,
}

impl<T: RoundTrip> RetryTransport<T> {
    pub fn new(inner: T) -> Self {
        Self::with_max_retries(inner, DEFAULT_MAX_RETRIES)
    }

    pub fn with_max_retries(inner: T, max_retries: u32) -> Self {
        Self { inner, max_retries }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// The wrapped transport, e.g. to build requests with it.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub async fn execute(
        &self,
        mut request: Request,
        cancel: &CancellationToken,
    ) -> Result<Response, ApiError> {
        let mut attempt: u32 = 0;
        loop {
            // Keep a copy for the next attempt; streaming bodies cannot be
            // cloned and are sent once.
            let retained = if attempt < self.max_retries {
                request.try_clone()
            } else {
                None
            };

            tracing::debug!(
                method = %request.method(),
                url = %request.url(),
                attempt,
                "sending request"
            );
            let response = self.send(request, cancel).await?;
            let status = response.status();
            if !is_retryable(status) {
                return Ok(response);
            }
            let Some(next) = retained else {
                return Ok(response);
            };

            let backoff = backoff_for(attempt).max(retry_after_header(&response));
            tracing::warn!(
                status = status.as_u16(),
                attempt = attempt + 1,
                max_retries = self.max_retries,
                ?backoff,
                "retryable status, backing off"
            );
            // Drain so the connection can go back to the pool.
            let _ = response.bytes().await;

            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(ApiError::Cancelled),
                _ = tokio::time::sleep(backoff) => {}
            }

            request = next;
            attempt += 1;
        }
    }

    async fn send(&self, request: Request, cancel: &CancellationToken) -> Result<Response, ApiError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = self.inner.round_trip(request) => result.map_err(ApiError::Transport),
        }
    }
}

fn is_retryable(status: StatusCode) -> bool {
    RETRYABLE.contains(&status)
}

/// 1s, 2s, 4s, ...
fn backoff_for(attempt: u32) -> Duration {
    Duration::from_secs(1u64 << attempt.min(32))
}

fn retry_after_header(response: &Response) -> Duration {
    response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|value| value.to_str().ok())
        .map(parse_retry_after)
        .unwrap_or(Duration::ZERO)
}

/// Parse a `Retry-After` value given as delay seconds or an HTTP-date.
/// Empty, malformed and past values are zero.
pub fn parse_retry_after(value: &str) -> Duration {
    let value = value.trim();
    if value.is_empty() {
        return Duration::ZERO;
    }
    if let Ok(secs) = value.parse::<u64>() {
        return Duration::from_secs(secs);
    }

    let Some(at) = parse_http_date(value) else {
        return Duration::ZERO;
    };
    (at - Utc::now()).to_std().unwrap_or(Duration::ZERO)
}

fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc2822(value) {
        return Some(at.with_timezone(&Utc));
    }
    LEGACY_HTTP_DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|naive| naive.and_utc())
}
