use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

const UNKNOWN_ERROR: &str = "unknown error";

#[derive(Debug, Error)]
pub enum ApiError {
    /// 401 or 403.
    #[error("authentication failed: {message}")]
    Auth { status: u16, message: String },
    /// 429 after the transport gave up retrying.
    #[error("rate limited: retry after {}s", retry_after.as_secs())]
    RateLimited {
        message: String,
        retry_after: Duration,
    },
    /// Any other non-2xx status.
    #[error("api error ({status}): {message}")]
    Status { status: u16, message: String },
    #[error("operation cancelled")]
    Cancelled,
    #[error("execute request")]
    Transport(#[from] reqwest::Error),
    #[error("encode request")]
    Encode(#[source] serde_json::Error),
    #[error("decode response")]
    Decode(#[source] serde_json::Error),
    #[error("{action}")]
    Context {
        action: String,
        #[source]
        source: Box<ApiError>,
    },
}

impl ApiError {
    /// Wrap this error with a short description of what was being attempted.
    pub fn context(self, action: impl Into<String>) -> Self {
        ApiError::Context {
            action: action.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error beneath any number of `Context` layers.
    pub fn root(&self) -> &ApiError {
        let mut current = self;
        while let ApiError::Context { source, .. } = current {
            current = source;
        }
        current
    }

    pub fn is_auth(&self) -> bool {
        matches!(self.root(), ApiError::Auth { .. })
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self.root(), ApiError::RateLimited { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), ApiError::Cancelled)
    }

    /// HTTP status carried by the underlying service error, if any.
    pub fn status(&self) -> Option<u16> {
        match self.root() {
            ApiError::Auth { status, .. } | ApiError::Status { status, .. } => Some(*status),
            ApiError::RateLimited { .. } => Some(429),
            _ => None,
        }
    }

    /// Suggested delay for rate-limit errors.
    pub fn retry_after(&self) -> Option<Duration> {
        match self.root() {
            ApiError::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// Service-provided message for status errors.
    pub fn message(&self) -> Option<&str> {
        match self.root() {
            ApiError::Auth { message, .. }
            | ApiError::RateLimited { message, .. }
            | ApiError::Status { message, .. } => Some(message),
            _ => None,
        }
    }
}

pub trait ResultExt<T> {
    fn context(self, action: &str) -> Result<T, ApiError>;
}

impl<T> ResultExt<T> for Result<T, ApiError> {
    fn context(self, action: &str) -> Result<T, ApiError> {
        self.map_err(|err| err.context(action))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    #[allow(dead_code)]
    code: i64,
}

/// Turn a non-2xx response into a typed error.
pub fn classify(status: u16, body: &[u8]) -> ApiError {
    let message = serde_json::from_slice::<ErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| UNKNOWN_ERROR.to_string());

    match status {
        401 | 403 => ApiError::Auth { status, message },
        429 => ApiError::RateLimited {
            message,
            retry_after: retry_after_from_body(body),
        },
        _ => ApiError::Status { status, message },
    }
}

/// Read `retry_after` from a rate-limit body. Accepts a JSON number or a
/// numeric string; anything else is zero.
fn retry_after_from_body(body: &[u8]) -> Duration {
    let Ok(raw) = serde_json::from_slice::<serde_json::Value>(body) else {
        return Duration::ZERO;
    };
    match raw.get("retry_after") {
        Some(serde_json::Value::Number(n)) => n
            .as_f64()
            .filter(|secs| secs.is_finite() && *secs > 0.0)
            .map(|secs| Duration::from_secs(secs.trunc() as u64))
            .unwrap_or(Duration::ZERO),
        Some(serde_json::Value::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Duration::from_secs)
            .unwrap_or(Duration::ZERO),
        _ => Duration::ZERO,
    }
}
