//! HTTP client for the StrawPoll v3 API.

pub mod client;
pub mod error;
pub mod poll_id;
pub mod polls;
pub mod ratelimit;
pub mod transport;

#[cfg(test)]
mod testing;

pub use client::{Client, ClientOptions, DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
pub use error::{classify, ApiError, ResultExt};
pub use poll_id::{poll_url, resolve_poll_id, SITE_URL};
pub use polls::ListKind;
pub use ratelimit::RateLimiter;
pub use transport::{parse_retry_after, RetryTransport, RoundTrip};

pub use tokio_util::sync::CancellationToken;
