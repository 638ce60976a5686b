use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;

/// Requests allowed per [`DEFAULT_PERIOD`].
pub const DEFAULT_RATE: u32 = 10;
pub const DEFAULT_PERIOD: Duration = Duration::from_secs(1);

const MIN_REFILL_INTERVAL: Duration = Duration::from_millis(1);

/// Token bucket with a background refill task.
///
/// The bucket starts full with `rate` tokens. Every `period / rate` one token
/// is added back; ticks that land on a full bucket are dropped, so idle time
/// never builds up credit beyond the capacity.
pub struct RateLimiter {
    tokens: Arc<Semaphore>,
    refill: Mutex<Option<JoinHandle<()>>>,
}

impl RateLimiter {
    /// Must be called from within a Tokio runtime.
    pub fn new(rate: u32, period: Duration) -> Self {
        let capacity = rate.max(1) as usize;
        let tokens = Arc::new(Semaphore::new(capacity));
        let every = (period / capacity as u32).max(MIN_REFILL_INTERVAL);

        let bucket = tokens.clone();
        let refill = tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                // Only this task adds permits, so the check cannot race into
                // an overfull bucket.
                if bucket.available_permits() < capacity {
                    bucket.add_permits(1);
                }
            }
        });

        tracing::debug!(rate = capacity, ?every, "rate limiter started");

        Self {
            tokens,
            refill: Mutex::new(Some(refill)),
        }
    }

    /// Wait for a token, or fail with [`ApiError::Cancelled`] once `cancel`
    /// fires.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Result<(), ApiError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            permit = self.tokens.acquire() => match permit {
                Ok(permit) => {
                    permit.forget();
                    Ok(())
                }
                // The semaphore is never closed.
                Err(_) => Err(ApiError::Cancelled),
            },
        }
    }

    /// Tokens currently in the bucket.
    pub fn available(&self) -> usize {
        self.tokens.available_permits()
    }

    /// Stop the refill task. Safe to call more than once; tokens already in
    /// the bucket remain usable.
    pub fn close(&self) {
        if let Some(handle) = self.lock_refill().take() {
            handle.abort();
            tracing::debug!("rate limiter stopped");
        }
    }

    pub fn is_closed(&self) -> bool {
        self.lock_refill().is_none()
    }

    fn lock_refill(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        match self.refill.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_RATE, DEFAULT_PERIOD)
    }
}

impl Drop for RateLimiter {
    fn drop(&mut self) {
        self.close();
    }
}
