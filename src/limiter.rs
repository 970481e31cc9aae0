//! Process-wide pacing for outbound JIRA calls
//!
//! A token bucket parameterized by sustained rate and burst allowance. Every
//! backend call acquires exactly one permit before touching the network, so
//! the limiter is the single serialization point for outbound pacing.

use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::error::{RelayError, Result};

/// Rate limiter shared by every backend call in the process.
///
/// Acquisition is FIFO by arrival: callers queue on the internal lock and
/// each reserves the next available token while holding it, so a slow burst
/// cannot starve earlier waiters. A caller whose reservation would exceed
/// the acquire timeout fails with `RateLimitExceeded` instead of blocking
/// indefinitely, and its token is returned to the bucket.
#[derive(Debug)]
pub struct RateLimiter {
    state: Mutex<Bucket>,
    rate_per_sec: f64,
    burst: f64,
    acquire_timeout: Duration,
}

#[derive(Debug)]
struct Bucket {
    tokens: f64,
    last_refill: Instant,
}

impl RateLimiter {
    /// Create a limiter with a sustained rate (permits per second), a burst
    /// allowance, and the maximum time a caller will wait for a permit.
    pub fn new(rate_per_sec: f64, burst: u32, acquire_timeout: Duration) -> Self {
        let burst = f64::from(burst.max(1));
        Self {
            state: Mutex::new(Bucket {
                tokens: burst,
                last_refill: Instant::now(),
            }),
            rate_per_sec: rate_per_sec.max(f64::MIN_POSITIVE),
            burst,
            acquire_timeout,
        }
    }

    /// Acquire one permit, waiting for capacity if necessary.
    ///
    /// Returns `RateLimitExceeded` without consuming capacity when the wait
    /// for this caller's slot would exceed the configured acquire timeout.
    pub async fn acquire(&self) -> Result<()> {
        let wait = {
            let mut bucket = self.state.lock().await;
            self.refill(&mut bucket);

            if bucket.tokens >= 1.0 {
                bucket.tokens -= 1.0;
                trace!(remaining = bucket.tokens, "rate limit permit granted");
                return Ok(());
            }

            // Reserve a future token; the deficit determines this caller's
            // position in line.
            bucket.tokens -= 1.0;
            let deficit = -bucket.tokens;
            let wait = Duration::from_secs_f64(deficit / self.rate_per_sec);

            if wait > self.acquire_timeout {
                bucket.tokens += 1.0;
                return Err(RelayError::RateLimitExceeded(format!(
                    "no permit available within {:.1}s (next slot in {:.1}s)",
                    self.acquire_timeout.as_secs_f64(),
                    wait.as_secs_f64()
                )));
            }
            wait
        };

        debug!(wait_ms = wait.as_millis() as u64, "waiting for rate limit permit");
        tokio::time::sleep(wait).await;
        Ok(())
    }

    fn refill(&self, bucket: &mut Bucket) {
        let now = Instant::now();
        let elapsed = now.duration_since(bucket.last_refill).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.rate_per_sec).min(self.burst);
        bucket.last_refill = now;
    }
}
