//! Rate limiting utilities for the Notion API.
//!
//! Notion answers `429 Too Many Requests` with a `Retry-After` header giving
//! the number of seconds to wait. The Notion client retries such responses a
//! bounded number of times, sleeping for the advertised duration.

use reqwest::header::{HeaderMap, RETRY_AFTER};
use std::time::Duration;
use tracing::{info, warn};

/// Maximum time to wait for a single rate limit window (5 minutes).
const MAX_WAIT_SECS: u64 = 300;

/// Wait used when a 429 response carries no usable `Retry-After` header.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// Number of times a rate limited request is retried before giving up.
pub const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Reads the `Retry-After` header as whole seconds.
///
/// Only the delay-seconds form is understood; HTTP dates and malformed
/// values yield `None`.
#[must_use]
pub fn retry_after_secs(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// Returns how long to wait before retrying, capped at [`MAX_WAIT_SECS`].
#[must_use]
pub fn retry_delay(retry_after_secs: Option<u64>) -> Duration {
    let requested = retry_after_secs.unwrap_or(DEFAULT_RETRY_AFTER_SECS);
    if requested > MAX_WAIT_SECS {
        warn!(
            requested,
            max_wait = MAX_WAIT_SECS,
            "Retry-After too far in future, capping wait time"
        );
    }
    Duration::from_secs(requested.min(MAX_WAIT_SECS))
}

/// Waits for rate limit reset with a specific duration.
///
/// # Arguments
///
/// * `retry_after_secs` - Seconds to wait (from Retry-After header), if any
/// * `attempt` - Which retry this is, starting at 1
pub async fn wait_for_retry_after(retry_after_secs: Option<u64>, attempt: u32) {
    let delay = retry_delay(retry_after_secs);
    info!(
        retry_after = retry_after_secs,
        wait_secs = delay.as_secs(),
        attempt,
        max_attempts = MAX_RATE_LIMIT_RETRIES,
        "Rate limited by Notion, waiting"
    );
    tokio::time::sleep(delay).await;
}
