//! Retry policy for canonical artist metadata lookups.
//!
//! Exponential backoff, but only for one specific upstream status (400 by
//! default). Every other failure is surfaced on the first attempt.

use super::{ArtistMetadataSource, FetchError};
use crate::config::RetrySettings;
use crate::profile::ArtistMetadata;
use crate::server::metrics::record_upstream_retry;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts made after the first one.
    pub max_retries: u32,
    pub initial_backoff: Duration,
    pub backoff_multiplier: f64,
    pub max_backoff: Duration,
    /// The only upstream status that is retried.
    pub retry_status: u16,
}

impl RetryPolicy {
    pub fn new(config: &RetrySettings) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_backoff: Duration::from_millis(config.initial_backoff_ms),
            backoff_multiplier: config.backoff_multiplier,
            max_backoff: Duration::from_millis(config.max_backoff_ms),
            retry_status: config.retry_status,
        }
    }

    /// Returns true if `error` is retryable and `retry_count` retries have
    /// not yet exhausted the budget.
    pub fn should_retry(&self, error: &FetchError, retry_count: u32) -> bool {
        retry_count < self.max_retries && error.status() == Some(self.retry_status)
    }

    /// Delay before retry number `retry_count` (zero based):
    /// `initial_backoff * multiplier^retry_count`, capped at `max_backoff`.
    pub fn backoff(&self, retry_count: u32) -> Duration {
        let exponent = retry_count.min(i32::MAX as u32) as i32;
        let backoff_ms =
            self.initial_backoff.as_millis() as f64 * self.backoff_multiplier.powi(exponent);
        let max_ms = self.max_backoff.as_millis() as f64;
        // f64::min ignores NaN (0 * inf), and the u64 cast saturates.
        Duration::from_millis(backoff_ms.min(max_ms) as u64)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            max_backoff: Duration::from_secs(60),
            retry_status: 400,
        }
    }
}

/// Decorates an [`ArtistMetadataSource`] with a [`RetryPolicy`].
pub struct RetryingArtistMetadataSource {
    inner: Arc<dyn ArtistMetadataSource>,
    policy: RetryPolicy,
}

impl RetryingArtistMetadataSource {
    pub fn new(inner: Arc<dyn ArtistMetadataSource>, policy: RetryPolicy) -> Self {
        Self { inner, policy }
    }
}

#[async_trait]
impl ArtistMetadataSource for RetryingArtistMetadataSource {
    async fn fetch_artist(&self, mbid: &str) -> Result<ArtistMetadata, FetchError> {
        let mut retry_count = 0;
        loop {
            match self.inner.fetch_artist(mbid).await {
                Ok(artist) => return Ok(artist),
                Err(err) if self.policy.should_retry(&err, retry_count) => {
                    let delay = self.policy.backoff(retry_count);
                    warn!(
                        "Artist lookup for {} failed ({}), retry {}/{} in {:?}",
                        mbid,
                        err,
                        retry_count + 1,
                        self.policy.max_retries,
                        delay
                    );
                    record_upstream_retry("musicbrainz");
                    tokio::time::sleep(delay).await;
                    retry_count += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
