//! Process-scoped HTTP transport shared by every upstream client.

use super::FetchError;
use crate::config::DEFAULT_USER_AGENT;
use crate::server::metrics::record_upstream_request;
use anyhow::{Context, Result};
use reqwest::{header, redirect, Client, Response};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

/// Cover-art listings for large discographies easily exceed the usual
/// client defaults.
pub const DEFAULT_MAX_BODY_BYTES: u64 = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct TransportSettings {
    pub user_agent: String,
    /// Per-call timeout, covering connect and body download.
    pub timeout: Duration,
    pub max_redirects: usize,
    pub max_body_bytes: u64,
}

impl Default for TransportSettings {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout: Duration::from_secs(30),
            max_redirects: 10,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Wraps a single [`reqwest::Client`] so the connection pool lives as long
/// as the process. Cloning is cheap and shares the pool.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    max_body_bytes: u64,
}

impl HttpTransport {
    pub fn new(settings: &TransportSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.as_str())
            .timeout(settings.timeout)
            .redirect(redirect::Policy::limited(settings.max_redirects))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            max_body_bytes: settings.max_body_bytes,
        })
    }

    /// GET `url` and decode the JSON body into `T`.
    ///
    /// `source` labels the call in metrics ("musicbrainz", "wikidata", ...).
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        source: &'static str,
        url: &str,
    ) -> Result<T, FetchError> {
        let start = Instant::now();
        let result = self.fetch_json(url).await;

        let outcome = match &result {
            Ok(_) => "success",
            Err(err) => err.kind(),
        };
        record_upstream_request(source, outcome, start.elapsed());

        result
    }

    async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, FetchError> {
        debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = self.read_error_body(url, response).await;
            return Err(FetchError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = self.read_body(response).await?;
        serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// Reads the body chunk by chunk so an oversized payload is rejected
    /// without buffering all of it.
    async fn read_body(&self, mut response: Response) -> Result<Vec<u8>, FetchError> {
        let limit = self.max_body_bytes;
        if response.content_length().is_some_and(|len| len > limit) {
            return Err(FetchError::BodyTooLarge { limit });
        }

        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?
        {
            if (body.len() + chunk.len()) as u64 > limit {
                return Err(FetchError::BodyTooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }

    /// Error bodies are passed through to callers, so an oversized one is
    /// truncated at the limit instead of failing the call.
    async fn read_error_body(&self, url: &str, mut response: Response) -> String {
        let limit = self.max_body_bytes as usize;
        let mut body = Vec::new();
        loop {
            match response.chunk().await {
                Ok(Some(chunk)) => {
                    let remaining = limit - body.len();
                    if chunk.len() >= remaining {
                        body.extend_from_slice(&chunk[..remaining]);
                        debug!("Error body from {} truncated at {} bytes", url, limit);
                        break;
                    }
                    body.extend_from_slice(&chunk);
                }
                Ok(None) => break,
                Err(err) => {
                    warn!("Failed to read error body from {}: {}", url, err);
                    break;
                }
            }
        }
        String::from_utf8_lossy(&body).into_owned()
    }
}
