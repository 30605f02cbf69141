use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub user_agent: Option<String>,
    pub upstream_timeout_sec: Option<u64>,
    pub profile_timeout_sec: Option<u64>,
    /// Human readable size, e.g. "32 MiB".
    pub max_response_body: Option<String>,
    pub max_redirects: Option<usize>,
    pub album_concurrency: Option<usize>,

    // Tables
    pub upstream: Option<UpstreamConfig>,
    pub retry: Option<RetryConfig>,
}

/// Base URLs of the upstream services.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct UpstreamConfig {
    pub musicbrainz_url: Option<String>,
    pub wikidata_url: Option<String>,
    pub wikipedia_url: Option<String>,
    pub coverart_url: Option<String>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct RetryConfig {
    pub max_retries: Option<u32>,
    pub initial_backoff_ms: Option<u64>,
    pub backoff_multiplier: Option<f64>,
    pub max_backoff_ms: Option<u64>,
    pub retry_status: Option<u16>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
