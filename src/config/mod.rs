mod file_config;

pub use file_config::{FileConfig, RetryConfig, UpstreamConfig};

use crate::profile::DEFAULT_ALBUM_CONCURRENCY;
use crate::server::{RequestsLoggingLevel, ServerConfig};
use crate::upstream::{
    TransportSettings, COVER_ART_ARCHIVE_BASE, DEFAULT_MAX_BODY_BYTES, MUSICBRAINZ_API_BASE,
    WIKIDATA_ENTITY_DATA_BASE, WIKIPEDIA_REST_BASE,
};
use anyhow::{anyhow, bail, Result};
use byte_unit::Byte;
use clap::ValueEnum;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = concat!("musify-server/", env!("CARGO_PKG_VERSION"));

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub user_agent: Option<String>,
    pub upstream_timeout_sec: u64,
    pub profile_timeout_sec: u64,
    pub max_response_body: Option<String>,
    pub max_redirects: usize,
    pub album_concurrency: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            metrics_port: 9091,
            logging_level: RequestsLoggingLevel::Path,
            user_agent: None,
            upstream_timeout_sec: 30,
            profile_timeout_sec: 120,
            max_response_body: None,
            max_redirects: 10,
            album_concurrency: DEFAULT_ALBUM_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub user_agent: String,
    pub upstream_timeout_sec: u64,
    pub profile_timeout_sec: u64,
    /// Response body cap in bytes.
    pub max_response_body: u64,
    pub max_redirects: usize,
    pub album_concurrency: usize,

    // Tables (with defaults)
    pub upstream: UpstreamSettings,
    pub retry: RetrySettings,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamSettings {
    pub musicbrainz_url: String,
    pub wikidata_url: String,
    pub wikipedia_url: String,
    pub coverart_url: String,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            musicbrainz_url: MUSICBRAINZ_API_BASE.to_string(),
            wikidata_url: WIKIDATA_ENTITY_DATA_BASE.to_string(),
            wikipedia_url: WIKIPEDIA_REST_BASE.to_string(),
            coverart_url: COVER_ART_ARCHIVE_BASE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub max_backoff_ms: u64,
    pub retry_status: u16,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 1000,
            backoff_multiplier: 2.0,
            max_backoff_ms: 60_000,
            retry_status: 400,
        }
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port && port != 0 {
            bail!("port and metrics_port must differ (both are {})", port);
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let user_agent = file
            .user_agent
            .or_else(|| cli.user_agent.clone())
            .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string());
        if user_agent.trim().is_empty() {
            bail!("user_agent must not be empty");
        }

        let upstream_timeout_sec = file
            .upstream_timeout_sec
            .unwrap_or(cli.upstream_timeout_sec);
        if upstream_timeout_sec == 0 {
            bail!("upstream_timeout_sec must be greater than 0");
        }
        let profile_timeout_sec = file.profile_timeout_sec.unwrap_or(cli.profile_timeout_sec);
        if profile_timeout_sec == 0 {
            bail!("profile_timeout_sec must be greater than 0");
        }

        let max_response_body = match file
            .max_response_body
            .or_else(|| cli.max_response_body.clone())
        {
            Some(size) => parse_body_size(&size)?,
            None => DEFAULT_MAX_BODY_BYTES,
        };
        if max_response_body < DEFAULT_MAX_BODY_BYTES {
            bail!(
                "max_response_body must be at least {:#}, got {:#}",
                Byte::from_u64(DEFAULT_MAX_BODY_BYTES),
                Byte::from_u64(max_response_body)
            );
        }

        let max_redirects = file.max_redirects.unwrap_or(cli.max_redirects);
        if max_redirects == 0 {
            bail!("max_redirects must be greater than 0, redirects are always followed");
        }

        let album_concurrency = file.album_concurrency.unwrap_or(cli.album_concurrency);
        if album_concurrency == 0 {
            bail!("album_concurrency must be at least 1");
        }

        // Upstream base URLs - merge file config with defaults
        let upstream_file = file.upstream.unwrap_or_default();
        let defaults = UpstreamSettings::default();
        let upstream = UpstreamSettings {
            musicbrainz_url: base_url(upstream_file.musicbrainz_url, defaults.musicbrainz_url),
            wikidata_url: base_url(upstream_file.wikidata_url, defaults.wikidata_url),
            wikipedia_url: base_url(upstream_file.wikipedia_url, defaults.wikipedia_url),
            coverart_url: base_url(upstream_file.coverart_url, defaults.coverart_url),
        };

        let retry_file = file.retry.unwrap_or_default();
        let retry_defaults = RetrySettings::default();
        let retry = RetrySettings {
            max_retries: retry_file.max_retries.unwrap_or(retry_defaults.max_retries),
            initial_backoff_ms: retry_file
                .initial_backoff_ms
                .unwrap_or(retry_defaults.initial_backoff_ms),
            backoff_multiplier: retry_file
                .backoff_multiplier
                .unwrap_or(retry_defaults.backoff_multiplier),
            max_backoff_ms: retry_file
                .max_backoff_ms
                .unwrap_or(retry_defaults.max_backoff_ms),
            retry_status: retry_file
                .retry_status
                .unwrap_or(retry_defaults.retry_status),
        };
        if !retry.backoff_multiplier.is_finite() || retry.backoff_multiplier < 1.0 {
            bail!(
                "retry.backoff_multiplier must be a finite value of at least 1.0, got {}",
                retry.backoff_multiplier
            );
        }

        Ok(Self {
            port,
            metrics_port,
            logging_level,
            user_agent,
            upstream_timeout_sec,
            profile_timeout_sec,
            max_response_body,
            max_redirects,
            album_concurrency,
            upstream,
            retry,
        })
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.upstream_timeout_sec),
            max_redirects: self.max_redirects,
            max_body_bytes: self.max_response_body,
        }
    }

    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            requests_logging_level: self.logging_level.clone(),
            port: self.port,
            metrics_port: self.metrics_port,
            profile_timeout: Duration::from_secs(self.profile_timeout_sec),
        }
    }
}

/// Trailing slashes are stripped so adapters can append paths directly.
fn base_url(configured: Option<String>, default: String) -> String {
    configured
        .map(|url| url.trim_end_matches('/').to_string())
        .unwrap_or(default)
}

fn parse_body_size(s: &str) -> Result<u64> {
    Byte::parse_str(s, true)
        .map(|size| size.as_u64())
        .map_err(|err| anyhow!("Invalid max_response_body '{}': {}", s, err))
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
