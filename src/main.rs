use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use musify_server::config::{AppConfig, CliConfig, FileConfig};
use musify_server::profile::ProfileOrchestrator;
use musify_server::server::{self, run_server, RequestsLoggingLevel};

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    if path_buf.is_absolute() {
        return Ok(path_buf);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path_buf))
}

#[derive(Parser, Debug)]
#[command(version, about = "Aggregates artist profiles from public music metadata services")]
struct CliArgs {
    /// Path to a TOML config file. Values set there override CLI flags.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// The port to listen on.
    #[clap(short, long, default_value_t = 8080)]
    pub port: u16,

    /// The port for the metrics server (Prometheus scraping).
    #[clap(long, default_value_t = 9091)]
    pub metrics_port: u16,

    /// The level of logging to perform on each request.
    #[clap(long, default_value = "path")]
    pub logging_level: RequestsLoggingLevel,

    /// User-Agent sent to upstream services. MusicBrainz asks for contact info.
    #[clap(long)]
    pub user_agent: Option<String>,

    /// Timeout in seconds for each upstream call.
    #[clap(long, default_value_t = 30)]
    pub upstream_timeout_sec: u64,

    /// Deadline in seconds for assembling one artist profile.
    #[clap(long, default_value_t = 120)]
    pub profile_timeout_sec: u64,

    /// Maximum upstream response body size, e.g. "32 MiB". At least 16 MiB.
    #[clap(long)]
    pub max_response_body: Option<String>,

    /// Maximum number of redirects followed per upstream call.
    #[clap(long, default_value_t = 10)]
    pub max_redirects: usize,

    /// Maximum number of concurrent cover art lookups per profile.
    #[clap(long, default_value_t = 16)]
    pub album_concurrency: usize,
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        CliConfig {
            port: self.port,
            metrics_port: self.metrics_port,
            logging_level: self.logging_level.clone(),
            user_agent: self.user_agent.clone(),
            upstream_timeout_sec: self.upstream_timeout_sec,
            profile_timeout_sec: self.profile_timeout_sec,
            max_response_body: self.max_response_body.clone(),
            max_redirects: self.max_redirects,
            album_concurrency: self.album_concurrency,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let app_config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    info!("Initializing metrics...");
    server::metrics::init_metrics();

    info!(
        "Upstreams: musicbrainz={} wikidata={} wikipedia={} coverart={}",
        app_config.upstream.musicbrainz_url,
        app_config.upstream.wikidata_url,
        app_config.upstream.wikipedia_url,
        app_config.upstream.coverart_url
    );
    let orchestrator = Arc::new(ProfileOrchestrator::from_config(&app_config)?);

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Shutdown requested"),
            Err(err) => warn!("Failed to listen for ctrl-c: {}", err),
        }
        signal_token.cancel();
    });

    run_server(app_config.server_config(), orchestrator, shutdown).await
}
