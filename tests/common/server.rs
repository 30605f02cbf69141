//! Test server lifecycle management
//!
//! Spawns the full musify router against a set of stub upstreams. Each test
//! gets its own server and its own upstreams.

use super::constants::*;
use super::upstreams::StubUpstreams;
use musify_server::config::{AppConfig, CliConfig, FileConfig, RetryConfig, UpstreamConfig};
use musify_server::profile::ProfileOrchestrator;
use musify_server::server::{make_app, RequestsLoggingLevel};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

/// Test server instance wired to stub upstreams
///
/// When dropped, both the server and the upstreams shut down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The stub upstreams, for asserting on the calls they received
    pub upstreams: StubUpstreams,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port with default settings
    pub async fn spawn() -> Self {
        Self::spawn_with(|_| {}).await
    }

    /// Spawns a new test server, letting the caller adjust the file config
    /// before it is resolved. Upstream URLs and a 1ms retry backoff are
    /// already filled in.
    pub async fn spawn_with(customize: impl FnOnce(&mut FileConfig)) -> Self {
        let upstreams = StubUpstreams::spawn().await;

        let mut file_config = FileConfig {
            logging_level: Some("none".to_string()),
            upstream: Some(UpstreamConfig {
                musicbrainz_url: Some(upstreams.musicbrainz_url()),
                wikidata_url: Some(upstreams.wikidata_url()),
                wikipedia_url: Some(upstreams.wikipedia_url()),
                coverart_url: Some(upstreams.coverart_url()),
            }),
            retry: Some(RetryConfig {
                initial_backoff_ms: Some(1),
                ..Default::default()
            }),
            ..Default::default()
        };
        customize(&mut file_config);

        let cli = CliConfig {
            logging_level: RequestsLoggingLevel::None,
            ..Default::default()
        };
        let config =
            AppConfig::resolve(&cli, Some(file_config)).expect("Failed to resolve test config");
        let orchestrator = Arc::new(
            ProfileOrchestrator::from_config(&config).expect("Failed to build orchestrator"),
        );

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
        let app = make_app(config.server_config(), orchestrator);

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            upstreams,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the / endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
