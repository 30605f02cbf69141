//! HTTP client for end-to-end tests
//!
//! When API routes change, update only this file.

use super::constants::*;
use reqwest::Response;
use std::time::Duration;

pub struct TestClient {
    pub client: reqwest::Client,
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    pub async fn get_home(&self) -> Response {
        self.client
            .get(format!("{}/", self.base_url))
            .send()
            .await
            .expect("Home request failed")
    }

    pub async fn get_artist_details(&self, mbid: &str) -> Response {
        self.client
            .get(format!(
                "{}/musify/music-artist/details/{}",
                self.base_url, mbid
            ))
            .send()
            .await
            .expect("Artist details request failed")
    }
}
