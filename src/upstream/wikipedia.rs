//! Wikipedia REST client for page summaries.

use super::{EncyclopediaSource, FetchError, HttpTransport};
use crate::profile::EncyclopediaSummary;
use async_trait::async_trait;
use serde::Deserialize;

pub const WIKIPEDIA_REST_BASE: &str = "https://en.wikipedia.org/api/rest_v1";

pub struct WikipediaClient {
    transport: HttpTransport,
    base_url: String,
}

#[derive(Deserialize)]
struct PageSummary {
    title: String,
    #[serde(default)]
    extract_html: String,
}

impl WikipediaClient {
    pub fn new(transport: HttpTransport, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
        }
    }

    /// Titles can contain spaces, slashes and punctuation, so the whole title
    /// is percent-encoded into a single path segment.
    fn summary_url(&self, title: &str) -> String {
        format!(
            "{}/page/summary/{}",
            self.base_url,
            urlencoding::encode(title)
        )
    }
}

#[async_trait]
impl EncyclopediaSource for WikipediaClient {
    async fn fetch_summary(&self, title: &str) -> Result<EncyclopediaSummary, FetchError> {
        let summary: PageSummary = self
            .transport
            .get_json("wikipedia", &self.summary_url(title))
            .await?;

        Ok(EncyclopediaSummary {
            title: summary.title,
            extract_html: summary.extract_html,
        })
    }
}
