//! Cover Art Archive client.
//!
//! The archive answers release-group lookups with a redirect to the backing
//! storage, so the shared transport must follow redirects.

use super::{CoverArtSource, FetchError, HttpTransport};
use crate::profile::{CoverArt, CoverImage};
use async_trait::async_trait;
use serde::Deserialize;

pub const COVER_ART_ARCHIVE_BASE: &str = "http://coverartarchive.org";

pub struct CoverArtArchiveClient {
    transport: HttpTransport,
    base_url: String,
}

#[derive(Deserialize)]
struct CaaResponse {
    #[serde(default)]
    images: Vec<CaaImage>,
}

#[derive(Deserialize)]
struct CaaImage {
    image: String,
}

impl CoverArtArchiveClient {
    pub fn new(transport: HttpTransport, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
        }
    }

    fn release_group_url(&self, release_group_id: &str) -> String {
        format!(
            "{}/release-group/{}",
            self.base_url,
            urlencoding::encode(release_group_id)
        )
    }
}

#[async_trait]
impl CoverArtSource for CoverArtArchiveClient {
    async fn fetch_cover_art(&self, release_group_id: &str) -> Result<CoverArt, FetchError> {
        let response: CaaResponse = self
            .transport
            .get_json("coverart", &self.release_group_url(release_group_id))
            .await?;

        Ok(CoverArt {
            images: response
                .images
                .into_iter()
                .map(|image| CoverImage {
                    image_url: image.image,
                })
                .collect(),
        })
    }
}
