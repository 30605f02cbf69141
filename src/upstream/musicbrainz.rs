//! MusicBrainz client for canonical artist metadata.

use super::{ArtistMetadataSource, FetchError, HttpTransport};
use crate::profile::{ArtistMetadata, Relation, ReleaseGroupRef};
use async_trait::async_trait;
use serde::Deserialize;

pub const MUSICBRAINZ_API_BASE: &str = "http://musicbrainz.org/ws/2";

pub struct MusicBrainzClient {
    transport: HttpTransport,
    base_url: String,
}

#[derive(Deserialize)]
struct MbArtist {
    name: String,
    #[serde(default)]
    gender: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    disambiguation: Option<String>,
    #[serde(default)]
    relations: Vec<MbRelation>,
    #[serde(rename = "release-groups", default)]
    release_groups: Vec<MbReleaseGroup>,
}

#[derive(Deserialize)]
struct MbRelation {
    #[serde(rename = "type")]
    relation_type: String,
    url: Option<MbUrl>,
}

#[derive(Deserialize)]
struct MbUrl {
    resource: Option<String>,
}

#[derive(Deserialize)]
struct MbReleaseGroup {
    id: String,
    #[serde(default)]
    title: String,
}

impl From<MbArtist> for ArtistMetadata {
    fn from(artist: MbArtist) -> Self {
        // Only url relations carry a target resource; anything else is
        // irrelevant to the profile.
        let relations = artist
            .relations
            .into_iter()
            .filter_map(|rel| {
                let resource = rel.url?.resource?;
                Some(Relation::new(rel.relation_type, resource))
            })
            .collect();

        let release_groups = artist
            .release_groups
            .into_iter()
            .map(|rg| ReleaseGroupRef::new(rg.id, rg.title))
            .collect();

        ArtistMetadata {
            name: artist.name,
            gender: artist.gender,
            country: artist.country,
            disambiguation: artist.disambiguation,
            relations,
            release_groups,
        }
    }
}

impl MusicBrainzClient {
    pub fn new(transport: HttpTransport, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
        }
    }

    fn artist_url(&self, mbid: &str) -> String {
        format!(
            "{}/artist/{}?fmt=json&inc=url-rels+release-groups",
            self.base_url,
            urlencoding::encode(mbid)
        )
    }
}

#[async_trait]
impl ArtistMetadataSource for MusicBrainzClient {
    async fn fetch_artist(&self, mbid: &str) -> Result<ArtistMetadata, FetchError> {
        let artist: MbArtist = self
            .transport
            .get_json("musicbrainz", &self.artist_url(mbid))
            .await?;
        Ok(artist.into())
    }
}
