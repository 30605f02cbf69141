//! Builds an [`ArtistProfile`] out of the four upstream services.
//!
//! Stages run as follows, failing fast everywhere except album resolution:
//!
//! 1. fetch artist metadata (with retry)
//! 2. resolve the Wikidata relation
//! 3. fetch the Wikidata entity and pick the English Wikipedia sitelink
//! 4. fetch the Wikipedia summary, concurrently with the album fan-out
//! 5. merge

use super::album_fanout::AlbumFanout;
use super::relation_resolver::resolve_knowledge_graph_id;
use super::ArtistProfile;
use crate::config::AppConfig;
use crate::upstream::{
    ArtistMetadataSource, CoverArtArchiveClient, CoverArtSource, EncyclopediaSource, FetchError,
    HttpTransport, KnowledgeGraphSource, MusicBrainzClient, RetryPolicy,
    RetryingArtistMetadataSource, WikidataClient, WikipediaClient,
};
use anyhow::Result;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Sitelink key of the English Wikipedia.
pub const ENWIKI_SITE_KEY: &str = "enwiki";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    FetchingMetadata,
    ResolvingRelation,
    FetchingKnowledgeGraph,
    FetchingEncyclopedia,
    FetchingAlbums,
    Merging,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::FetchingMetadata => "fetching artist metadata",
            Stage::ResolvingRelation => "resolving wikidata relation",
            Stage::FetchingKnowledgeGraph => "fetching wikidata entity",
            Stage::FetchingEncyclopedia => "fetching wikipedia summary",
            Stage::FetchingAlbums => "fetching albums",
            Stage::Merging => "merging",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("{stage} failed: {source}")]
    Upstream {
        stage: Stage,
        #[source]
        source: FetchError,
    },

    #[error("artist {mbid} has no wikidata relation")]
    MissingRelation { mbid: String },

    #[error("wikidata entity {entity_id} has no '{site_key}' sitelink")]
    MissingSiteLink { entity_id: String, site_key: String },

    #[error("artist profile not assembled within {0:?}")]
    TimedOut(Duration),
}

impl ProfileError {
    /// Short label used for metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            ProfileError::Upstream { .. } => "upstream_failure",
            ProfileError::MissingRelation { .. } => "missing_relation",
            ProfileError::MissingSiteLink { .. } => "missing_site_link",
            ProfileError::TimedOut(_) => "timed_out",
        }
    }

    /// Status and body of the upstream response that caused the failure, if any.
    pub fn upstream_response(&self) -> Option<(u16, &str)> {
        match self {
            ProfileError::Upstream {
                source: FetchError::Upstream { status, body },
                ..
            } => Some((*status, body.as_str())),
            _ => None,
        }
    }

    fn upstream(stage: Stage) -> impl FnOnce(FetchError) -> ProfileError {
        move |source| ProfileError::Upstream { stage, source }
    }
}

pub struct ProfileOrchestrator {
    artists: Arc<dyn ArtistMetadataSource>,
    knowledge_graph: Arc<dyn KnowledgeGraphSource>,
    encyclopedia: Arc<dyn EncyclopediaSource>,
    albums: AlbumFanout,
    site_key: String,
}

impl ProfileOrchestrator {
    pub fn new(
        artists: Arc<dyn ArtistMetadataSource>,
        knowledge_graph: Arc<dyn KnowledgeGraphSource>,
        encyclopedia: Arc<dyn EncyclopediaSource>,
        cover_art: Arc<dyn CoverArtSource>,
        album_concurrency: usize,
    ) -> Self {
        Self {
            artists,
            knowledge_graph,
            encyclopedia,
            albums: AlbumFanout::new(cover_art, album_concurrency),
            site_key: ENWIKI_SITE_KEY.to_string(),
        }
    }

    /// Wires the real upstream clients around one shared transport. The
    /// MusicBrainz client is the only one wrapped in the retry policy.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.transport_settings())?;
        let upstream = &config.upstream;

        let musicbrainz = Arc::new(MusicBrainzClient::new(
            transport.clone(),
            upstream.musicbrainz_url.as_str(),
        ));
        let artists = Arc::new(RetryingArtistMetadataSource::new(
            musicbrainz,
            RetryPolicy::new(&config.retry),
        ));

        Ok(Self::new(
            artists,
            Arc::new(WikidataClient::new(
                transport.clone(),
                upstream.wikidata_url.as_str(),
            )),
            Arc::new(WikipediaClient::new(
                transport.clone(),
                upstream.wikipedia_url.as_str(),
            )),
            Arc::new(CoverArtArchiveClient::new(
                transport,
                upstream.coverart_url.as_str(),
            )),
            config.album_concurrency,
        ))
    }

    pub async fn get_artist_profile(&self, mbid: &str) -> Result<ArtistProfile, ProfileError> {
        debug!("{}", Stage::FetchingMetadata);
        let metadata = self
            .artists
            .fetch_artist(mbid)
            .await
            .map_err(ProfileError::upstream(Stage::FetchingMetadata))?;

        debug!("{}", Stage::ResolvingRelation);
        let entity_id = resolve_knowledge_graph_id(&metadata.relations).ok_or_else(|| {
            ProfileError::MissingRelation {
                mbid: mbid.to_string(),
            }
        })?;

        debug!("{} {}", Stage::FetchingKnowledgeGraph, entity_id);
        let entity = self
            .knowledge_graph
            .fetch_entity(&entity_id)
            .await
            .map_err(ProfileError::upstream(Stage::FetchingKnowledgeGraph))?;
        let Some(site_link) = entity.sitelinks.get(&self.site_key) else {
            return Err(ProfileError::MissingSiteLink {
                entity_id,
                site_key: self.site_key.clone(),
            });
        };

        debug!(
            "{} '{}' and {} for {} release groups",
            Stage::FetchingEncyclopedia,
            site_link.title,
            Stage::FetchingAlbums,
            metadata.release_groups.len()
        );
        // A summary failure returns immediately and drops the album fan-out.
        let (summary, albums) = tokio::try_join!(
            async {
                self.encyclopedia
                    .fetch_summary(&site_link.title)
                    .await
                    .map_err(ProfileError::upstream(Stage::FetchingEncyclopedia))
            },
            async {
                let albums = self.albums.fetch_albums(&metadata.release_groups).await;
                Ok::<_, ProfileError>(albums)
            },
        )?;

        debug!("{}", Stage::Merging);
        Ok(ArtistProfile::merge(mbid, metadata, summary, albums))
    }

    /// Like [`Self::get_artist_profile`], but gives up after `deadline`.
    /// Every upstream call still in flight is cancelled.
    pub async fn get_artist_profile_within(
        &self,
        mbid: &str,
        deadline: Duration,
    ) -> Result<ArtistProfile, ProfileError> {
        tokio::time::timeout(deadline, self.get_artist_profile(mbid))
            .await
            .map_err(|_| ProfileError::TimedOut(deadline))?
    }
}
