//! Clients for the four third-party services an artist profile is built from.
//!
//! - MusicBrainz: canonical artist metadata, relations and release groups
//! - Wikidata: knowledge-graph entity with per-site links
//! - Wikipedia: page summary used as the artist description
//! - Cover Art Archive: images for each release group
//!
//! Every client shares one [`HttpTransport`] and sits behind a trait so the
//! orchestrator can be driven by fakes in tests.

mod coverart;
mod musicbrainz;
mod retry;
mod transport;
mod wikidata;
mod wikipedia;


pub use coverart::{CoverArtArchiveClient, COVER_ART_ARCHIVE_BASE};
pub use musicbrainz::{MusicBrainzClient, MUSICBRAINZ_API_BASE};
pub use retry::{RetryPolicy, RetryingArtistMetadataSource};
pub use transport::{HttpTransport, TransportSettings, DEFAULT_MAX_BODY_BYTES};
pub use wikidata::{WikidataClient, WIKIDATA_ENTITY_DATA_BASE};
pub use wikipedia::{WikipediaClient, WIKIPEDIA_REST_BASE};

use crate::profile::{ArtistMetadata, CoverArt, EncyclopediaSummary, KnowledgeGraphEntity};
use async_trait::async_trait;
use thiserror::Error;

/// Errors produced by a single upstream call.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The upstream answered with a non-2xx status.
    #[error("upstream responded with status {status}")]
    Upstream { status: u16, body: String },

    #[error("could not decode upstream response: {0}")]
    Decode(String),

    #[error("response body exceeds the {limit} bytes limit")]
    BodyTooLarge { limit: u64 },

    #[error("transport error: {0}")]
    Transport(String),
}

impl FetchError {
    /// Status code reported by the upstream, if it produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Upstream { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            FetchError::Upstream { .. } => "upstream",
            FetchError::Decode(_) => "decode",
            FetchError::BodyTooLarge { .. } => "body_too_large",
            FetchError::Transport(_) => "transport",
        }
    }
}

/// Source of canonical artist metadata, keyed by MusicBrainz id.
#[async_trait]
pub trait ArtistMetadataSource: Send + Sync {
    async fn fetch_artist(&self, mbid: &str) -> Result<ArtistMetadata, FetchError>;
}

/// Source of knowledge-graph entities, keyed by entity id (e.g. "Q42").
#[async_trait]
pub trait KnowledgeGraphSource: Send + Sync {
    async fn fetch_entity(&self, entity_id: &str) -> Result<KnowledgeGraphEntity, FetchError>;
}

/// Source of encyclopedia page summaries, keyed by page title.
#[async_trait]
pub trait EncyclopediaSource: Send + Sync {
    async fn fetch_summary(&self, title: &str) -> Result<EncyclopediaSummary, FetchError>;
}

/// Source of cover art, keyed by release-group id.
#[async_trait]
pub trait CoverArtSource: Send + Sync {
    async fn fetch_cover_art(&self, release_group_id: &str) -> Result<CoverArt, FetchError>;
}
