//! Artist profile aggregation: models, relation resolution, album fan-out
//! and the orchestrator tying the upstream stages together.

mod album_fanout;
mod models;
mod orchestrator;
mod relation_resolver;

pub use album_fanout::{album_from_cover_art, AlbumFanout, DEFAULT_ALBUM_CONCURRENCY};
pub use models::{
    Album, ArtistMetadata, ArtistProfile, CoverArt, CoverImage, EncyclopediaSummary,
    KnowledgeGraphEntity, Relation, ReleaseGroupRef, SiteLink,
};
pub use orchestrator::{ProfileError, ProfileOrchestrator, Stage, ENWIKI_SITE_KEY};
pub use relation_resolver::{
    resolve_knowledge_graph_id, resolve_relation_target, WIKIDATA_RELATION_TYPE,
};
