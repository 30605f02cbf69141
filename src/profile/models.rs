//! Domain types flowing through the artist profile pipeline.
//!
//! These are the shapes the orchestrator works with. The upstream adapters
//! decode their own wire DTOs and convert into these, so a change in an
//! upstream payload stays inside its adapter.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Canonical artist record from the metadata service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArtistMetadata {
    pub name: String,
    pub gender: Option<String>,
    pub country: Option<String>,
    pub disambiguation: Option<String>,
    pub relations: Vec<Relation>,
    pub release_groups: Vec<ReleaseGroupRef>,
}

/// A typed edge from an artist to an external resource.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relation {
    pub relation_type: String,
    pub target_url: String,
}

impl Relation {
    pub fn new(relation_type: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            relation_type: relation_type.into(),
            target_url: target_url.into(),
        }
    }
}

/// Input-side stub of an album, enriched into an [`Album`] by the fan-out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReleaseGroupRef {
    pub id: String,
    pub title: String,
}

impl ReleaseGroupRef {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KnowledgeGraphEntity {
    pub page_id: u64,
    pub title: String,
    /// Keyed by site id, e.g. "enwiki".
    pub sitelinks: HashMap<String, SiteLink>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiteLink {
    pub site: String,
    pub title: String,
    pub url: Option<String>,
    pub badges: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncyclopediaSummary {
    pub title: String,
    pub extract_html: String,
}

/// Images are kept in the order the cover-art service returned them.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CoverArt {
    pub images: Vec<CoverImage>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CoverImage {
    pub image_url: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Album {
    pub id: String,
    pub title: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// The denormalized response served to clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistProfile {
    pub mbid: String,
    pub name: String,
    pub gender: Option<String>,
    pub country: Option<String>,
    pub disambiguation: Option<String>,
    pub description: String,
    pub albums: Vec<Album>,
}

impl ArtistProfile {
    /// Merges the scalar artist fields, the encyclopedia extract and the
    /// resolved albums.
    pub fn merge(
        mbid: &str,
        metadata: ArtistMetadata,
        summary: EncyclopediaSummary,
        albums: Vec<Album>,
    ) -> Self {
        Self {
            mbid: mbid.to_string(),
            name: metadata.name,
            gender: metadata.gender,
            country: metadata.country,
            disambiguation: metadata.disambiguation,
            description: summary.extract_html,
            albums,
        }
    }
}
