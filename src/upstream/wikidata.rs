//! Wikidata client for knowledge-graph entities.
//!
//! `Special:EntityData/{id}.json` wraps the entity in an envelope:
//! `{"entities": {"Q42": {...}}}`. The entity is unwrapped before decoding.

use super::{FetchError, HttpTransport, KnowledgeGraphSource};
use crate::profile::{KnowledgeGraphEntity, SiteLink};
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;

pub const WIKIDATA_ENTITY_DATA_BASE: &str = "https://www.wikidata.org/wiki/Special:EntityData";

pub struct WikidataClient {
    transport: HttpTransport,
    base_url: String,
}

#[derive(Deserialize)]
struct EntityEnvelope {
    entities: HashMap<String, serde_json::Value>,
}

#[derive(Deserialize)]
struct WikidataEntity {
    #[serde(default)]
    pageid: u64,
    title: String,
    #[serde(default)]
    sitelinks: HashMap<String, WikidataSiteLink>,
}

#[derive(Deserialize)]
struct WikidataSiteLink {
    site: String,
    title: String,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    badges: Vec<String>,
}

impl From<WikidataEntity> for KnowledgeGraphEntity {
    fn from(entity: WikidataEntity) -> Self {
        let sitelinks = entity
            .sitelinks
            .into_iter()
            .map(|(key, link)| {
                (
                    key,
                    SiteLink {
                        site: link.site,
                        title: link.title,
                        url: link.url,
                        badges: link.badges,
                    },
                )
            })
            .collect();

        KnowledgeGraphEntity {
            page_id: entity.pageid,
            title: entity.title,
            sitelinks,
        }
    }
}

/// Pulls the entity keyed by `entity_id` out of its envelope.
fn unwrap_entity(
    mut envelope: EntityEnvelope,
    entity_id: &str,
) -> Result<KnowledgeGraphEntity, FetchError> {
    let raw = envelope.entities.remove(entity_id).ok_or_else(|| {
        FetchError::Decode(format!("entity {} missing from response envelope", entity_id))
    })?;

    let entity: WikidataEntity = serde_json::from_value(raw)
        .map_err(|e| FetchError::Decode(format!("entity {}: {}", entity_id, e)))?;

    Ok(entity.into())
}

impl WikidataClient {
    pub fn new(transport: HttpTransport, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            transport,
            base_url,
        }
    }

    fn entity_url(&self, entity_id: &str) -> String {
        format!("{}/{}.json", self.base_url, urlencoding::encode(entity_id))
    }
}

#[async_trait]
impl KnowledgeGraphSource for WikidataClient {
    async fn fetch_entity(&self, entity_id: &str) -> Result<KnowledgeGraphEntity, FetchError> {
        let envelope: EntityEnvelope = self
            .transport
            .get_json("wikidata", &self.entity_url(entity_id))
            .await?;
        unwrap_entity(envelope, entity_id)
    }
}
