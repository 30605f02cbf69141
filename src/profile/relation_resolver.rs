use super::Relation;

/// Relation type MusicBrainz uses for links to Wikidata entities.
pub const WIKIDATA_RELATION_TYPE: &str = "wikidata";

/// Returns the trailing path segment of the first relation tagged
/// `relation_type`, or `None` if there is no such relation.
pub fn resolve_relation_target(relations: &[Relation], relation_type: &str) -> Option<String> {
    relations
        .iter()
        .find(|rel| rel.relation_type == relation_type)
        .map(|rel| trailing_segment(&rel.target_url).to_string())
}

/// Resolves the Wikidata entity id (e.g. "Q42") an artist links to.
pub fn resolve_knowledge_graph_id(relations: &[Relation]) -> Option<String> {
    resolve_relation_target(relations, WIKIDATA_RELATION_TYPE)
}

/// Text after the last '/', or the whole string when there is none.
fn trailing_segment(url: &str) -> &str {
    match url.rfind('/') {
        Some(idx) => &url[idx + 1..],
        None => url,
    }
}
