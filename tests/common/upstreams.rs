//! Stub upstream services
//!
//! One axum app serving all four upstreams under their own prefix:
//! `/ws/2`, `/wikidata`, `/wikipedia` and `/coverart`. Every request is
//! counted by path so tests can assert on retries and skipped stages.

use super::constants::*;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

#[derive(Clone, Default)]
struct Hits(Arc<Mutex<HashMap<String, usize>>>);

impl Hits {
    /// Records a hit and returns how many times `path` has been hit so far.
    fn record(&self, path: String) -> usize {
        let mut hits = self.0.lock().unwrap();
        let count = hits.entry(path).or_insert(0);
        *count += 1;
        *count
    }

    fn get(&self, path: &str) -> usize {
        self.0.lock().unwrap().get(path).copied().unwrap_or(0)
    }
}

pub struct StubUpstreams {
    pub base_url: String,
    hits: Hits,
    _shutdown_tx: tokio::sync::oneshot::Sender<()>,
}

impl StubUpstreams {
    pub async fn spawn() -> Self {
        let hits = Hits::default();
        let app = Router::new()
            .route("/ws/2/artist/{mbid}", get(artist))
            .route("/wikidata/{file}", get(entity))
            .route("/wikipedia/page/summary/{title}", get(page_summary))
            .route("/coverart/release-group/{id}", get(release_group))
            .route("/coverart/storage/{id}", get(stored_cover_art))
            .with_state(hits.clone());

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind stub upstreams");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Stub upstreams failed");
        });

        Self {
            base_url: format!("http://127.0.0.1:{}", port),
            hits,
            _shutdown_tx: shutdown_tx,
        }
    }

    pub fn musicbrainz_url(&self) -> String {
        format!("{}/ws/2", self.base_url)
    }

    pub fn wikidata_url(&self) -> String {
        format!("{}/wikidata", self.base_url)
    }

    pub fn wikipedia_url(&self) -> String {
        format!("{}/wikipedia", self.base_url)
    }

    pub fn coverart_url(&self) -> String {
        format!("{}/coverart", self.base_url)
    }

    pub fn artist_hits(&self, mbid: &str) -> usize {
        self.hits.get(&format!("artist/{}", mbid))
    }

    pub fn entity_hits(&self) -> usize {
        self.hits
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|(path, _)| path.starts_with("wikidata/"))
            .map(|(_, count)| count)
            .sum()
    }

    pub fn summary_hits(&self) -> usize {
        self.hits
            .0
            .lock()
            .unwrap()
            .iter()
            .filter(|(path, _)| path.starts_with("wikipedia/"))
            .map(|(_, count)| count)
            .sum()
    }

    pub fn release_group_hits(&self, id: &str) -> usize {
        self.hits.get(&format!("release-group/{}", id))
    }
}

fn artist_json(name: &str, entity_id: Option<&str>, release_groups: Value) -> Value {
    let mut relations = vec![json!({
        "type": "official homepage",
        "url": {"resource": "https://example.com/"}
    })];
    if let Some(entity_id) = entity_id {
        relations.push(json!({
            "type": "wikidata",
            "url": {"resource": format!("https://www.wikidata.org/wiki/{}", entity_id)}
        }));
    }
    json!({
        "id": "ignored",
        "name": name,
        "gender": "Male",
        "country": "GB",
        "disambiguation": "English author",
        "relations": relations,
        "release-groups": release_groups,
    })
}

fn ok_release_groups() -> Value {
    json!([
        {"id": RG_TWO_IMAGES_ID, "title": "The Hitchhiker's Guide"},
        {"id": RG_REDIRECTED_ID, "title": "Last Chance to See"},
        {"id": RG_EMPTY_ID, "title": "Empty Sleeve"},
        {"id": RG_MISSING_ID, "title": "Lost Tapes"},
    ])
}

async fn artist(State(hits): State<Hits>, Path(mbid): Path<String>) -> Response {
    let count = hits.record(format!("artist/{}", mbid));

    let body = match mbid.as_str() {
        ARTIST_OK_ID => artist_json(ARTIST_OK_NAME, Some("Q42"), ok_release_groups()),
        ARTIST_NO_WIKIDATA_ID => artist_json("Nobody", None, json!([])),
        ARTIST_FLAKY_ID if count <= 3 => {
            return (StatusCode::BAD_REQUEST, BAD_REQUEST_BODY).into_response()
        }
        ARTIST_FLAKY_ID => artist_json(ARTIST_OK_NAME, Some("Q42"), json!([])),
        ARTIST_ALWAYS_400_ID => {
            return (StatusCode::BAD_REQUEST, BAD_REQUEST_BODY).into_response()
        }
        ARTIST_NO_ENWIKI_ID => artist_json("Dieter", Some("Q-no-enwiki"), json!([])),
        ARTIST_BROKEN_ENTITY_ID => artist_json("Broken", Some("Q-broken"), json!([])),
        ARTIST_NO_SUMMARY_ID => artist_json("Obscure", Some("Q-no-summary"), json!([])),
        _ => return (StatusCode::NOT_FOUND, UNKNOWN_ARTIST_BODY).into_response(),
    };
    Json(body).into_response()
}

fn entity_json(entity_id: &str, sitelinks: Value) -> Value {
    json!({
        "entities": {
            entity_id: {
                "pageid": 138,
                "title": entity_id,
                "sitelinks": sitelinks,
            }
        }
    })
}

async fn entity(State(hits): State<Hits>, Path(file): Path<String>) -> Response {
    hits.record(format!("wikidata/{}", file));

    let entity_id = file.trim_end_matches(".json");
    let body = match entity_id {
        "Q42" => entity_json(
            "Q42",
            json!({
                "dewiki": {"site": "dewiki", "title": "Douglas Adams (Autor)", "badges": []},
                "enwiki": {
                    "site": "enwiki",
                    "title": "Douglas Adams",
                    "url": "https://en.wikipedia.org/wiki/Douglas_Adams",
                    "badges": []
                },
            }),
        ),
        "Q-no-enwiki" => entity_json(
            "Q-no-enwiki",
            json!({"dewiki": {"site": "dewiki", "title": "Dieter", "badges": []}}),
        ),
        "Q-broken" => entity_json("Q-something-else", json!({})),
        "Q-no-summary" => entity_json(
            "Q-no-summary",
            json!({"enwiki": {"site": "enwiki", "title": "Obscure (musician)", "badges": []}}),
        ),
        _ => return StatusCode::NOT_FOUND.into_response(),
    };
    Json(body).into_response()
}

async fn page_summary(State(hits): State<Hits>, Path(title): Path<String>) -> Response {
    hits.record(format!("wikipedia/{}", title));

    match title.as_str() {
        "Douglas Adams" => Json(json!({
            "title": "Douglas Adams",
            "extract": "Douglas Adams was an English author.",
            "extract_html": ARTIST_OK_DESCRIPTION,
        }))
        .into_response(),
        _ => (
            StatusCode::NOT_FOUND,
            "{\"type\":\"https://mediawiki.org/wiki/HyperSwitch/errors/not_found\"}",
        )
            .into_response(),
    }
}

fn images(urls: &[&str]) -> Value {
    let images: Vec<Value> = urls.iter().map(|url| json!({"image": url})).collect();
    json!({ "images": images })
}

async fn release_group(State(hits): State<Hits>, Path(id): Path<String>) -> Response {
    hits.record(format!("release-group/{}", id));

    match id.as_str() {
        RG_TWO_IMAGES_ID => Json(images(&[
            "http://img.example/two-front.jpg",
            "http://img.example/two-back.jpg",
        ]))
        .into_response(),
        RG_REDIRECTED_ID => {
            Redirect::temporary(&format!("/coverart/storage/{}", id)).into_response()
        }
        RG_EMPTY_ID => Json(images(&[])).into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn stored_cover_art(Path(id): Path<String>) -> Response {
    let urls: Vec<String> = (1..=3)
        .map(|n| format!("http://img.example/{}-{}.jpg", id, n))
        .collect();
    let urls: Vec<&str> = urls.iter().map(String::as_str).collect();
    Json(images(&urls)).into_response()
}
