//! `GET /musify/music-artist/details/{id}`

use super::metrics::record_profile_failure;
use super::state::ServerState;
use crate::profile::ProfileError;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

impl IntoResponse for ProfileError {
    /// Upstream failures are passed through with the upstream status and
    /// body. Everything else is an internal error.
    fn into_response(self) -> Response {
        if let Some((status, body)) = self.upstream_response() {
            let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            return (status, body.to_string()).into_response();
        }
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

async fn get_artist_details(State(state): State<ServerState>, Path(id): Path<String>) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("artist_details", %request_id, mbid = %id);

    async move {
        match state
            .orchestrator
            .get_artist_profile_within(&id, state.config.profile_timeout)
            .await
        {
            Ok(profile) => {
                info!(
                    "Assembled profile for '{}' with {} albums",
                    profile.name,
                    profile.albums.len()
                );
                Json(profile).into_response()
            }
            Err(err) => {
                warn!("Artist profile failed: {}", err);
                record_profile_failure(err.kind());
                err.into_response()
            }
        }
    }
    .instrument(span)
    .await
}

pub fn make_artist_routes(state: ServerState) -> Router {
    Router::new()
        .route("/details/{id}", get(get_artist_details))
        .with_state(state)
}
