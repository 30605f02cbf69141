//! Concurrent cover-art resolution for an artist's release groups.
//!
//! One fetch per release group, at most `concurrency` in flight. A release
//! group whose fetch fails or returns no images is dropped; it never fails
//! the batch. Results come back in completion order.

use super::{Album, CoverArt, ReleaseGroupRef};
use crate::server::metrics::record_album_dropped;
use crate::upstream::CoverArtSource;
use futures::{future, stream, StreamExt};
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_ALBUM_CONCURRENCY: usize = 16;

pub struct AlbumFanout {
    cover_art: Arc<dyn CoverArtSource>,
    concurrency: usize,
}

/// Builds the album for `group` from the last image of its cover art.
pub fn album_from_cover_art(group: &ReleaseGroupRef, cover_art: &CoverArt) -> Option<Album> {
    cover_art.images.last().map(|image| Album {
        id: group.id.clone(),
        title: group.title.clone(),
        image_url: image.image_url.clone(),
    })
}

impl AlbumFanout {
    pub fn new(cover_art: Arc<dyn CoverArtSource>, concurrency: usize) -> Self {
        Self {
            cover_art,
            concurrency: concurrency.max(1),
        }
    }

    pub fn concurrency(&self) -> usize {
        self.concurrency
    }

    /// Resolves every release group it can. Dropping the returned future
    /// cancels all fetches still in flight.
    pub async fn fetch_albums(&self, release_groups: &[ReleaseGroupRef]) -> Vec<Album> {
        // Collected first so the returned future stays Send.
        let fetches: Vec<_> = release_groups
            .iter()
            .map(|group| self.fetch_album(group))
            .collect();
        let albums: Vec<Album> = stream::iter(fetches)
            .buffer_unordered(self.concurrency)
            .filter_map(future::ready)
            .collect()
            .await;

        debug!(
            "Resolved {} of {} release groups",
            albums.len(),
            release_groups.len()
        );
        albums
    }

    async fn fetch_album(&self, group: &ReleaseGroupRef) -> Option<Album> {
        match self.cover_art.fetch_cover_art(&group.id).await {
            Ok(cover_art) => {
                let album = album_from_cover_art(group, &cover_art);
                if album.is_none() {
                    warn!("Release group {} has no cover images, skipping", group.id);
                    record_album_dropped("no_images");
                }
                album
            }
            Err(err) => {
                warn!(
                    "Cover art for release group {} unavailable: {}",
                    group.id, err
                );
                record_album_dropped(err.kind());
                None
            }
        }
    }
}
