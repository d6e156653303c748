//! JSON file catalog
//!
//! Tracks live in a JSON array on disk. The file is re-read on every fetch so
//! edits show up on `refresh`; favorite flags are written back to it.

use async_trait::async_trait;
use cadence_core::{Catalog, CoreError, MemoryCatalog, Result, Track, TrackId};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug)]
pub struct JsonCatalog {
    path: PathBuf,
    tracks: MemoryCatalog,
}

impl JsonCatalog {
    /// Open the catalog stored at `path`
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let tracks = read_tracks(&path).await?;
        info!(path = %path.display(), tracks = tracks.len(), "Loaded track catalog");

        Ok(Self {
            path,
            tracks: MemoryCatalog::new(tracks),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Play times recorded during this run
    pub fn recently_played(&self, id: TrackId) -> Option<DateTime<Utc>> {
        self.tracks.recently_played(id)
    }

    async fn write_tracks(&self, tracks: &[Track]) -> Result<()> {
        let json = serde_json::to_string_pretty(tracks)?;

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        debug!(path = %self.path.display(), "Wrote track catalog");
        Ok(())
    }
}

async fn read_tracks(path: &Path) -> Result<Vec<Track>> {
    let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
        CoreError::catalog(format!("cannot read {}: {}", path.display(), e))
    })?;

    let tracks: Vec<Track> = serde_json::from_str(&contents)?;
    Ok(tracks)
}

#[async_trait]
impl Catalog for JsonCatalog {
    async fn fetch_tracks(&self) -> Result<Vec<Track>> {
        let tracks = read_tracks(&self.path).await?;
        self.tracks.set_tracks(tracks.clone());
        Ok(tracks)
    }

    async fn update_track_recently_played(
        &self,
        id: TrackId,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        self.tracks.update_track_recently_played(id, timestamp).await
    }

    /// Writes the file first; memory only changes once the disk agrees
    async fn update_track_favorite(&self, id: TrackId, favorite: bool) -> Result<bool> {
        let mut tracks = self.tracks.fetch_tracks().await?;
        let track = tracks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(CoreError::TrackNotFound(id))?;
        track.favorite = favorite;

        self.write_tracks(&tracks).await?;
        self.tracks.set_tracks(tracks);
        Ok(favorite)
    }
}
