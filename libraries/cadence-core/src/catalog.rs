//! Catalog collaborator
//!
//! The catalog owns tracks. The player consumes it through this trait only:
//! it fetches the queue contents and issues best-effort writes for
//! recently-played timestamps and favorite flags.

use crate::error::{CoreError, Result};
use crate::types::{Track, TrackId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Track catalog consumed by the player
///
/// Implementations wrap whatever actually stores tracks (HTTP API, database).
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch the current track list in play order
    async fn fetch_tracks(&self) -> Result<Vec<Track>>;

    /// Record that a track was played at `timestamp`
    async fn update_track_recently_played(
        &self,
        id: TrackId,
        timestamp: DateTime<Utc>,
    ) -> Result<()>;

    /// Set the favorite flag of a track, returning the stored value
    async fn update_track_favorite(&self, id: TrackId, favorite: bool) -> Result<bool>;
}

/// In-memory catalog
///
/// Backs headless hosts and tests. Writes can be forced to fail to exercise
/// the player's best-effort paths.
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    tracks: Mutex<Vec<Track>>,
    recently_played: Mutex<HashMap<TrackId, DateTime<Utc>>>,
    fail_writes: AtomicBool,
}

impl MemoryCatalog {
    /// Create a catalog holding `tracks`
    pub fn new(tracks: Vec<Track>) -> Self {
        Self {
            tracks: Mutex::new(tracks),
            ..Self::default()
        }
    }

    /// Replace the stored tracks
    pub fn set_tracks(&self, tracks: Vec<Track>) {
        *lock(&self.tracks) = tracks;
    }

    /// Make every subsequent write fail (or succeed again)
    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Last recorded play time of a track
    pub fn recently_played(&self, id: TrackId) -> Option<DateTime<Utc>> {
        lock(&self.recently_played).get(&id).copied()
    }

    /// Ids with a recorded play time
    pub fn recently_played_ids(&self) -> Vec<TrackId> {
        let mut ids: Vec<TrackId> = lock(&self.recently_played).keys().copied().collect();
        ids.sort();
        ids
    }

    fn check_writable(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(CoreError::catalog("writes are disabled"));
        }
        Ok(())
    }
}

// A poisoned lock only means another test thread panicked mid-write; the
// data is still a plain Vec/HashMap.
fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn fetch_tracks(&self) -> Result<Vec<Track>> {
        Ok(lock(&self.tracks).clone())
    }

    async fn update_track_recently_played(
        &self,
        id: TrackId,
        timestamp: DateTime<Utc>,
    ) -> Result<()> {
        self.check_writable()?;

        if !lock(&self.tracks).iter().any(|t| t.id == id) {
            return Err(CoreError::TrackNotFound(id));
        }

        lock(&self.recently_played).insert(id, timestamp);
        tracing::debug!(track_id = %id, "Recorded recently played");
        Ok(())
    }

    async fn update_track_favorite(&self, id: TrackId, favorite: bool) -> Result<bool> {
        self.check_writable()?;

        let mut tracks = lock(&self.tracks);
        let track = tracks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(CoreError::TrackNotFound(id))?;
        track.favorite = favorite;
        Ok(track.favorite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new(vec![
            Track::new(TrackId::new(1), "/media/1.mp3", 10.0),
            Track::new(TrackId::new(2), "/media/2.mp3", 20.0),
        ])
    }

    #[tokio::test]
    async fn fetch_returns_tracks_in_order() {
        let tracks = catalog().fetch_tracks().await.unwrap();
        let ids: Vec<i64> = tracks.iter().map(|t| t.id.as_i64()).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[tokio::test]
    async fn records_recently_played() {
        let catalog = catalog();
        let now = Utc::now();

        catalog
            .update_track_recently_played(TrackId::new(2), now)
            .await
            .unwrap();

        assert_eq!(catalog.recently_played(TrackId::new(2)), Some(now));
        assert_eq!(catalog.recently_played_ids(), vec![TrackId::new(2)]);
    }

    #[tokio::test]
    async fn unknown_track_is_rejected() {
        let result = catalog()
            .update_track_recently_played(TrackId::new(99), Utc::now())
            .await;
        assert!(matches!(result, Err(CoreError::TrackNotFound(id)) if id == TrackId::new(99)));
    }

    #[tokio::test]
    async fn failing_writes_leave_data_untouched() {
        let catalog = catalog();
        catalog.set_fail_writes(true);

        assert!(catalog
            .update_track_favorite(TrackId::new(1), true)
            .await
            .is_err());

        catalog.set_fail_writes(false);
        let tracks = catalog.fetch_tracks().await.unwrap();
        assert!(!tracks[0].favorite);
    }

    #[tokio::test]
    async fn favorite_write_is_stored() {
        let catalog = catalog();
        assert!(catalog
            .update_track_favorite(TrackId::new(1), true)
            .await
            .unwrap());

        let tracks = catalog.fetch_tracks().await.unwrap();
        assert!(tracks[0].favorite);
    }
}
