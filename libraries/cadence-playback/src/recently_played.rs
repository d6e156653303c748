//! Recently-played side effect
//!
//! Entering `playing` records the track as recently played through the
//! catalog. The write runs as a detached tokio task so it never delays a
//! transition. Only one write is live at a time: starting another or leaving
//! `playing` aborts the pending one, and a write that completes after being
//! superseded has its result discarded.

use cadence_core::{Catalog, TrackId};
use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

struct PendingWrite {
    track_id: TrackId,
    handle: JoinHandle<()>,
}

/// Cancellable recently-played writer
pub struct RecentlyPlayedRecorder {
    catalog: Option<Arc<dyn Catalog>>,
    generation: Arc<AtomicU64>,
    pending: Option<PendingWrite>,
    last_recorded: Arc<Mutex<Option<TrackId>>>,
}

impl RecentlyPlayedRecorder {
    /// Recorder writing through `catalog`
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self::with_catalog(Some(catalog))
    }

    /// Recorder that never writes
    pub fn disabled() -> Self {
        Self::with_catalog(None)
    }

    fn with_catalog(catalog: Option<Arc<dyn Catalog>>) -> Self {
        Self {
            catalog,
            generation: Arc::new(AtomicU64::new(0)),
            pending: None,
            last_recorded: Arc::new(Mutex::new(None)),
        }
    }

    /// Whether a catalog is attached
    pub fn is_enabled(&self) -> bool {
        self.catalog.is_some()
    }

    /// Start recording `track_id`, superseding any pending write
    ///
    /// Requires a tokio runtime on the current thread; without one the write
    /// is skipped.
    pub fn start(&mut self, track_id: TrackId) {
        self.cancel();

        let Some(catalog) = self.catalog.clone() else {
            return;
        };

        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            debug!(%track_id, "No tokio runtime, skipping recently-played update");
            return;
        };

        let generation = Arc::clone(&self.generation);
        let spawned_at = generation.load(Ordering::SeqCst);
        let last_recorded = Arc::clone(&self.last_recorded);

        let handle = runtime.spawn(async move {
            let result = catalog
                .update_track_recently_played(track_id, Utc::now())
                .await;

            if generation.load(Ordering::SeqCst) != spawned_at {
                debug!(%track_id, "Discarding superseded recently-played result");
                return;
            }

            match result {
                Ok(()) => {
                    *last_recorded
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner) = Some(track_id);
                    debug!(%track_id, "Recently played updated");
                }
                Err(e) => {
                    warn!(%track_id, "Failed to update recently played: {}", e);
                }
            }
        });

        self.pending = Some(PendingWrite { track_id, handle });
    }

    /// Abort the pending write, if any
    pub fn cancel(&mut self) {
        self.generation.fetch_add(1, Ordering::SeqCst);

        if let Some(pending) = self.pending.take() {
            if !pending.handle.is_finished() {
                debug!(track_id = %pending.track_id, "Cancelling recently-played update");
            }
            pending.handle.abort();
        }
    }

    /// Track whose write is still running
    pub fn pending_track(&self) -> Option<TrackId> {
        self.pending
            .as_ref()
            .filter(|p| !p.handle.is_finished())
            .map(|p| p.track_id)
    }

    /// Track of the last write that completed without being superseded
    pub fn last_recorded(&self) -> Option<TrackId> {
        *self
            .last_recorded
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for RecentlyPlayedRecorder {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for RecentlyPlayedRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecentlyPlayedRecorder")
            .field("enabled", &self.is_enabled())
            .field("pending_track", &self.pending.as_ref().map(|p| p.track_id))
            .field("last_recorded", &self.last_recorded())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cadence_core::{CoreError, MemoryCatalog, Track};
    use chrono::DateTime;
    use std::time::Duration;

    fn catalog() -> Arc<MemoryCatalog> {
        Arc::new(MemoryCatalog::new(vec![
            Track::new(TrackId::new(1), "/media/1.mp3", 10.0),
            Track::new(TrackId::new(2), "/media/2.mp3", 20.0),
        ]))
    }

    /// Catalog whose writes take a while to land
    struct SlowCatalog {
        inner: Arc<MemoryCatalog>,
        delay: Duration,
    }

    #[async_trait]
    impl Catalog for SlowCatalog {
        async fn fetch_tracks(&self) -> cadence_core::Result<Vec<Track>> {
            self.inner.fetch_tracks().await
        }

        async fn update_track_recently_played(
            &self,
            id: TrackId,
            timestamp: DateTime<Utc>,
        ) -> cadence_core::Result<()> {
            tokio::time::sleep(self.delay).await;
            self.inner.update_track_recently_played(id, timestamp).await
        }

        async fn update_track_favorite(
            &self,
            _id: TrackId,
            _favorite: bool,
        ) -> cadence_core::Result<bool> {
            Err(CoreError::catalog("unsupported"))
        }
    }

    #[tokio::test]
    async fn records_track() {
        let catalog = catalog();
        let mut recorder = RecentlyPlayedRecorder::new(catalog.clone());

        recorder.start(TrackId::new(1));
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(recorder.last_recorded(), Some(TrackId::new(1)));
        assert!(catalog.recently_played(TrackId::new(1)).is_some());
        assert_eq!(recorder.pending_track(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn superseded_write_is_aborted() {
        let inner = catalog();
        let slow = Arc::new(SlowCatalog {
            inner: inner.clone(),
            delay: Duration::from_millis(100),
        });
        let mut recorder = RecentlyPlayedRecorder::new(slow);

        recorder.start(TrackId::new(1));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(recorder.pending_track(), Some(TrackId::new(1)));

        recorder.start(TrackId::new(2));
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert_eq!(inner.recently_played_ids(), vec![TrackId::new(2)]);
        assert_eq!(recorder.last_recorded(), Some(TrackId::new(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_prevents_write() {
        let inner = catalog();
        let slow = Arc::new(SlowCatalog {
            inner: inner.clone(),
            delay: Duration::from_millis(100),
        });
        let mut recorder = RecentlyPlayedRecorder::new(slow);

        recorder.start(TrackId::new(1));
        tokio::time::sleep(Duration::from_millis(10)).await;
        recorder.cancel();
        tokio::time::sleep(Duration::from_millis(200)).await;

        assert!(inner.recently_played_ids().is_empty());
        assert_eq!(recorder.last_recorded(), None);
    }

    #[tokio::test]
    async fn failure_is_swallowed() {
        let catalog = catalog();
        catalog.set_fail_writes(true);
        let mut recorder = RecentlyPlayedRecorder::new(catalog.clone());

        recorder.start(TrackId::new(1));
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(recorder.last_recorded(), None);
        assert_eq!(recorder.pending_track(), None);
    }

    #[test]
    fn without_runtime_nothing_is_spawned() {
        let mut recorder = RecentlyPlayedRecorder::new(catalog());
        recorder.start(TrackId::new(1));
        assert_eq!(recorder.pending_track(), None);
    }

    #[test]
    fn disabled_recorder_is_inert() {
        let mut recorder = RecentlyPlayedRecorder::disabled();
        assert!(!recorder.is_enabled());
        recorder.start(TrackId::new(1));
        recorder.cancel();
        assert_eq!(recorder.last_recorded(), None);
    }
}
