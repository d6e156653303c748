//! Player session
//!
//! Wires the controller to its collaborators for the lifetime of a session:
//! tracks come from the catalog, the snapshot is loaded once at start and
//! saved after every state change.

use cadence_core::Catalog;
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    command::PlayerCommand,
    controller::PlayerController,
    events::{PlayerEvent, Subscription},
    error::Result,
    persistence::{KeyValueStore, SnapshotStore},
    snapshot::Snapshot,
    types::{PlayerConfig, PlayerState},
};

/// A running player session
///
/// Persistence and catalog failures are logged and swallowed; the controller
/// keeps working with whatever it has.
pub struct PlayerSession<S: KeyValueStore> {
    controller: PlayerController,
    catalog: Arc<dyn Catalog>,
    snapshots: SnapshotStore<S>,
}

impl<S: KeyValueStore> PlayerSession<S> {
    /// Start a session
    ///
    /// Fetches the queue, then rehydrates from the persisted snapshot. The
    /// restored player is always stopped. A catalog failure starts the
    /// session with an empty queue.
    pub async fn start(config: PlayerConfig, catalog: Arc<dyn Catalog>, store: S) -> Result<Self> {
        config.validate()?;

        let defaults = Snapshot::defaults(&config);
        let mut snapshots = SnapshotStore::new(store, config.snapshot_key.clone());
        let mut controller = PlayerController::with_catalog(config, Arc::clone(&catalog));

        match catalog.fetch_tracks().await {
            Ok(tracks) => {
                controller.dispatch(PlayerCommand::SetTracks(tracks));
            }
            Err(e) => warn!("Failed to fetch tracks, starting with an empty queue: {}", e),
        }

        if let Some(snapshot) = snapshots.load_snapshot(&defaults) {
            controller.restore(&snapshot);
        }

        let mut session = Self {
            controller,
            catalog,
            snapshots,
        };
        session.persist();

        let state = session.state();
        info!(
            tracks = state.tracks().len(),
            track_id = ?state.current_track_id(),
            volume = state.volume(),
            loop_mode = %state.loop_mode(),
            "Player session started"
        );

        Ok(session)
    }

    /// Current state
    pub fn state(&self) -> &PlayerState {
        self.controller.state()
    }

    /// Underlying controller
    pub fn controller(&self) -> &PlayerController {
        &self.controller
    }

    /// Snapshot store backing this session
    pub fn snapshots(&self) -> &SnapshotStore<S> {
        &self.snapshots
    }

    /// Register a state listener
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&PlayerState, &[PlayerEvent]) + Send + Sync + 'static,
    {
        self.controller.subscribe(listener)
    }

    /// Apply a command and persist the result
    pub fn dispatch(&mut self, command: PlayerCommand) -> bool {
        let changed = self.controller.dispatch(command);
        if changed {
            self.persist();
        }
        changed
    }

    /// Forward a progress report from the media element
    pub fn on_time_advanced(&mut self, position: f64) -> bool {
        let changed = self.controller.on_time_advanced(position);
        if changed {
            self.persist();
        }
        changed
    }

    /// Forward an end-of-track notification from the media element
    pub fn on_track_ended(&mut self) -> bool {
        let changed = self.controller.on_track_ended();
        if changed {
            self.persist();
        }
        changed
    }

    /// Re-fetch the queue from the catalog
    ///
    /// On failure the current queue is kept.
    pub async fn refresh_tracks(&mut self) -> bool {
        match self.catalog.fetch_tracks().await {
            Ok(tracks) => self.dispatch(PlayerCommand::SetTracks(tracks)),
            Err(e) => {
                warn!("Failed to refresh tracks: {}", e);
                false
            }
        }
    }

    /// End the session
    ///
    /// Cancels any pending recently-played write and flushes the snapshot.
    pub fn shutdown(mut self) -> Result<()> {
        self.controller.cancel_side_effects();
        let snapshot = self.controller.snapshot();
        self.snapshots.save_snapshot(&snapshot)?;
        info!("Player session closed");
        Ok(())
    }

    fn persist(&mut self) {
        let snapshot = self.controller.snapshot();
        if let Err(e) = self.snapshots.save_snapshot(&snapshot) {
            warn!("Failed to persist player snapshot: {}", e);
        }
    }
}

impl<S: KeyValueStore + std::fmt::Debug> std::fmt::Debug for PlayerSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerSession")
            .field("controller", &self.controller)
            .field("snapshots", &self.snapshots)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStore;
    use crate::types::{LoopMode, PlayerStatus};
    use cadence_core::{MemoryCatalog, Track, TrackId};

    fn catalog() -> Arc<MemoryCatalog> {
        Arc::new(MemoryCatalog::new(vec![
            Track::new(TrackId::new(1), "/a.mp3", 100.0),
            Track::new(TrackId::new(2), "/b.mp3", 20.0),
        ]))
    }

    #[tokio::test]
    async fn start_without_snapshot_uses_config() {
        let config = PlayerConfig {
            volume: 60,
            loop_mode: LoopMode::One,
            ..PlayerConfig::default()
        };
        let session = PlayerSession::start(config, catalog(), MemoryStore::new())
            .await
            .unwrap();

        let state = session.state();
        assert_eq!(state.tracks().len(), 2);
        assert_eq!(state.volume(), 60);
        assert_eq!(state.loop_mode(), LoopMode::One);
        assert_eq!(state.status(), PlayerStatus::Stopped);
    }

    #[tokio::test]
    async fn start_rejects_invalid_config() {
        let config = PlayerConfig {
            snapshot_key: "  ".to_string(),
            ..PlayerConfig::default()
        };
        assert!(PlayerSession::start(config, catalog(), MemoryStore::new())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn dispatch_persists_changes() {
        let mut session =
            PlayerSession::start(PlayerConfig::default(), catalog(), MemoryStore::new())
                .await
                .unwrap();

        assert!(session.dispatch(PlayerCommand::SetTrack(TrackId::new(2))));
        assert!(session.dispatch(PlayerCommand::SetVolume(25)));

        let blob = session
            .snapshots()
            .store()
            .get("player-snapshot")
            .unwrap()
            .unwrap();
        let saved = Snapshot::decode(&blob, &Snapshot::default());
        assert_eq!(saved.volume, 25);
        assert_eq!(saved.current_track_id, Some(TrackId::new(2)));
    }

    #[tokio::test]
    async fn refresh_tracks_drops_missing_current() {
        let catalog = catalog();
        let mut session = PlayerSession::start(
            PlayerConfig::default(),
            Arc::clone(&catalog) as Arc<dyn Catalog>,
            MemoryStore::new(),
        )
        .await
        .unwrap();

        session.dispatch(PlayerCommand::SetTrack(TrackId::new(2)));
        catalog.set_tracks(vec![Track::new(TrackId::new(1), "/a.mp3", 100.0)]);

        assert!(session.refresh_tracks().await);
        assert_eq!(session.state().tracks().len(), 1);
        assert_eq!(session.state().current_track_id(), None);
    }
}
