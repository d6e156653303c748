//! Favorite toggle
//!
//! Small per-track machine behind a favorite button. Toggling writes the
//! flipped flag through the catalog and settles on whatever the catalog
//! answers; while the write is in flight further toggles are ignored.

use cadence_core::{Catalog, TrackId};
use serde::Serialize;
use tracing::{debug, warn};

/// Favorite button state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoriteState {
    Favorite,
    Unfavored,
    /// Catalog write in flight
    Processing,
}

impl FavoriteState {
    fn settled(favorite: bool) -> Self {
        if favorite {
            Self::Favorite
        } else {
            Self::Unfavored
        }
    }
}

/// Favorite flag of one track
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteToggle {
    track_id: TrackId,
    favorite: bool,
    processing: bool,
}

impl FavoriteToggle {
    pub fn new(track_id: TrackId, favorite: bool) -> Self {
        Self {
            track_id,
            favorite,
            processing: false,
        }
    }

    pub fn track_id(&self) -> TrackId {
        self.track_id
    }

    pub fn state(&self) -> FavoriteState {
        if self.processing {
            FavoriteState::Processing
        } else {
            FavoriteState::settled(self.favorite)
        }
    }

    /// Last settled flag
    pub fn is_favorite(&self) -> bool {
        self.favorite
    }

    /// Overwrite the flag from fresh catalog data
    ///
    /// Abandons an in-flight toggle; its result will be ignored.
    pub fn sync(&mut self, favorite: bool) {
        self.favorite = favorite;
        self.processing = false;
    }

    /// Enter `processing`
    ///
    /// Returns the flag to write, or `None` if a write is already in flight.
    pub fn begin_toggle(&mut self) -> Option<bool> {
        if self.processing {
            return None;
        }
        self.processing = true;
        Some(!self.favorite)
    }

    /// Settle a write started by `begin_toggle`
    ///
    /// `Some(flag)` is the catalog's answer; `None` means the write failed
    /// and the previous flag stands.
    pub fn complete(&mut self, outcome: Option<bool>) {
        if !self.processing {
            debug!(track_id = %self.track_id, "Dropping stale favorite result");
            return;
        }
        self.processing = false;
        if let Some(favorite) = outcome {
            self.favorite = favorite;
        }
    }

    /// Flip the flag through `catalog`
    ///
    /// Returns the settled state.
    pub async fn toggle(&mut self, catalog: &dyn Catalog) -> FavoriteState {
        let Some(desired) = self.begin_toggle() else {
            return self.state();
        };

        let outcome = match catalog.update_track_favorite(self.track_id, desired).await {
            Ok(favorite) => Some(favorite),
            Err(e) => {
                warn!(track_id = %self.track_id, "Failed to update favorite: {}", e);
                None
            }
        };

        self.complete(outcome);
        self.state()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cadence_core::{MemoryCatalog, Track};

    fn catalog() -> MemoryCatalog {
        MemoryCatalog::new(vec![Track::new(TrackId::new(1), "/a.mp3", 10.0)])
    }

    #[tokio::test]
    async fn toggle_round_trips_through_catalog() {
        let catalog = catalog();
        let mut toggle = FavoriteToggle::new(TrackId::new(1), false);
        assert_eq!(toggle.state(), FavoriteState::Unfavored);

        assert_eq!(toggle.toggle(&catalog).await, FavoriteState::Favorite);
        assert!(catalog.fetch_tracks().await.unwrap()[0].favorite);

        assert_eq!(toggle.toggle(&catalog).await, FavoriteState::Unfavored);
    }

    #[tokio::test]
    async fn failed_write_keeps_previous_flag() {
        let catalog = catalog();
        catalog.set_fail_writes(true);
        let mut toggle = FavoriteToggle::new(TrackId::new(1), true);

        assert_eq!(toggle.toggle(&catalog).await, FavoriteState::Favorite);
    }

    #[tokio::test]
    async fn unknown_track_keeps_previous_flag() {
        let mut toggle = FavoriteToggle::new(TrackId::new(42), false);
        assert_eq!(toggle.toggle(&catalog()).await, FavoriteState::Unfavored);
    }

    #[test]
    fn toggle_ignored_while_processing() {
        let mut toggle = FavoriteToggle::new(TrackId::new(1), false);
        assert_eq!(toggle.begin_toggle(), Some(true));
        assert_eq!(toggle.state(), FavoriteState::Processing);
        assert_eq!(toggle.begin_toggle(), None);

        toggle.complete(Some(true));
        assert_eq!(toggle.state(), FavoriteState::Favorite);
    }

    #[test]
    fn sync_abandons_in_flight_write() {
        let mut toggle = FavoriteToggle::new(TrackId::new(1), false);
        toggle.begin_toggle();
        toggle.sync(false);
        assert_eq!(toggle.state(), FavoriteState::Unfavored);

        toggle.complete(Some(true));
        assert!(!toggle.is_favorite());
    }
}
