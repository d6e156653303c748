//! Cadence - Player State Machine
//!
//! Host-agnostic playback control for Cadence.
//!
//! This crate provides:
//! - Player controller (status transitions, queue, volume, loop mode, seek)
//! - Navigation policy (next/prev under none/one/all/shuffle)
//! - Snapshot codec (lenient JSON, survives reloads)
//! - Persistence port (in-memory and file-backed key-value stores)
//! - Recently-played recording on the tokio runtime
//! - Change notifications for hosts
//! - One-way media element synchronisation
//! - Favorite toggle
//!
//! # Architecture
//!
//! `cadence-playback` never produces sound and never talks to a database:
//! - Tracks and write-backs go through `cadence_core::Catalog`
//! - Snapshots go through `KeyValueStore`
//! - Output goes through `MediaElement`
//!
//! The host owns one `PlayerSession` (or a bare `PlayerController`) and
//! forwards user commands plus the media element's two notifications into it.
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use cadence_core::{Track, TrackId};
//! use cadence_playback::{PlayerCommand, PlayerConfig, PlayerController, PlayerStatus};
//!
//! let mut player = PlayerController::new(PlayerConfig::default());
//!
//! player.dispatch(PlayerCommand::SetTracks(vec![
//!     Track::new(TrackId::new(1), "/music/one.mp3", 180.0),
//!     Track::new(TrackId::new(2), "/music/two.mp3", 200.0),
//! ]));
//!
//! // Nothing selected yet, so PLAY picks the first track
//! player.dispatch(PlayerCommand::Play);
//! assert_eq!(player.state().status(), PlayerStatus::Playing);
//! assert_eq!(player.state().current_track_id(), Some(TrackId::new(1)));
//!
//! // Media element notifications
//! player.on_time_advanced(42.0);
//! player.on_track_ended();
//! assert_eq!(player.state().current_track_id(), Some(TrackId::new(2)));
//! ```
//!
//! # Example: Persistent Session
//!
//! ```rust
//! use cadence_core::{MemoryCatalog, Track, TrackId};
//! use cadence_playback::{MemoryStore, PlayerCommand, PlayerConfig, PlayerSession};
//! use std::sync::Arc;
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let catalog = Arc::new(MemoryCatalog::new(vec![
//!     Track::new(TrackId::new(1), "/music/one.mp3", 180.0),
//! ]));
//!
//! let mut session = PlayerSession::start(PlayerConfig::default(), catalog, MemoryStore::new())
//!     .await
//!     .unwrap();
//!
//! session.dispatch(PlayerCommand::SetVolume(30));
//! session.shutdown().unwrap();
//! # });
//! ```

mod command;
mod controller;
mod error;
mod events;
mod favorite;
mod media;
pub mod navigation;
mod persistence;
mod recently_played;
mod session;
mod snapshot;
pub mod types;
mod volume;

// Public exports
pub use command::PlayerCommand;
pub use controller::{transition, PlayerController};
pub use error::{PlaybackError, Result};
pub use events::{Listener, PlayerEvent, Subscription};
pub use favorite::{FavoriteState, FavoriteToggle};
pub use media::{MediaElement, MediaSync, SEEK_TOLERANCE};
pub use navigation::{next_track, prev_track};
pub use persistence::{FileStore, KeyValueStore, MemoryStore, SnapshotStore};
pub use recently_played::RecentlyPlayedRecorder;
pub use session::PlayerSession;
pub use snapshot::Snapshot;
pub use types::{LoopMode, PlayerConfig, PlayerState, PlayerStatus, DEFAULT_SNAPSHOT_KEY};
pub use volume::{Volume, DEFAULT_UNMUTE_LEVEL};
