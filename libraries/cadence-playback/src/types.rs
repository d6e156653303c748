//! Core types for playback management

use cadence_core::{Track, TrackId};
use serde::{Deserialize, Serialize};

use crate::error::{PlaybackError, Result};
use crate::volume::Volume;

/// Lifecycle phase of the player
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    /// Nothing is playing
    #[default]
    Stopped,

    /// Currently playing
    Playing,

    /// Paused mid-track
    Paused,
}

impl PlayerStatus {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Stopped => "stopped",
            Self::Playing => "playing",
            Self::Paused => "paused",
        }
    }
}

impl std::fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What "next" and "previous" mean
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoopMode {
    /// Stop at the ends of the queue
    None,

    /// Repeat the current track
    One,

    /// Wrap around the queue
    #[default]
    All,

    /// Random track other than the current one
    Shuffle,
}

impl LoopMode {
    /// Cycle order used by `SwitchLoop`
    pub const CYCLE: [LoopMode; 4] = [Self::None, Self::One, Self::All, Self::Shuffle];

    /// Next mode in the `none → one → all → shuffle → none` cycle
    #[must_use]
    pub fn next(self) -> Self {
        match self {
            Self::None => Self::One,
            Self::One => Self::All,
            Self::All => Self::Shuffle,
            Self::Shuffle => Self::None,
        }
    }

    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::One => "one",
            Self::All => "all",
            Self::Shuffle => "shuffle",
        }
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "none" => Some(Self::None),
            "one" => Some(Self::One),
            "all" => Some(Self::All),
            "shuffle" => Some(Self::Shuffle),
            _ => None,
        }
    }
}

impl std::fmt::Display for LoopMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Player state
///
/// Owned exclusively by `PlayerController`. Hosts get a shared reference to
/// read it; every mutation goes through a command.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub(crate) status: PlayerStatus,
    pub(crate) tracks: Vec<Track>,
    pub(crate) current_track_id: Option<TrackId>,
    #[serde(flatten)]
    pub(crate) volume: Volume,
    pub(crate) loop_mode: LoopMode,
    pub(crate) position: f64,
}

impl PlayerState {
    /// Fresh session state built from `config`
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            status: PlayerStatus::Stopped,
            tracks: Vec::new(),
            current_track_id: None,
            volume: Volume::new(i32::from(config.volume)),
            loop_mode: config.loop_mode,
            position: 0.0,
        }
    }

    /// Current lifecycle phase
    pub fn status(&self) -> PlayerStatus {
        self.status
    }

    /// Playback queue in play order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Selected track id
    pub fn current_track_id(&self) -> Option<TrackId> {
        self.current_track_id
    }

    /// Selected track, resolved against the queue
    pub fn current_track(&self) -> Option<&Track> {
        self.current_track_id.and_then(|id| self.track(id))
    }

    /// Look up a queued track by id
    pub fn track(&self, id: TrackId) -> Option<&Track> {
        self.tracks.iter().find(|t| t.id == id)
    }

    /// Volume level (0-100)
    pub fn volume(&self) -> u8 {
        self.volume.level()
    }

    /// Level saved by the last mute, restored on unmute
    pub fn muted_volume(&self) -> Option<u8> {
        self.volume.muted_level()
    }

    /// Whether the volume is currently zero
    pub fn is_muted(&self) -> bool {
        self.volume.is_muted()
    }

    /// Loop mode
    pub fn loop_mode(&self) -> LoopMode {
        self.loop_mode
    }

    /// Playback offset of the current track in seconds
    pub fn position(&self) -> f64 {
        self.position
    }

    /// Duration of the current track, zero when nothing is selected
    pub fn current_duration(&self) -> f64 {
        self.current_track().map_or(0.0, Track::duration_secs)
    }
}

impl Default for PlayerState {
    fn default() -> Self {
        Self::new(&PlayerConfig::default())
    }
}

/// Configuration for the player controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Initial volume (0-100, default: 100)
    pub volume: u8,

    /// Initial loop mode (default: All)
    pub loop_mode: LoopMode,

    /// Key the snapshot is persisted under (default: "player-snapshot")
    pub snapshot_key: String,

    /// Fixed seed for shuffle picks (default: None = OS entropy)
    pub shuffle_seed: Option<u64>,
}

/// Default snapshot key
pub const DEFAULT_SNAPSHOT_KEY: &str = "player-snapshot";

impl PlayerConfig {
    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.volume > 100 {
            return Err(PlaybackError::InvalidConfig(format!(
                "volume must be within 0-100, got {}",
                self.volume
            )));
        }

        if self.snapshot_key.trim().is_empty() {
            return Err(PlaybackError::InvalidConfig(
                "snapshot_key must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            volume: 100,
            loop_mode: LoopMode::All,
            snapshot_key: DEFAULT_SNAPSHOT_KEY.to_string(),
            shuffle_seed: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = PlayerConfig::default();
        assert_eq!(config.volume, 100);
        assert_eq!(config.loop_mode, LoopMode::All);
        assert_eq!(config.snapshot_key, "player-snapshot");
        assert!(config.shuffle_seed.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let config = PlayerConfig {
            volume: 101,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(PlaybackError::InvalidConfig(_))));

        let config = PlayerConfig {
            snapshot_key: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn default_state() {
        let state = PlayerState::default();
        assert_eq!(state.status(), PlayerStatus::Stopped);
        assert_eq!(state.volume(), 100);
        assert_eq!(state.loop_mode(), LoopMode::All);
        assert!(state.tracks().is_empty());
        assert!(state.current_track().is_none());
        assert_eq!(state.position(), 0.0);
    }

    #[test]
    fn state_serializes_flat_for_hosts() {
        let json = serde_json::to_value(PlayerState::default()).unwrap();
        assert_eq!(json["status"], "stopped");
        assert_eq!(json["volume"], 100);
        assert!(json["mutedVolume"].is_null());
        assert_eq!(json["loopMode"], "all");
        assert!(json["currentTrackId"].is_null());
    }

    #[test]
    fn loop_mode_cycle() {
        assert_eq!(LoopMode::None.next(), LoopMode::One);
        assert_eq!(LoopMode::One.next(), LoopMode::All);
        assert_eq!(LoopMode::All.next(), LoopMode::Shuffle);
        assert_eq!(LoopMode::Shuffle.next(), LoopMode::None);
    }

    #[test]
    fn loop_mode_string_conversion() {
        for mode in LoopMode::CYCLE {
            assert_eq!(LoopMode::from_str(mode.as_str()), Some(mode));
        }
        assert_eq!(LoopMode::from_str("repeat"), None);
        assert_eq!(
            serde_json::to_string(&LoopMode::Shuffle).unwrap(),
            "\"shuffle\""
        );
    }

    #[test]
    fn config_deserializes_with_partial_fields() {
        let config: PlayerConfig = serde_json::from_str(r#"{"loop_mode": "one"}"#).unwrap();
        assert_eq!(config.loop_mode, LoopMode::One);
        assert_eq!(config.volume, 100);
    }
}
