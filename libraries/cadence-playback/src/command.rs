//! Player commands
//!
//! The complete vocabulary a host can dispatch into `PlayerController`.

use cadence_core::{Track, TrackId};

/// Command dispatched into the player
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    /// Start or continue the current track
    Play,

    /// Pause if playing
    Pause,

    /// Halt playback, keeping the current track and position
    Stop,

    /// Play when stopped/paused, pause when playing
    TogglePlay,

    /// Select a track without starting playback
    SetTrack(TrackId),

    /// Replace the queue; dropping the current track clears it and stops playback
    SetTracks(Vec<Track>),

    /// Play the next track per the loop mode
    PlayNext,

    /// Play the previous track per the loop mode
    PlayPrev,

    /// Cycle the loop mode
    SwitchLoop,

    /// Set the volume, clamped to 0-100
    SetVolume(i32),

    /// Save the volume and drop to zero
    Mute,

    /// Restore the saved volume
    Unmute,

    /// Toggle between zero and the last non-zero volume
    ToggleMute,

    /// Set the playback position in seconds, clamped to the track duration
    SetTime(f64),
}

impl PlayerCommand {
    /// Short name used in logs
    pub fn name(&self) -> &'static str {
        match self {
            Self::Play => "PLAY",
            Self::Pause => "PAUSE",
            Self::Stop => "STOP",
            Self::TogglePlay => "TOGGLE_PLAY",
            Self::SetTrack(_) => "SET_TRACK",
            Self::SetTracks(_) => "SET_TRACKS",
            Self::PlayNext => "PLAY_NEXT",
            Self::PlayPrev => "PLAY_PREV",
            Self::SwitchLoop => "SWITCH_LOOP",
            Self::SetVolume(_) => "SET_VOLUME",
            Self::Mute => "MUTE",
            Self::Unmute => "UNMUTE",
            Self::ToggleMute => "TOGGLE_MUTE",
            Self::SetTime(_) => "SET_TIME",
        }
    }
}
