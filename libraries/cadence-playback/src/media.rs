//! Media element synchronisation
//!
//! The media element (whatever actually produces sound) is driven one way,
//! from player state to element. `MediaSync` remembers what it last pushed
//! and only touches the element where the state moved away from it.

use tracing::trace;

use crate::types::{PlayerState, PlayerStatus};

/// Position drift (seconds) below which the element is not re-seeked
pub const SEEK_TOLERANCE: f64 = 0.5;

/// Output the player drives
///
/// The element reports back only through the player's notification entry
/// points (time advanced, track ended); nothing reads these setters back.
pub trait MediaElement {
    /// Load a new source file
    fn set_source(&mut self, file: &str);

    /// Set output gain (0.0 - 1.0)
    fn set_volume(&mut self, gain: f64);

    /// Jump to `position` seconds
    fn seek(&mut self, position: f64);

    /// Start or resume output
    fn play(&mut self);

    /// Pause output
    fn pause(&mut self);
}

/// Applies player state to a `MediaElement`
#[derive(Debug, Default, Clone, PartialEq)]
pub struct MediaSync {
    source: Option<String>,
    gain: Option<f64>,
    playing: bool,
    element_position: f64,
}

impl MediaSync {
    /// Create a sync that has not pushed anything yet
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a position the element itself reported
    ///
    /// Call this before forwarding the report to the player so that the
    /// resulting state change is not echoed back as a seek.
    pub fn element_reported(&mut self, position: f64) {
        if position.is_finite() {
            self.element_position = position;
        }
    }

    /// Record that the element stopped at the end of its source
    ///
    /// Call this before forwarding the end-of-track notification. A restart
    /// of the same source (repeat-one, single-track queue) then sends `play`
    /// again instead of only a seek.
    pub fn element_ended(&mut self) {
        self.playing = false;
    }

    /// Push `state` to `element`
    pub fn sync<E: MediaElement + ?Sized>(&mut self, state: &PlayerState, element: &mut E) {
        let file = state.current_track().map(|t| t.file.clone());
        let source_changed = file != self.source;

        if source_changed {
            if let Some(file) = &file {
                trace!(file = %file, "Media source changed");
                element.set_source(file);
            }
            self.source = file;
            self.element_position = 0.0;
        }

        let gain = (f64::from(state.volume()) / 100.0).min(1.0);
        if self.gain != Some(gain) {
            element.set_volume(gain);
            self.gain = Some(gain);
        }

        if self.source.is_some() && (state.position() - self.element_position).abs() > SEEK_TOLERANCE
        {
            element.seek(state.position());
            self.element_position = state.position();
        }

        let should_play = state.status() == PlayerStatus::Playing && self.source.is_some();
        if should_play && (!self.playing || source_changed) {
            element.play();
            self.playing = true;
        } else if !should_play && self.playing {
            element.pause();
            self.playing = false;
        }
    }
}
