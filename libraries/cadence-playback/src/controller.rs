//! Player controller - the playback state machine
//!
//! Owns the `PlayerState` of a session and applies commands to it one at a
//! time. Status changes follow an explicit transition table; everything else
//! is a context update. After each command the controller diffs the state,
//! runs the recently-played side effect and notifies subscribers.

use cadence_core::{Catalog, Track, TrackId};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::{
    command::PlayerCommand,
    events::{Observers, PlayerEvent, Subscription},
    navigation::{next_track, prev_track},
    recently_played::RecentlyPlayedRecorder,
    snapshot::Snapshot,
    types::{LoopMode, PlayerConfig, PlayerState, PlayerStatus},
    volume::Volume,
};

/// Status transition table
///
/// Returns the status a command moves to from `status`, or `None` when the
/// command does not touch the status. Guards (is there a track to play?) are
/// checked by the caller.
pub fn transition(status: PlayerStatus, command: &PlayerCommand) -> Option<PlayerStatus> {
    use PlayerCommand as C;
    use PlayerStatus as S;

    match (status, command) {
        (_, C::Play) => Some(S::Playing),
        (S::Stopped | S::Paused, C::TogglePlay) => Some(S::Playing),
        (S::Playing, C::TogglePlay) => Some(S::Paused),
        (S::Playing, C::Pause) => Some(S::Paused),
        (S::Playing | S::Paused, C::Stop) => Some(S::Stopped),
        (_, C::PlayNext | C::PlayPrev) => Some(S::Playing),
        _ => None,
    }
}

/// Parts of the state that are cheap to compare before and after a command
#[derive(Debug, Clone, Copy, PartialEq)]
struct Fingerprint {
    status: PlayerStatus,
    track_id: Option<TrackId>,
    position: f64,
    volume: Volume,
    loop_mode: LoopMode,
}

impl Fingerprint {
    fn of(state: &PlayerState) -> Self {
        Self {
            status: state.status,
            track_id: state.current_track_id,
            position: state.position,
            volume: state.volume,
            loop_mode: state.loop_mode,
        }
    }
}

/// What a command did beyond the fingerprinted fields
#[derive(Debug, Default, Clone, Copy)]
struct Outcome {
    queue_changed: bool,
    /// A track was (re)started from the top by next/prev
    restarted: bool,
}

/// Player state machine
///
/// Single owner of `PlayerState`. Commands are applied synchronously in the
/// order they are dispatched; none of them can fail.
pub struct PlayerController {
    state: PlayerState,
    rng: StdRng,
    recently_played: RecentlyPlayedRecorder,
    observers: Observers,
}

impl PlayerController {
    /// Create a controller without a catalog (no recently-played writes)
    pub fn new(config: PlayerConfig) -> Self {
        Self::build(&config, RecentlyPlayedRecorder::disabled())
    }

    /// Create a controller that records recently-played tracks in `catalog`
    pub fn with_catalog(config: PlayerConfig, catalog: Arc<dyn Catalog>) -> Self {
        Self::build(&config, RecentlyPlayedRecorder::new(catalog))
    }

    fn build(config: &PlayerConfig, recently_played: RecentlyPlayedRecorder) -> Self {
        let rng = match config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            state: PlayerState::new(config),
            rng,
            recently_played,
            observers: Observers::default(),
        }
    }

    // ===== Read access =====

    /// Current state (read-only)
    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    /// Persistable subset of the current state
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::capture(&self.state)
    }

    /// Recently-played side effect handle
    pub fn recently_played(&self) -> &RecentlyPlayedRecorder {
        &self.recently_played
    }

    /// Register a listener called after every state-changing command
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&PlayerState, &[PlayerEvent]) + Send + Sync + 'static,
    {
        self.observers.subscribe(listener)
    }

    // ===== Commands =====

    /// Apply a command
    ///
    /// Returns `true` if the state changed. Invalid commands (unknown track
    /// id, nothing to play, end of queue) leave the state untouched.
    pub fn dispatch(&mut self, command: PlayerCommand) -> bool {
        let name = command.name();
        let before = Fingerprint::of(&self.state);
        let outcome = self.apply(command);
        let changed = self.commit(before, outcome);

        if changed {
            debug!(
                command = name,
                from = %before.status,
                to = %self.state.status,
                track_id = ?self.state.current_track_id,
                "Player transition"
            );
        } else {
            trace!(command = name, "Command left state unchanged");
        }

        changed
    }

    /// Media element reported playback progress
    pub fn on_time_advanced(&mut self, position: f64) -> bool {
        self.dispatch(PlayerCommand::SetTime(position))
    }

    /// Media element reached the end of the track
    ///
    /// Stops, then advances unless the loop mode is `none`. A notification
    /// arriving when nothing is playing (the host already stopped) is ignored.
    pub fn on_track_ended(&mut self) -> bool {
        if self.state.status != PlayerStatus::Playing {
            debug!(status = %self.state.status, "Ignoring track-ended notification");
            return false;
        }

        let mut changed = self.dispatch(PlayerCommand::Stop);
        if self.state.loop_mode != LoopMode::None {
            changed |= self.dispatch(PlayerCommand::PlayNext);
        }
        changed
    }

    /// Seed the state from a persisted snapshot
    ///
    /// Status is forced to `stopped` so audio never resumes without a user
    /// gesture. A track id missing from the current queue is dropped and the
    /// position is clamped to the restored track's duration.
    pub fn restore(&mut self, snapshot: &Snapshot) -> bool {
        let before = Fingerprint::of(&self.state);

        self.state.status = PlayerStatus::Stopped;
        self.state.volume = Volume::from_parts(snapshot.volume, snapshot.muted_volume);
        self.state.loop_mode = snapshot.loop_mode;
        self.state.current_track_id = snapshot
            .current_track_id
            .filter(|id| self.state.track(*id).is_some());
        self.state.position = if self.state.current_track_id.is_some() {
            self.clamp_position(snapshot.position)
        } else {
            0.0
        };

        self.commit(before, Outcome::default())
    }

    /// Abort any pending side effect
    pub fn cancel_side_effects(&mut self) {
        self.recently_played.cancel();
    }

    // ===== Internals =====

    fn apply(&mut self, command: PlayerCommand) -> Outcome {
        let mut outcome = Outcome::default();

        match command {
            PlayerCommand::Play
            | PlayerCommand::TogglePlay
            | PlayerCommand::Pause
            | PlayerCommand::Stop => {
                let Some(target) = transition(self.state.status, &command) else {
                    return outcome;
                };
                if target == PlayerStatus::Playing && !self.ensure_track_selected() {
                    return outcome;
                }
                self.state.status = target;
            }
            PlayerCommand::SetTrack(id) => {
                if self.state.track(id).is_some() {
                    self.state.current_track_id = Some(id);
                    self.state.position = 0.0;
                }
            }
            PlayerCommand::SetTracks(tracks) => {
                outcome.queue_changed = self.replace_tracks(tracks);
            }
            PlayerCommand::PlayNext | PlayerCommand::PlayPrev => {
                let tracks = &self.state.tracks;
                let current = self.state.current_track_id;
                let loop_mode = self.state.loop_mode;
                let target = if command == PlayerCommand::PlayNext {
                    next_track(tracks, current, loop_mode, &mut self.rng)
                } else {
                    prev_track(tracks, current, loop_mode, &mut self.rng)
                }
                .map(|t| t.id);

                if let Some(id) = target {
                    self.state.current_track_id = Some(id);
                    self.state.position = 0.0;
                    if let Some(status) = transition(self.state.status, &command) {
                        self.state.status = status;
                    }
                    outcome.restarted = true;
                }
            }
            PlayerCommand::SwitchLoop => {
                self.state.loop_mode = self.state.loop_mode.next();
            }
            PlayerCommand::SetVolume(level) => self.state.volume.set_level(level),
            PlayerCommand::Mute => self.state.volume.mute(),
            PlayerCommand::Unmute => self.state.volume.unmute(),
            PlayerCommand::ToggleMute => self.state.volume.toggle_mute(),
            PlayerCommand::SetTime(position) => {
                if position.is_finite() && self.state.current_track().is_some() {
                    self.state.position = self.clamp_position(position);
                }
            }
        }

        outcome
    }

    /// Make sure something is selected before entering `playing`
    ///
    /// Falls back to the first queued track. Returns `false` when the queue
    /// is empty.
    fn ensure_track_selected(&mut self) -> bool {
        if self.state.current_track().is_some() {
            return true;
        }

        match self.state.tracks.first() {
            Some(first) => {
                self.state.current_track_id = Some(first.id);
                self.state.position = 0.0;
                true
            }
            None => false,
        }
    }

    /// Swap the queue, dropping a current track that is no longer listed
    fn replace_tracks(&mut self, tracks: Vec<Track>) -> bool {
        let changed = tracks != self.state.tracks;
        self.state.tracks = tracks;

        if self.state.current_track().is_some() {
            self.state.position = self.clamp_position(self.state.position);
        } else if let Some(removed) = self.state.current_track_id.take() {
            debug!(track_id = %removed, "Current track left the queue");
            self.state.position = 0.0;
            self.state.status = PlayerStatus::Stopped;
        }

        changed
    }

    fn clamp_position(&self, position: f64) -> f64 {
        if !position.is_finite() {
            return 0.0;
        }
        position.clamp(0.0, self.state.current_duration())
    }

    /// Diff against `before`, run side effects and notify subscribers
    fn commit(&mut self, before: Fingerprint, outcome: Outcome) -> bool {
        let events = self.collect_events(&before, outcome);
        if events.is_empty() {
            // Restarting the only track at 0s changes nothing visible but
            // still counts as a fresh play.
            if outcome.restarted {
                self.run_side_effects(&before, outcome);
            }
            return false;
        }

        self.run_side_effects(&before, outcome);
        self.observers.notify(&self.state, &events);
        true
    }

    fn collect_events(&self, before: &Fingerprint, outcome: Outcome) -> Vec<PlayerEvent> {
        let after = Fingerprint::of(&self.state);
        let mut events = Vec::new();

        if outcome.queue_changed {
            events.push(PlayerEvent::QueueChanged {
                length: self.state.tracks.len(),
            });
        }
        if before.status != after.status {
            events.push(PlayerEvent::StatusChanged {
                from: before.status,
                to: after.status,
            });
        }
        if before.track_id != after.track_id {
            events.push(PlayerEvent::TrackChanged {
                track_id: after.track_id,
                previous_track_id: before.track_id,
            });
        }
        if before.position != after.position {
            events.push(PlayerEvent::PositionChanged {
                position: after.position,
            });
        }
        if before.volume != after.volume {
            events.push(PlayerEvent::VolumeChanged {
                volume: after.volume.level(),
                muted_volume: after.volume.muted_level(),
            });
        }
        if before.loop_mode != after.loop_mode {
            events.push(PlayerEvent::LoopModeChanged {
                loop_mode: after.loop_mode,
            });
        }

        events
    }

    /// Start or cancel the recently-played write
    ///
    /// A write starts when `playing` is entered, when the playing track
    /// changes, or when next/prev restarts a track. Leaving `playing`
    /// cancels it.
    fn run_side_effects(&mut self, before: &Fingerprint, outcome: Outcome) {
        let playing = self.state.status == PlayerStatus::Playing;

        match (playing, self.state.current_track_id) {
            (true, Some(id)) => {
                let entered = before.status != PlayerStatus::Playing;
                let switched = before.track_id != Some(id);
                if entered || switched || outcome.restarted {
                    self.recently_played.start(id);
                }
            }
            (false, _) if before.status == PlayerStatus::Playing => {
                self.recently_played.cancel();
            }
            _ => {}
        }
    }
}

impl Default for PlayerController {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}

impl std::fmt::Debug for PlayerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerController")
            .field("state", &self.state)
            .field("recently_played", &self.recently_played)
            .field("observers", &self.observers)
            .finish_non_exhaustive()
    }
}
