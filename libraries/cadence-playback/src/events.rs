//! Player events and change notification
//!
//! Every command that changes state produces a list of events describing
//! what changed. Subscribers receive the new state together with that list,
//! once per command, so a host can re-render and re-sync its media element.

use cadence_core::TrackId;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use crate::types::{LoopMode, PlayerState, PlayerStatus};

/// Events emitted by the player controller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// Lifecycle phase changed
    StatusChanged {
        /// Phase before the command
        from: PlayerStatus,
        /// Phase after the command
        to: PlayerStatus,
    },

    /// Selected track changed
    TrackChanged {
        /// New (current) track, if any
        track_id: Option<TrackId>,
        /// Previously selected track, if any
        previous_track_id: Option<TrackId>,
    },

    /// Playback position changed
    PositionChanged {
        /// Position in seconds
        position: f64,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume level (0-100)
        volume: u8,
        /// Level saved by the last mute
        muted_volume: Option<u8>,
    },

    /// Loop mode changed
    LoopModeChanged {
        /// New loop mode
        loop_mode: LoopMode,
    },

    /// Queue replaced
    QueueChanged {
        /// New queue length
        length: usize,
    },
}

/// Listener invoked after every state-changing command
pub type Listener = dyn Fn(&PlayerState, &[PlayerEvent]) + Send + Sync;

#[derive(Default)]
struct ListenerRegistry {
    next_id: u64,
    listeners: Vec<(u64, Arc<Listener>)>,
}

/// Subscriber list owned by a controller
#[derive(Clone, Default)]
pub(crate) struct Observers {
    registry: Arc<Mutex<ListenerRegistry>>,
}

impl Observers {
    pub(crate) fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&PlayerState, &[PlayerEvent]) + Send + Sync + 'static,
    {
        let mut registry = lock(&self.registry);
        let id = registry.next_id;
        registry.next_id += 1;
        registry.listeners.push((id, Arc::new(listener)));

        Subscription {
            id,
            registry: Arc::downgrade(&self.registry),
        }
    }

    /// Call every listener with the new state
    ///
    /// The registry lock is released before listeners run, so a listener may
    /// subscribe or unsubscribe without deadlocking.
    pub(crate) fn notify(&self, state: &PlayerState, events: &[PlayerEvent]) {
        let listeners: Vec<Arc<Listener>> = lock(&self.registry)
            .listeners
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(state, events);
        }
    }

    pub(crate) fn len(&self) -> usize {
        lock(&self.registry).listeners.len()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("listeners", &self.len())
            .finish()
    }
}

/// Handle returned by `subscribe`
///
/// Dropping the handle leaves the listener registered for the lifetime of
/// the controller; call [`Subscription::unsubscribe`] to remove it.
#[must_use = "call unsubscribe() to remove the listener"]
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    registry: Weak<Mutex<ListenerRegistry>>,
}

impl Subscription {
    /// Remove the listener
    pub fn unsubscribe(self) {
        if let Some(registry) = self.registry.upgrade() {
            lock(&registry)
                .listeners
                .retain(|(id, _)| *id != self.id);
        }
    }
}

fn lock(registry: &Mutex<ListenerRegistry>) -> MutexGuard<'_, ListenerRegistry> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}
