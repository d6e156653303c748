//! Snapshot codec
//!
//! A snapshot is the slice of player state worth carrying across reloads:
//! volume, mute memory, loop mode, current track and position. The queue and
//! status are never persisted; tracks come fresh from the catalog and a
//! restored player always starts stopped.
//!
//! Decoding is lenient. A blob that is not JSON yields the defaults, and each
//! field that is missing or out of range falls back to its own default.
//! Unknown fields are ignored.

use cadence_core::TrackId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::error::Result;
use crate::types::{LoopMode, PlayerConfig, PlayerState};

/// Persistable subset of `PlayerState`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    /// Volume level (0-100)
    pub volume: u8,

    /// Level saved by the last mute
    pub muted_volume: Option<u8>,

    /// Loop mode
    pub loop_mode: LoopMode,

    /// Selected track
    pub current_track_id: Option<TrackId>,

    /// Position in the selected track, in seconds
    pub position: f64,
}

impl Snapshot {
    /// Defaults a fresh player would start with under `config`
    pub fn defaults(config: &PlayerConfig) -> Self {
        Self::capture(&PlayerState::new(config))
    }

    /// Capture the persistable fields of `state`
    pub fn capture(state: &PlayerState) -> Self {
        Self {
            volume: state.volume(),
            muted_volume: state.muted_volume(),
            loop_mode: state.loop_mode(),
            current_track_id: state.current_track_id(),
            position: state.position(),
        }
    }

    /// Encode as a JSON blob
    pub fn encode(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Decode a JSON blob, using `defaults` for anything unusable
    ///
    /// Never fails.
    pub fn decode(blob: &str, defaults: &Snapshot) -> Self {
        match serde_json::from_str::<Value>(blob) {
            Ok(value) => Self::from_value(&value, defaults),
            Err(e) => {
                warn!("Discarding unreadable player snapshot: {}", e);
                defaults.clone()
            }
        }
    }

    /// Decode an already parsed JSON value field by field
    pub fn from_value(value: &Value, defaults: &Snapshot) -> Self {
        let Some(fields) = value.as_object() else {
            warn!("Player snapshot is not an object, using defaults");
            return defaults.clone();
        };

        Self {
            volume: level(fields.get("volume")).unwrap_or(defaults.volume),
            muted_volume: muted_level(fields, defaults),
            loop_mode: fields
                .get("loopMode")
                .and_then(Value::as_str)
                .and_then(LoopMode::from_str)
                .unwrap_or(defaults.loop_mode),
            current_track_id: match fields.get("currentTrackId") {
                Some(Value::Null) => None,
                Some(v) => v.as_i64().map(TrackId::new).or(defaults.current_track_id),
                None => defaults.current_track_id,
            },
            position: fields
                .get("position")
                .and_then(Value::as_f64)
                .filter(|p| p.is_finite() && *p >= 0.0)
                .unwrap_or(defaults.position),
        }
    }
}

impl Default for Snapshot {
    fn default() -> Self {
        Self::defaults(&PlayerConfig::default())
    }
}

fn level(value: Option<&Value>) -> Option<u8> {
    value
        .and_then(Value::as_u64)
        .filter(|v| *v <= 100)
        .and_then(|v| u8::try_from(v).ok())
}

fn muted_level(fields: &Map<String, Value>, defaults: &Snapshot) -> Option<u8> {
    match fields.get("mutedVolume") {
        Some(Value::Null) => None,
        Some(v) => level(Some(v)).or(defaults.muted_volume),
        None => defaults.muted_volume,
    }
}
