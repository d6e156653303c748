//! Volume control with mute memory
//!
//! Volume is an integer percentage (0-100). Muting drops the level to zero
//! and remembers the previous level so unmute can restore it.

use serde::Serialize;

/// Level restored by unmute when no muted level was saved
pub const DEFAULT_UNMUTE_LEVEL: u8 = 100;

/// Volume controller
///
/// Every operation keeps `level` within 0-100.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Volume {
    /// Volume level (0-100)
    #[serde(rename = "volume")]
    level: u8,

    /// Level saved when muting
    #[serde(rename = "mutedVolume")]
    muted_level: Option<u8>,

    /// Last non-zero level, restored when toggling back from silence
    #[serde(skip)]
    last_audible: u8,
}

impl Volume {
    /// Create new volume controller, clamping `level` to 0-100
    pub fn new(level: i32) -> Self {
        let level = clamp_level(level);
        Self {
            level,
            muted_level: None,
            last_audible: audible_or_default(level),
        }
    }

    /// Rebuild a volume from persisted parts
    pub(crate) fn from_parts(level: u8, muted_level: Option<u8>) -> Self {
        let level = level.min(100);
        let muted_level = muted_level.map(|l| l.min(100));
        Self {
            level,
            muted_level,
            last_audible: audible_or_default(muted_level.filter(|l| *l > 0).unwrap_or(level)),
        }
    }

    /// Set volume level, clamped to 0-100
    ///
    /// Overwrites any muted state.
    pub fn set_level(&mut self, level: i32) {
        self.level = clamp_level(level);
        self.muted_level = None;
        if self.level > 0 {
            self.last_audible = self.level;
        }
    }

    /// Get current volume level (0-100)
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Level saved by the last mute
    pub fn muted_level(&self) -> Option<u8> {
        self.muted_level
    }

    /// Whether the level is zero
    pub fn is_muted(&self) -> bool {
        self.level == 0
    }

    /// Save the current level and drop to zero
    ///
    /// Muting an already silent volume keeps the saved level.
    pub fn mute(&mut self) {
        if self.level > 0 {
            self.muted_level = Some(self.level);
            self.level = 0;
        }
    }

    /// Restore the level saved by `mute`
    ///
    /// A silent volume with nothing saved comes back at the last non-zero
    /// level (`DEFAULT_UNMUTE_LEVEL` if it was never audible). An audible
    /// volume is left alone.
    pub fn unmute(&mut self) {
        if let Some(level) = self.muted_level.take() {
            self.level = level;
        } else if self.level == 0 {
            self.level = self.last_audible;
        }
    }

    /// Toggle between zero and the last non-zero level
    pub fn toggle_mute(&mut self) {
        if self.is_muted() {
            self.unmute();
        } else {
            self.mute();
        }
    }

    /// Gain for a media element (0.0-1.0)
    pub fn gain(&self) -> f64 {
        f64::from(self.level) / 100.0
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(i32::from(DEFAULT_UNMUTE_LEVEL))
    }
}

fn audible_or_default(level: u8) -> u8 {
    if level > 0 {
        level
    } else {
        DEFAULT_UNMUTE_LEVEL
    }
}

fn clamp_level(level: i32) -> u8 {
    // clamp guarantees the value fits
    level.clamp(0, 100) as u8
}
