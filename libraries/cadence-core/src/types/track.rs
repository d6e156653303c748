/// Track domain type
use crate::types::TrackId;
use serde::{Deserialize, Serialize};

/// Audio track as listed by the catalog
///
/// Read-only from the player's point of view: the controller looks tracks up
/// by `id` and reads `file`/`duration`, it never mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Playable URL or path handed to the media element
    pub file: String,

    /// Cover image URL
    #[serde(default)]
    pub cover: Option<String>,

    /// Track duration in seconds
    #[serde(default)]
    pub duration: f64,

    /// Whether the user marked this track as a favorite
    #[serde(default)]
    pub favorite: bool,

    /// Track title
    #[serde(default)]
    pub name: String,

    /// Artist name
    #[serde(default)]
    pub artist: Option<String>,

    /// Codec name (e.g. "FLAC")
    #[serde(default)]
    pub codec: Option<String>,

    /// Sample rate in Hz
    #[serde(default)]
    pub sample_rate: Option<u32>,
}

impl Track {
    /// Create a new track with minimal metadata
    ///
    /// Negative or non-finite durations are stored as zero.
    pub fn new(id: TrackId, file: impl Into<String>, duration: f64) -> Self {
        Self {
            id,
            file: file.into(),
            cover: None,
            duration: sanitize_duration(duration),
            favorite: false,
            name: String::new(),
            artist: None,
            codec: None,
            sample_rate: None,
        }
    }

    /// Set the display name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the artist
    #[must_use]
    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    /// Set the cover URL
    #[must_use]
    pub fn with_cover(mut self, cover: impl Into<String>) -> Self {
        self.cover = Some(cover.into());
        self
    }

    /// Set the favorite flag
    #[must_use]
    pub fn with_favorite(mut self, favorite: bool) -> Self {
        self.favorite = favorite;
        self
    }

    /// Duration in seconds, never negative
    pub fn duration_secs(&self) -> f64 {
        sanitize_duration(self.duration)
    }
}

fn sanitize_duration(duration: f64) -> f64 {
    if duration.is_finite() && duration > 0.0 {
        duration
    } else {
        0.0
    }
}
