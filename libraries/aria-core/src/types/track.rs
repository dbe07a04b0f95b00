/// Track domain type
use crate::types::{ArtistId, TrackId};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Audio track as served by the catalog API
///
/// Immutable from the player's perspective: the player only ever re-points
/// to different `Track` values supplied by catalog, search, or library
/// screens, it never mutates one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    /// Unique track identifier
    pub id: TrackId,

    /// Track title
    pub title: String,

    /// Identifier of the primary artist
    pub artist_id: ArtistId,

    /// Display name of the primary artist
    pub artist_name: String,

    /// Opaque streaming URL handed to the audio engine
    pub audio_url: String,

    /// Declared track length in milliseconds
    ///
    /// Authoritative only until the audio resource reports the real duration.
    pub duration_ms: u64,

    /// Cover artwork URL
    pub cover_url: Option<String>,

    /// Play counter
    pub plays: u64,

    /// Like counter
    pub likes: u64,

    /// Whether the requesting user has liked this track
    pub is_liked: bool,
}

impl Track {
    /// Create a new track with minimal metadata
    pub fn new(
        id: TrackId,
        title: impl Into<String>,
        artist_id: ArtistId,
        artist_name: impl Into<String>,
        audio_url: impl Into<String>,
        duration: Duration,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            artist_id,
            artist_name: artist_name.into(),
            audio_url: audio_url.into(),
            duration_ms: duration.as_millis() as u64,
            cover_url: None,
            plays: 0,
            likes: 0,
            is_liked: false,
        }
    }

    /// Get the declared track duration as a `Duration`
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }
}
