//! Full-screen player
//!
//! The dense surface: cover art, social counters, mode indicators, and a
//! seek bar with drag support. While a drag is in progress the surface holds
//! a local scrub position for display and only issues the seek on release,
//! so a drag never floods the state machine with transitions.

use super::{format_time, progress_fraction};
use crate::session::PlayerSession;
use aria_playback::RepeatMode;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Render model for the full-screen player
#[derive(Debug, Clone, Serialize)]
pub struct FullPlayerView {
    /// Whether there is anything to show
    pub visible: bool,

    /// Track title
    pub title: String,

    /// Artist display name
    pub artist: String,

    /// Cover artwork URL
    pub cover_url: Option<String>,

    /// Play/pause flag
    pub is_playing: bool,

    /// Displayed position - the scrub position during a drag, the shared
    /// player position otherwise
    pub position: Duration,

    /// Track duration
    pub duration: Duration,

    /// Elapsed time as `m:ss`
    pub elapsed: String,

    /// Total time as `m:ss`
    pub total: String,

    /// Progress in [0.0, 1.0]
    pub progress: f32,

    /// Like counter
    pub likes: u64,

    /// Whether the user liked this track
    pub is_liked: bool,

    /// Repeat mode indicator
    pub repeat: RepeatMode,

    /// Shuffle indicator
    pub shuffle: bool,

    /// Whether the next button is enabled
    pub has_next: bool,

    /// Whether the previous button is enabled
    pub has_previous: bool,
}

/// The full-screen player surface
pub struct FullPlayer {
    session: Arc<PlayerSession>,

    /// Scrub position while a seek drag is in progress
    scrub: Option<Duration>,
}

impl FullPlayer {
    /// Attach the surface to a session
    pub fn new(session: Arc<PlayerSession>) -> Self {
        Self {
            session,
            scrub: None,
        }
    }

    /// Project the current player state into the render model
    pub fn view(&self) -> FullPlayerView {
        let snapshot = self.session.snapshot();
        let position = self.scrub.unwrap_or(snapshot.position);

        match snapshot.current_track {
            Some(track) => FullPlayerView {
                visible: true,
                title: track.title,
                artist: track.artist_name,
                cover_url: track.cover_url,
                is_playing: snapshot.is_playing,
                position,
                duration: snapshot.duration,
                elapsed: format_time(position),
                total: format_time(snapshot.duration),
                progress: progress_fraction(position, snapshot.duration),
                likes: track.likes,
                is_liked: track.is_liked,
                repeat: snapshot.repeat,
                shuffle: snapshot.shuffle,
                has_next: snapshot.has_next,
                has_previous: snapshot.has_previous,
            },
            None => FullPlayerView {
                visible: false,
                title: String::new(),
                artist: String::new(),
                cover_url: None,
                is_playing: false,
                position: Duration::ZERO,
                duration: Duration::ZERO,
                elapsed: format_time(Duration::ZERO),
                total: format_time(Duration::ZERO),
                progress: 0.0,
                likes: 0,
                is_liked: false,
                repeat: snapshot.repeat,
                shuffle: snapshot.shuffle,
                has_next: false,
                has_previous: false,
            },
        }
    }

    // ===== Transport Controls =====

    /// Toggle between play and pause
    pub fn toggle_play_pause(&self) {
        if self.session.snapshot().is_playing {
            self.session.pause();
        } else {
            self.session.resume();
        }
    }

    /// Skip to the next track
    pub fn next(&self) {
        self.session.next();
    }

    /// Go back (restart or previous track)
    pub fn previous(&self) {
        self.session.previous();
    }

    /// Cycle repeat mode: off -> all -> one -> off
    pub fn cycle_repeat(&self) {
        let next = match self.session.snapshot().repeat {
            RepeatMode::Off => RepeatMode::All,
            RepeatMode::All => RepeatMode::One,
            RepeatMode::One => RepeatMode::Off,
        };
        self.session.set_repeat(next);
    }

    /// Toggle shuffle
    pub fn toggle_shuffle(&self) {
        self.session.toggle_shuffle();
    }

    // ===== Seek Gesture =====

    /// Begin a seek drag; display freezes at the scrub position
    pub fn begin_scrub(&mut self) {
        self.scrub = Some(self.session.snapshot().position);
    }

    /// Move the scrub position during a drag
    ///
    /// Only updates the local display value; no transition is issued until
    /// the gesture ends.
    pub fn scrub_to(&mut self, position: Duration) {
        if self.scrub.is_some() {
            self.scrub = Some(position);
        }
    }

    /// End the drag and commit the seek
    pub fn end_scrub(&mut self) {
        if let Some(position) = self.scrub.take() {
            self.session.seek_to(position);
        }
    }

    /// Whether a seek drag is in progress
    pub fn is_scrubbing(&self) -> bool {
        self.scrub.is_some()
    }
}
