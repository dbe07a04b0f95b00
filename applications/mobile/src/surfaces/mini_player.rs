//! Persistent mini-player bar
//!
//! The compact surface pinned to the bottom of every screen while a track is
//! active: title, artist, elapsed/total time, a progress bar, and transport
//! controls.

use super::{format_time, progress_fraction};
use crate::session::PlayerSession;
use serde::Serialize;
use std::sync::Arc;

/// Render model for the mini-player bar
#[derive(Debug, Clone, Serialize)]
pub struct MiniPlayerView {
    /// Whether the bar should be shown at all (hidden with no active track)
    pub visible: bool,

    /// Track title
    pub title: String,

    /// Artist display name
    pub artist: String,

    /// Play/pause flag, drives the toggle icon
    pub is_playing: bool,

    /// Elapsed time as `m:ss`
    pub elapsed: String,

    /// Total time as `m:ss`
    pub total: String,

    /// Progress in [0.0, 1.0] for the thin bar above the controls
    pub progress: f32,
}

/// The persistent bottom-bar surface
pub struct MiniPlayer {
    session: Arc<PlayerSession>,
}

impl MiniPlayer {
    /// Attach the surface to a session
    pub fn new(session: Arc<PlayerSession>) -> Self {
        Self { session }
    }

    /// Project the current player state into the render model
    pub fn view(&self) -> MiniPlayerView {
        let snapshot = self.session.snapshot();

        match snapshot.current_track {
            Some(track) => MiniPlayerView {
                visible: true,
                title: track.title,
                artist: track.artist_name,
                is_playing: snapshot.is_playing,
                elapsed: format_time(snapshot.position),
                total: format_time(snapshot.duration),
                progress: progress_fraction(snapshot.position, snapshot.duration),
            },
            None => MiniPlayerView {
                visible: false,
                title: String::new(),
                artist: String::new(),
                is_playing: false,
                elapsed: format_time(std::time::Duration::ZERO),
                total: format_time(std::time::Duration::ZERO),
                progress: 0.0,
            },
        }
    }

    // ===== Controls =====

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
}
