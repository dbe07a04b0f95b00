//! Aria Player - Playback State Machine
//!
//! Platform-agnostic player state machine for Aria Player.
//!
//! This crate provides:
//! - Ordered queue with index-based navigation
//! - Play/pause/stop/next/previous transitions
//! - Seek with clamping, authoritative duration tracking
//! - Repeat modes (Off, All, One) and destructive shuffle
//! - Queue maintenance (add/remove/clear/replace)
//! - Event buffer for engine and UI synchronization
//!
//! # Architecture
//!
//! `aria-playback` is completely free of I/O:
//! - No dependency on an audio backend
//! - No dependency on a UI toolkit
//! - No async runtime
//!
//! Every operation is a synchronous, atomic state transition that appends
//! [`PlayerEvent`]s to a pending buffer. The app-shell session drains the
//! buffer and routes the events: track/playback/seek/volume changes become
//! audio-engine directives, everything becomes a UI change notification.
//! The state machine only ever describes *what should be playing*; whether
//! a resource is physically loaded is the audio engine's concern.
//!
//! # Example: Basic Playback
//!
//! ```rust
//! use aria_playback::{Player, PlayerConfig};
//! use aria_core::{ArtistId, Track, TrackId};
//! use std::time::Duration;
//!
//! let mut player = Player::new(PlayerConfig::default());
//!
//! let track = Track::new(
//!     TrackId::new("t-1"),
//!     "Midnight Static",
//!     ArtistId::new("a-9"),
//!     "The Wire Frames",
//!     "https://cdn.example.com/audio/t-1.mp3",
//!     Duration::from_secs(214),
//! );
//!
//! player.play_track(track.clone(), vec![track]);
//! assert!(player.is_playing());
//!
//! // The session layer forwards these to the audio engine and the UI
//! let events = player.take_events();
//! assert!(!events.is_empty());
//! ```
//!
//! # Example: Repeat and Shuffle
//!
//! ```rust
//! use aria_playback::{Player, RepeatMode};
//!
//! let mut player = Player::default();
//! player.set_repeat(RepeatMode::All);
//! player.toggle_shuffle();
//! assert!(player.shuffle());
//! ```

mod events;
mod player;
mod queue;
mod shuffle;
pub mod types;

// Public exports
pub use events::PlayerEvent;
pub use player::{Player, PlayerSnapshot};
pub use queue::{Queue, Removal};
pub use types::{PlayerConfig, RepeatMode};
