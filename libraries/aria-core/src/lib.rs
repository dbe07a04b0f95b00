//! Aria Player Core
//!
//! Platform-agnostic domain types and error handling for Aria Player.
//!
//! This crate provides the foundational building blocks shared by the
//! playback engine and the mobile app shell:
//! - **Domain Types**: `Track`, `Artist`, and their identifiers
//!
//! Records are produced by the streaming platform's catalog API and consumed
//! read-only by the player; nothing in this crate performs I/O or fails.
//!
//! # Example
//!
//! ```rust
//! use aria_core::types::{Track, TrackId, ArtistId};
//! use std::time::Duration;
//!
//! let track = Track::new(
//!     TrackId::new("t-1"),
//!     "Midnight Static",
//!     ArtistId::new("a-9"),
//!     "The Wire Frames",
//!     "https://cdn.example.com/audio/t-1.mp3",
//!     Duration::from_secs(214),
//! );
//! assert_eq!(track.title, "Midnight Static");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod types;

// Re-export commonly used types
pub use types::{Artist, ArtistId, Track, TrackId};
