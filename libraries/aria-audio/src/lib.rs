//! Aria Player - Audio Engine
//!
//! Streaming audio engine for Aria Player.
//!
//! This crate provides:
//! - The [`Sound`]/[`StreamBackend`] abstraction over the platform decoder
//! - The engine task ([`spawn_engine`]) that owns the single resource slot:
//!   load/unload lifecycle, generation fencing of superseded loads,
//!   latest-intent play/pause/seek application, periodic position reports
//! - [`HttpStreamBackend`], the real backend: reqwest download, Symphonia
//!   decode, CPAL output
//!
//! # Architecture
//!
//! The engine never talks to the player state machine directly. It consumes
//! [`EngineCommand`]s and produces [`EngineEvent`]s over channels; the app
//! shell's session translates between the two. That keeps supersession
//! ordering observable in tests: a fake backend resolves loads on demand and
//! the test asserts which completions were installed and which were fenced
//! off.
//!
//! There is exactly one resource slot system-wide. Switching tracks cancels
//! interest in any prior pending load's playback-start effect; the
//! superseded resource is dropped (released) without ever starting.

#![warn(missing_docs)]

mod engine;
mod error;
mod sound;
mod streaming;

// Public exports
pub use engine::{spawn_engine, EngineCommand, EngineEvent, EngineHandle};
pub use error::{AudioError, Result};
pub use sound::{Sound, StreamBackend};
pub use streaming::HttpStreamBackend;
