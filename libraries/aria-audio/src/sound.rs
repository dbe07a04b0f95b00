//! Platform-agnostic sound abstraction
//!
//! Abstracts the decode/playback resource so the engine can be driven by the
//! real HTTP streaming backend in the app and by a scripted fake in tests.

use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// A loaded, playable sound resource
///
/// Exactly one `Sound` is alive in the engine's slot at a time. Dropping the
/// handle releases the underlying resource (decoder thread, output stream),
/// which is how a superseded load unloads itself.
///
/// Transport methods are infallible by design: they flip control flags on an
/// already-acquired resource and have no failure mode worth surfacing.
pub trait Sound: Send {
    /// Start or resume playback
    fn play(&mut self);

    /// Pause playback, keeping the resource loaded
    fn pause(&mut self);

    /// Move the play cursor
    ///
    /// Implementations clamp the target into the playable range.
    fn seek(&mut self, position: Duration);

    /// Set volume in [0.0, 1.0]
    fn set_volume(&mut self, volume: f32);

    /// Current play cursor position
    fn position(&self) -> Duration;

    /// Total duration, when the container declares it
    ///
    /// `None` for streams that do not carry a frame count; the player then
    /// keeps using the catalog's declared duration.
    fn duration(&self) -> Option<Duration>;

    /// Whether the cursor has consumed all decoded audio
    fn is_finished(&self) -> bool;
}

/// Factory for sound resources
///
/// The engine acquires one resource per `audio_url`; acquisition is async
/// (network I/O, device setup) and may be superseded before it resolves.
#[async_trait]
pub trait StreamBackend: Send + Sync {
    /// Open a sound resource for an opaque streaming URL
    ///
    /// The resource comes back paused at position zero; the engine applies
    /// the latest play/seek/volume intent once it is installed.
    async fn open(&self, url: &str) -> Result<Box<dyn Sound>>;
}
