//! Player events
//!
//! Every state transition appends events to the player's pending buffer;
//! the session layer drains them and routes each one — track/playback/seek
//! changes to the audio engine as directives, everything to the UI surfaces
//! as change notifications. This keeps the state machine free of I/O while
//! making the ordering of effects explicit and testable.

use crate::types::RepeatMode;
use aria_core::Track;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Events emitted by the player state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PlayerEvent {
    /// The current track was re-pointed (possibly to none)
    ///
    /// The audio engine must release the installed resource and, for a
    /// non-empty track, load the new URL. `autoplay` carries the play/pause
    /// flag at the moment of the change; later flips arrive as
    /// `PlaybackChanged`.
    TrackChanged {
        /// The new current track, if any
        track: Option<Track>,
        /// Whether playback should start once the resource is ready
        autoplay: bool,
    },

    /// The play/pause flag flipped
    PlaybackChanged {
        /// New value of the flag
        is_playing: bool,
    },

    /// A deliberate position change (user seek, restart, repeat-one loop)
    ///
    /// Unlike `PositionChanged`, the audio engine must act on this by
    /// seeking the installed resource.
    Seeked {
        /// Target position, already clamped into `[0, duration]`
        position: Duration,
    },

    /// Periodic position update originating from the audio engine
    ///
    /// Display-only; never routed back to the engine.
    PositionChanged {
        /// Current playback position
        position: Duration,
    },

    /// The authoritative duration arrived from the audio resource
    DurationChanged {
        /// Reported track duration
        duration: Duration,
    },

    /// Volume changed
    VolumeChanged {
        /// New volume in [0.0, 1.0]
        volume: f32,
    },

    /// Queue contents changed (tracks added/removed/reordered/replaced)
    QueueChanged {
        /// New queue length
        length: usize,
    },

    /// Repeat or shuffle mode changed
    ModesChanged {
        /// Current repeat mode
        repeat: RepeatMode,
        /// Current shuffle state
        shuffle: bool,
    },
}
