//! UI surfaces - projections of the shared player state
//!
//! Two surfaces render the player: the persistent bottom bar
//! ([`MiniPlayer`]) and the full-screen view ([`FullPlayer`]). Both are
//! read-only projections of the same [`PlayerSession`] and issue the same
//! command vocabulary back into it; neither tracks position or modes on its
//! own, so they can never disagree.
//!
//! [`PlayerSession`]: crate::session::PlayerSession

mod full_player;
mod mini_player;

pub use full_player::{FullPlayer, FullPlayerView};
pub use mini_player::{MiniPlayer, MiniPlayerView};

use std::time::Duration;

/// Format a position as `m:ss` for display
pub(crate) fn format_time(duration: Duration) -> String {
    let total = duration.as_secs();
    format!("{}:{:02}", total / 60, total % 60)
}

/// Fraction of the track elapsed, for progress bars
pub(crate) fn progress_fraction(position: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        0.0
    } else {
        (position.as_secs_f32() / duration.as_secs_f32()).clamp(0.0, 1.0)
    }
}
