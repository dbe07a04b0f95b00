//! Queue shuffling
//!
//! Fisher-Yates over every track except the one currently playing, which is
//! pinned as the new head so playback continues uninterrupted. The reorder is
//! destructive: toggling shuffle back off does not restore the previous
//! order.

use aria_core::Track;
use rand::seq::SliceRandom;
use rand::thread_rng;

/// Reorder a queue for shuffle playback
///
/// Returns the new order: the current track first, every other track behind
/// it in random order. Tracks sharing the current track's id are treated as
/// the current track and collapse into the head slot.
pub fn shuffle_keeping_current(tracks: &[Track], current: &Track) -> Vec<Track> {
    let mut others: Vec<Track> = tracks
        .iter()
        .filter(|t| t.id != current.id)
        .cloned()
        .collect();

    let mut rng = thread_rng();
    others.shuffle(&mut rng);

    let mut reordered = Vec::with_capacity(others.len() + 1);
    reordered.push(current.clone());
    reordered.extend(others);
    reordered
}
