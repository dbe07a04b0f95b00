//! Playback queue
//!
//! A flat, ordered sequence of tracks with an index into the slot that is
//! currently playing. Navigation is index-based and non-destructive: tracks
//! stay in place as the player advances, so previous/next never reorder
//! anything.

use aria_core::{Track, TrackId};

/// Outcome of removing a track from the queue
///
/// Tells the player how the current slot was affected so it can emit the
/// right events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Removal {
    /// The track was not in the queue
    NotFound,

    /// A track before the current one was removed; the index shifted down
    /// but still points at the same track
    BeforeCurrent,

    /// The current track was removed; the index snapped to the same slot
    /// (wrapping to 0 past the end) and a new track occupies it
    CurrentReplaced {
        /// The snapped index
        index: usize,
    },

    /// The current track was the last one left; the queue is now empty
    CurrentCleared,

    /// A track at or after the current slot was removed, or there was no
    /// current track; the index is unaffected
    Unaffected,
}

/// Ordered playback queue with a current slot
///
/// Invariant: `current_index` is `Some(i)` with `i < tracks.len()`, or
/// `None` when no slot is active.
#[derive(Debug, Clone, Default)]
pub struct Queue {
    /// Tracks in playback order
    tracks: Vec<Track>,

    /// Index of the slot currently playing
    current_index: Option<usize>,
}

impl Queue {
    /// Create a new empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the queue contents and point at the slot holding `track_id`
    ///
    /// Returns the resolved index; `None` when the track is absent (the
    /// caller contract requires it to be present, but a stale catalog
    /// snapshot may violate that and we degrade instead of failing).
    pub fn set(&mut self, tracks: Vec<Track>, track_id: &TrackId) -> Option<usize> {
        self.tracks = tracks;
        self.current_index = self.position_of(track_id);
        self.current_index
    }

    /// Find the slot holding `track_id`
    pub fn position_of(&self, track_id: &TrackId) -> Option<usize> {
        self.tracks.iter().position(|t| &t.id == track_id)
    }

    /// Track at the current slot
    pub fn current(&self) -> Option<&Track> {
        self.current_index.and_then(|i| self.tracks.get(i))
    }

    /// Index of the current slot
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Move the current slot to `index`
    ///
    /// Returns the track now current, or `None` (no change) for an
    /// out-of-bounds index.
    pub fn jump_to(&mut self, index: usize) -> Option<&Track> {
        if index < self.tracks.len() {
            self.current_index = Some(index);
            self.tracks.get(index)
        } else {
            None
        }
    }

    /// Track at `index`
    pub fn get(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// All tracks in queue order
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Number of tracks in the queue
    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Append tracks to the end of the queue
    pub fn append(&mut self, tracks: Vec<Track>) {
        self.tracks.extend(tracks);
    }

    /// Remove the first track with `track_id`
    ///
    /// Snapping rule when the current track is removed: the index stays at
    /// the same slot so the track that followed starts occupying it, wrapping
    /// to 0 when the removed track was last. Removing the only track clears
    /// the queue to the empty/no-slot state.
    pub fn remove(&mut self, track_id: &TrackId) -> Removal {
        let Some(index) = self.position_of(track_id) else {
            return Removal::NotFound;
        };

        self.tracks.remove(index);

        match self.current_index {
            Some(current) if index < current => {
                self.current_index = Some(current - 1);
                Removal::BeforeCurrent
            }
            Some(current) if index == current => {
                if self.tracks.is_empty() {
                    self.current_index = None;
                    Removal::CurrentCleared
                } else {
                    let snapped = if current >= self.tracks.len() { 0 } else { current };
                    self.current_index = Some(snapped);
                    Removal::CurrentReplaced { index: snapped }
                }
            }
            _ => Removal::Unaffected,
        }
    }

    /// Clear the queue and the current slot
    pub fn clear(&mut self) {
        self.tracks.clear();
        self.current_index = None;
    }

    /// Replace the queue contents without selecting a slot
    pub fn replace(&mut self, tracks: Vec<Track>) {
        self.tracks = tracks;
        self.current_index = None;
    }

    /// Replace the track order, keeping `index` as the current slot
    ///
    /// Used by the shuffle transition, which reorders tracks and pins the
    /// playing track at the head.
    pub(crate) fn reorder(&mut self, tracks: Vec<Track>, index: usize) {
        debug_assert!(index < tracks.len());
        self.tracks = tracks;
        self.current_index = Some(index);
    }
}
