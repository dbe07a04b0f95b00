//! Player state machine - core orchestration
//!
//! Owns the queue, playback status, and mode flags, and exposes every
//! transition the UI and the audio engine drive. Transitions are synchronous
//! and pure: they mutate state and append [`PlayerEvent`]s, and never touch
//! the audio resource themselves. The session layer drains the events and
//! forwards them to the engine and the UI surfaces, which keeps the state
//! machine testable without any audio backend.

use crate::{
    events::PlayerEvent,
    queue::{Queue, Removal},
    shuffle::shuffle_keeping_current,
    types::{PlayerConfig, RepeatMode},
};
use aria_core::{Track, TrackId};
use rand::seq::SliceRandom;
use rand::thread_rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Going back within this window steps to the previous track; beyond it the
/// current track restarts instead ("restart before back").
const RESTART_THRESHOLD: Duration = Duration::from_secs(3);

/// Read-only view of the player state
///
/// Handed to UI surfaces so they render from one shared source of truth
/// instead of tracking position or modes on their own.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    /// Track the player is pointed at
    pub current_track: Option<Track>,

    /// Play/pause flag
    pub is_playing: bool,

    /// Elapsed playback position
    pub position: Duration,

    /// Track duration (authoritative once the audio resource reported it)
    pub duration: Duration,

    /// Volume in [0.0, 1.0]
    pub volume: f32,

    /// Repeat mode
    pub repeat: RepeatMode,

    /// Shuffle state
    pub shuffle: bool,

    /// Queue length
    pub queue_length: usize,

    /// Index of the current queue slot
    pub current_index: Option<usize>,

    /// Whether a next() call would change tracks or keep playing
    pub has_next: bool,

    /// Whether a previous() call would restart or change tracks
    pub has_previous: bool,
}

/// Central player state machine
///
/// Created once per app session with an empty queue, owned by the session
/// layer, and never persisted. Every mutation goes through the operations
/// below; callers read state back through the accessors or [`Player::snapshot`].
pub struct Player {
    // Queue and current slot
    queue: Queue,
    current_track: Option<Track>,

    // Playback status
    is_playing: bool,
    position: Duration,
    duration: Duration,
    volume: f32,

    // Modes
    repeat: RepeatMode,
    shuffle: bool,

    // Event buffer drained by the session layer
    pending_events: Vec<PlayerEvent>,
}

impl Player {
    /// Create a new player
    pub fn new(config: PlayerConfig) -> Self {
        Self {
            queue: Queue::new(),
            current_track: None,
            is_playing: false,
            position: Duration::ZERO,
            duration: Duration::ZERO,
            volume: config.volume.clamp(0.0, 1.0),
            repeat: config.repeat,
            shuffle: config.shuffle,
            pending_events: Vec::new(),
        }
    }

    // ===== Playback Control =====

    /// Start playing `track` within `queue`
    ///
    /// The caller contract requires `track` to be present in `queue`; when a
    /// stale catalog snapshot violates that, the slot index degrades to none
    /// and navigation becomes a no-op, but the requested track still becomes
    /// current so the UI reflects the user's intent.
    pub fn play_track(&mut self, track: Track, queue: Vec<Track>) {
        let length = queue.len();
        self.queue.set(queue, &track.id);

        self.current_track = Some(track.clone());
        self.position = Duration::ZERO;
        self.duration = track.duration();

        self.emit(PlayerEvent::QueueChanged { length });
        self.emit(PlayerEvent::TrackChanged {
            track: Some(track),
            autoplay: true,
        });
        self.emit(PlayerEvent::DurationChanged {
            duration: self.duration,
        });
        self.set_playing(true);
    }

    /// Pause playback
    pub fn pause(&mut self) {
        self.set_playing(false);
    }

    /// Resume playback
    ///
    /// No-op when no track is current.
    pub fn resume(&mut self) {
        if self.current_track.is_some() {
            self.set_playing(true);
        }
    }

    /// Stop playback and rewind to the start of the current track
    pub fn stop(&mut self) {
        self.set_playing(false);
        self.position = Duration::ZERO;
        self.emit(PlayerEvent::Seeked {
            position: Duration::ZERO,
        });
    }

    /// Skip to the next track
    ///
    /// Shuffle picks uniformly among the other queue slots; sequential
    /// playback advances by one, wrapping when repeat-all is on. At the end
    /// of the queue without a wrap the player stays on the last track and
    /// pauses.
    pub fn next(&mut self) {
        let Some(current) = self.queue.current_index() else {
            return;
        };

        if self.shuffle {
            let candidates: Vec<usize> =
                (0..self.queue.len()).filter(|i| *i != current).collect();
            if let Some(&target) = candidates.choose(&mut thread_rng()) {
                self.change_to_slot(target);
            }
        } else if current + 1 < self.queue.len() {
            self.change_to_slot(current + 1);
        } else if self.repeat == RepeatMode::All {
            self.change_to_slot(0);
        } else {
            // End of queue, no wrap: keep the slot, stop playing
            self.set_playing(false);
        }
    }

    /// Go to the previous track
    ///
    /// More than three seconds into the current track restarts it instead of
    /// stepping back. At the head of the queue, repeat-all wraps to the last
    /// slot; otherwise this is a no-op.
    pub fn previous(&mut self) {
        if self.current_track.is_some() && self.position > RESTART_THRESHOLD {
            self.position = Duration::ZERO;
            self.emit(PlayerEvent::Seeked {
                position: Duration::ZERO,
            });
            return;
        }

        let Some(current) = self.queue.current_index() else {
            return;
        };

        if current > 0 {
            self.change_to_slot(current - 1);
        } else if self.repeat == RepeatMode::All && !self.queue.is_empty() {
            self.change_to_slot(self.queue.len() - 1);
        }
    }

    // ===== Position & Duration =====

    /// Seek to a position in the current track
    ///
    /// The target is clamped into `[0, duration]`; out-of-range values are
    /// never an error.
    pub fn seek_to(&mut self, position: Duration) {
        let clamped = position.min(self.duration);
        self.position = clamped;
        self.emit(PlayerEvent::Seeked { position: clamped });
    }

    /// Authoritative duration update from the audio resource
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration = duration;
        if self.position > duration {
            self.position = duration;
        }
        self.emit(PlayerEvent::DurationChanged { duration });
    }

    /// Periodic position report from the audio resource
    ///
    /// This is the sole auto-advance trigger: when the reported position
    /// reaches the duration, repeat-one rewinds in place (with an explicit
    /// seek so the resource restarts) and every other mode runs the
    /// [`Player::next`] transition.
    pub fn update_position(&mut self, position: Duration) {
        self.position = position;
        self.emit(PlayerEvent::PositionChanged { position });

        if self.duration > Duration::ZERO && position >= self.duration {
            if self.repeat == RepeatMode::One {
                self.position = Duration::ZERO;
                self.emit(PlayerEvent::Seeked {
                    position: Duration::ZERO,
                });
            } else {
                self.next();
            }
        }
    }

    // ===== Modes & Volume =====

    /// Set repeat mode
    pub fn set_repeat(&mut self, repeat: RepeatMode) {
        self.repeat = repeat;
        self.emit_modes();
    }

    /// Toggle shuffle
    ///
    /// Turning shuffle on reorders the queue with the current track pinned
    /// at the head (slot 0). Turning it off keeps the shuffled order: the
    /// original sequence is not snapshotted anywhere to restore from.
    pub fn toggle_shuffle(&mut self) {
        self.shuffle = !self.shuffle;

        if self.shuffle {
            if let Some(current) = self.current_track.clone() {
                let reordered = shuffle_keeping_current(self.queue.tracks(), &current);
                self.queue.reorder(reordered, 0);
                self.emit(PlayerEvent::QueueChanged {
                    length: self.queue.len(),
                });
            }
        }

        self.emit_modes();
    }

    /// Set volume, clamped into [0.0, 1.0]
    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.emit(PlayerEvent::VolumeChanged {
            volume: self.volume,
        });
    }

    // ===== Queue Maintenance =====

    /// Append tracks to the end of the queue
    pub fn add_to_queue(&mut self, tracks: Vec<Track>) {
        if tracks.is_empty() {
            return;
        }
        self.queue.append(tracks);
        self.emit(PlayerEvent::QueueChanged {
            length: self.queue.len(),
        });
    }

    /// Remove a track from the queue
    ///
    /// Removing the currently playing track adopts the track that snapped
    /// into its slot (wrapping to the head past the end) and preserves the
    /// play/pause flag; removing the last remaining track clears the player
    /// to the empty state.
    pub fn remove_from_queue(&mut self, track_id: &TrackId) {
        match self.queue.remove(track_id) {
            Removal::NotFound => {}
            Removal::BeforeCurrent | Removal::Unaffected => {
                self.emit(PlayerEvent::QueueChanged {
                    length: self.queue.len(),
                });
            }
            Removal::CurrentReplaced { index } => {
                self.emit(PlayerEvent::QueueChanged {
                    length: self.queue.len(),
                });
                // Adopt the track that snapped into the slot; the play/pause
                // flag is deliberately preserved.
                self.change_to_slot(index);
            }
            Removal::CurrentCleared => {
                self.emit(PlayerEvent::QueueChanged { length: 0 });
                self.clear_current();
            }
        }
    }

    /// Clear the entire queue and stop playback
    pub fn clear_queue(&mut self) {
        if self.queue.is_empty() && self.current_track.is_none() {
            return;
        }
        self.queue.clear();
        self.emit(PlayerEvent::QueueChanged { length: 0 });
        self.clear_current();
    }

    /// Replace the queue contents without starting playback
    ///
    /// The new queue has no active slot until the next `play_track`.
    pub fn replace_queue(&mut self, tracks: Vec<Track>) {
        self.queue.replace(tracks);
        self.emit(PlayerEvent::QueueChanged {
            length: self.queue.len(),
        });
        self.clear_current();
    }

    // ===== State Queries =====

    /// Currently active track
    pub fn current_track(&self) -> Option<&Track> {
        self.current_track.as_ref()
    }

    /// Play/pause flag
    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Elapsed playback position
    pub fn position(&self) -> Duration {
        self.position
    }

    /// Current track duration
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Volume in [0.0, 1.0]
    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Repeat mode
    pub fn repeat(&self) -> RepeatMode {
        self.repeat
    }

    /// Shuffle state
    pub fn shuffle(&self) -> bool {
        self.shuffle
    }

    /// Tracks in queue order
    pub fn queue(&self) -> &[Track] {
        self.queue.tracks()
    }

    /// Index of the current queue slot
    pub fn current_index(&self) -> Option<usize> {
        self.queue.current_index()
    }

    /// Queue length
    pub fn queue_length(&self) -> usize {
        self.queue.len()
    }

    /// Whether a next() call would change tracks or keep playing
    pub fn has_next(&self) -> bool {
        match self.queue.current_index() {
            Some(current) => {
                if self.shuffle {
                    self.queue.len() > 1
                } else {
                    current + 1 < self.queue.len() || self.repeat == RepeatMode::All
                }
            }
            None => false,
        }
    }

    /// Whether a previous() call would restart or change tracks
    pub fn has_previous(&self) -> bool {
        if self.current_track.is_some() && self.position > RESTART_THRESHOLD {
            return true;
        }
        match self.queue.current_index() {
            Some(current) => {
                current > 0 || (self.repeat == RepeatMode::All && !self.queue.is_empty())
            }
            None => false,
        }
    }

    /// Read-only view for UI surfaces
    pub fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            current_track: self.current_track.clone(),
            is_playing: self.is_playing,
            position: self.position,
            duration: self.duration,
            volume: self.volume,
            repeat: self.repeat,
            shuffle: self.shuffle,
            queue_length: self.queue.len(),
            current_index: self.queue.current_index(),
            has_next: self.has_next(),
            has_previous: self.has_previous(),
        }
    }

    // ===== Events =====

    /// Drain the pending event buffer
    ///
    /// Called by the session layer after every transition (or batch of
    /// transitions); events come out in emission order.
    pub fn take_events(&mut self) -> Vec<PlayerEvent> {
        std::mem::take(&mut self.pending_events)
    }

    // ===== Internal Transitions =====

    /// Move to queue slot `index` and make its track current
    fn change_to_slot(&mut self, index: usize) {
        let Some(track) = self.queue.jump_to(index).cloned() else {
            return;
        };

        self.current_track = Some(track.clone());
        self.position = Duration::ZERO;
        self.duration = track.duration();

        self.emit(PlayerEvent::TrackChanged {
            track: Some(track),
            autoplay: self.is_playing,
        });
        self.emit(PlayerEvent::DurationChanged {
            duration: self.duration,
        });
    }

    /// Reset to the no-track state
    fn clear_current(&mut self) {
        self.current_track = None;
        self.position = Duration::ZERO;
        self.duration = Duration::ZERO;
        self.emit(PlayerEvent::TrackChanged {
            track: None,
            autoplay: false,
        });
        self.set_playing(false);
    }

    /// Flip the play/pause flag, emitting only on an actual change
    fn set_playing(&mut self, playing: bool) {
        if self.is_playing != playing {
            self.is_playing = playing;
            self.emit(PlayerEvent::PlaybackChanged {
                is_playing: playing,
            });
        }
    }

    fn emit(&mut self, event: PlayerEvent) {
        self.pending_events.push(event);
    }

    fn emit_modes(&mut self) {
        self.emit(PlayerEvent::ModesChanged {
            repeat: self.repeat,
            shuffle: self.shuffle,
        });
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new(PlayerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aria_core::ArtistId;

    fn track(id: &str) -> Track {
        Track::new(
            TrackId::new(id),
            format!("Track {id}"),
            ArtistId::new("a-1"),
            "Test Artist",
            format!("https://cdn.example.com/audio/{id}.mp3"),
            Duration::from_secs(180),
        )
    }

    fn three_track_player() -> Player {
        let mut player = Player::default();
        let queue = vec![track("a"), track("b"), track("c")];
        player.play_track(queue[0].clone(), queue);
        player.take_events();
        player
    }

    #[test]
    fn play_track_activates_queue_slot() {
        let mut player = Player::default();
        let queue = vec![track("a"), track("b"), track("c")];

        player.play_track(queue[1].clone(), queue);

        assert_eq!(player.current_track().unwrap().id, TrackId::new("b"));
        assert_eq!(player.current_index(), Some(1));
        assert!(player.is_playing());
        assert_eq!(player.position(), Duration::ZERO);
    }

    #[test]
    fn play_track_outside_queue_degrades_to_no_slot() {
        let mut player = Player::default();
        let orphan = track("orphan");

        player.play_track(orphan.clone(), vec![track("a"), track("b")]);

        // The intent is reflected, navigation has nothing to walk
        assert_eq!(player.current_track().unwrap().id, orphan.id);
        assert_eq!(player.current_index(), None);
        player.next();
        assert_eq!(player.current_track().unwrap().id, orphan.id);
    }

    #[test]
    fn resume_without_track_is_a_no_op() {
        let mut player = Player::default();
        player.resume();
        assert!(!player.is_playing());
        assert!(player.take_events().is_empty());
    }

    #[test]
    fn pause_when_paused_emits_nothing() {
        let mut player = three_track_player();
        player.pause();
        player.take_events();

        player.pause();
        assert!(player.take_events().is_empty());
    }

    #[test]
    fn stop_rewinds_and_pauses() {
        let mut player = three_track_player();
        player.update_position(Duration::from_secs(42));

        player.stop();

        assert!(!player.is_playing());
        assert_eq!(player.position(), Duration::ZERO);
    }

    #[test]
    fn seek_clamps_to_duration() {
        let mut player = three_track_player();

        player.seek_to(Duration::from_secs(9999));
        assert_eq!(player.position(), Duration::from_secs(180));

        player.seek_to(Duration::from_secs(30));
        assert_eq!(player.position(), Duration::from_secs(30));
    }

    #[test]
    fn set_duration_clamps_position_back() {
        let mut player = three_track_player();
        player.seek_to(Duration::from_secs(170));

        player.set_duration(Duration::from_secs(90));

        assert_eq!(player.duration(), Duration::from_secs(90));
        assert_eq!(player.position(), Duration::from_secs(90));
    }

    #[test]
    fn next_at_queue_end_pauses_without_moving() {
        let mut player = three_track_player();
        player.next();
        player.next();
        assert_eq!(player.current_index(), Some(2));

        player.next();

        assert_eq!(player.current_index(), Some(2));
        assert_eq!(player.current_track().unwrap().id, TrackId::new("c"));
        assert!(!player.is_playing());
    }

    #[test]
    fn next_with_repeat_all_wraps() {
        let mut player = three_track_player();
        player.set_repeat(RepeatMode::All);
        player.next();
        player.next();

        player.next();

        assert_eq!(player.current_index(), Some(0));
        assert!(player.is_playing());
    }

    #[test]
    fn shuffle_next_moves_to_a_different_slot() {
        let mut player = three_track_player();
        player.toggle_shuffle();
        let before = player.current_index().unwrap();

        player.next();

        assert_ne!(player.current_index().unwrap(), before);
        assert_eq!(player.position(), Duration::ZERO);
    }

    #[test]
    fn shuffle_next_on_single_track_queue_is_a_no_op() {
        let mut player = Player::default();
        let only = track("only");
        player.play_track(only.clone(), vec![only.clone()]);
        player.toggle_shuffle();

        player.next();

        assert_eq!(player.current_track().unwrap().id, only.id);
        assert!(player.is_playing());
    }

    #[test]
    fn previous_restarts_when_past_threshold() {
        let mut player = three_track_player();
        player.next();
        player.update_position(Duration::from_secs(5));

        player.previous();

        assert_eq!(player.position(), Duration::ZERO);
        assert_eq!(player.current_index(), Some(1));
    }

    #[test]
    fn previous_steps_back_early_in_track() {
        let mut player = three_track_player();
        player.next();
        player.update_position(Duration::from_secs(1));

        player.previous();

        assert_eq!(player.current_index(), Some(0));
    }

    #[test]
    fn previous_at_head_wraps_only_with_repeat_all() {
        let mut player = three_track_player();

        player.previous();
        assert_eq!(player.current_index(), Some(0));

        player.set_repeat(RepeatMode::All);
        player.previous();
        assert_eq!(player.current_index(), Some(2));
    }

    #[test]
    fn repeat_one_loops_in_place_on_track_end() {
        let mut player = three_track_player();
        player.set_repeat(RepeatMode::One);

        player.update_position(Duration::from_secs(180));

        assert_eq!(player.position(), Duration::ZERO);
        assert_eq!(player.current_track().unwrap().id, TrackId::new("a"));
        assert!(player.is_playing());
    }

    #[test]
    fn track_end_auto_advances() {
        let mut player = three_track_player();

        player.update_position(Duration::from_secs(180));

        assert_eq!(player.current_index(), Some(1));
        assert_eq!(player.position(), Duration::ZERO);
        assert!(player.is_playing());
    }

    #[test]
    fn track_end_at_queue_tail_pauses() {
        let mut player = three_track_player();
        player.next();
        player.next();

        player.update_position(Duration::from_secs(180));

        assert!(!player.is_playing());
        assert_eq!(player.current_index(), Some(2));
    }

    #[test]
    fn toggle_shuffle_pins_current_at_head() {
        let mut player = Player::default();
        let queue = vec![track("a"), track("b"), track("c"), track("d")];
        player.play_track(queue[2].clone(), queue);

        player.toggle_shuffle();

        assert_eq!(player.queue_length(), 4);
        assert_eq!(player.queue()[0].id, TrackId::new("c"));
        assert_eq!(player.current_index(), Some(0));
        assert!(player.shuffle());
    }

    #[test]
    fn untoggle_shuffle_keeps_current_order() {
        let mut player = three_track_player();
        player.toggle_shuffle();
        let shuffled: Vec<TrackId> = player.queue().iter().map(|t| t.id.clone()).collect();

        player.toggle_shuffle();

        let after: Vec<TrackId> = player.queue().iter().map(|t| t.id.clone()).collect();
        assert!(!player.shuffle());
        assert_eq!(shuffled, after);
    }

    #[test]
    fn volume_is_clamped() {
        let mut player = Player::default();

        player.set_volume(1.8);
        assert_eq!(player.volume(), 1.0);

        player.set_volume(-0.3);
        assert_eq!(player.volume(), 0.0);
    }

    #[test]
    fn removing_current_track_preserves_play_flag() {
        let mut player = three_track_player();
        player.next(); // now at b, playing

        player.remove_from_queue(&TrackId::new("b"));

        assert_eq!(player.current_track().unwrap().id, TrackId::new("c"));
        assert_eq!(player.current_index(), Some(1));
        assert!(player.is_playing());
    }

    #[test]
    fn removing_last_remaining_track_clears_player() {
        let mut player = Player::default();
        let only = track("only");
        player.play_track(only.clone(), vec![only]);

        player.remove_from_queue(&TrackId::new("only"));

        assert!(player.current_track().is_none());
        assert_eq!(player.current_index(), None);
        assert!(!player.is_playing());
        assert_eq!(player.queue_length(), 0);
    }

    #[test]
    fn replace_queue_deactivates_playback() {
        let mut player = three_track_player();

        player.replace_queue(vec![track("x"), track("y")]);

        assert_eq!(player.queue_length(), 2);
        assert_eq!(player.current_index(), None);
        assert!(player.current_track().is_none());
        assert!(!player.is_playing());
    }

    #[test]
    fn events_carry_engine_directives_in_order() {
        let mut player = Player::default();
        let queue = vec![track("a"), track("b")];
        player.play_track(queue[0].clone(), queue);

        let events = player.take_events();
        assert!(matches!(
            events[0],
            PlayerEvent::QueueChanged { length: 2 }
        ));
        assert!(matches!(
            &events[1],
            PlayerEvent::TrackChanged {
                track: Some(t),
                autoplay: true,
            } if t.id == TrackId::new("a")
        ));

        // Buffer drained
        assert!(player.take_events().is_empty());
    }
}
