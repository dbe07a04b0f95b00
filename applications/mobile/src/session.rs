//! Player session - the single owner of player state
//!
//! `PlayerSession` wires the pure state machine to the audio engine and the
//! UI surfaces. It is constructed once at app startup and handed to every
//! consumer explicitly; there is no ambient global store. All transitions
//! funnel through one internal apply path, which runs them under one lock
//! and then routes the resulting events - engine directives out over the
//! command channel, change notifications out over a broadcast channel both
//! surfaces subscribe to.

use aria_audio::{spawn_engine, EngineCommand, EngineEvent, EngineHandle, StreamBackend};
use aria_core::{Track, TrackId};
use aria_playback::{Player, PlayerConfig, PlayerEvent, PlayerSnapshot, RepeatMode};
use std::sync::{Arc, Mutex, Weak};
use std::time::Duration;
use tokio::sync::broadcast;

/// Capacity of the UI event fan-out channel
///
/// Slow surfaces that lag this far behind skip to the live edge; they
/// re-sync from the next snapshot read.
const EVENT_CHANNEL_CAPACITY: usize = 256;

/// The dependency-injected owner of the player state
///
/// Lifecycle: created once per app session, torn down when the last handle
/// drops (the engine is shut down explicitly via [`PlayerSession::shutdown`]).
pub struct PlayerSession {
    player: Mutex<Player>,
    engine: EngineHandle,
    events: broadcast::Sender<PlayerEvent>,
}

impl PlayerSession {
    /// Create a session over an audio backend
    ///
    /// Spawns the audio engine and the task that feeds its reports back into
    /// the state machine.
    pub fn new(config: PlayerConfig, backend: Arc<dyn StreamBackend>) -> Arc<Self> {
        let position_interval = config.position_interval;
        let (engine, engine_events) = spawn_engine(backend, position_interval);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);

        let session = Arc::new(Self {
            player: Mutex::new(Player::new(config)),
            engine,
            events,
        });

        tokio::spawn(pump_engine_events(
            Arc::downgrade(&session),
            engine_events,
        ));

        session
    }

    // ===== Playback Commands =====

    /// Play a track within a queue
    ///
    /// Passing `None` plays the track on its own (a queue of one), matching
    /// how catalog screens start playback from a single row.
    pub fn play_track(&self, track: Track, queue: Option<Vec<Track>>) {
        let queue = queue.unwrap_or_else(|| vec![track.clone()]);
        self.apply(|player| player.play_track(track, queue));
    }

    /// Pause playback
    pub fn pause(&self) {
        self.apply(Player::pause);
    }

    /// Resume playback
    pub fn resume(&self) {
        self.apply(Player::resume);
    }

    /// Stop playback and rewind
    pub fn stop(&self) {
        self.apply(Player::stop);
    }

    /// Skip to the next track
    pub fn next(&self) {
        self.apply(Player::next);
    }

    /// Go to the previous track (or restart the current one)
    pub fn previous(&self) {
        self.apply(Player::previous);
    }

    /// Seek within the current track
    pub fn seek_to(&self, position: Duration) {
        self.apply(|player| player.seek_to(position));
    }

    /// Set volume in [0.0, 1.0]
    pub fn set_volume(&self, volume: f32) {
        self.apply(|player| player.set_volume(volume));
    }

    /// Set repeat mode
    pub fn set_repeat(&self, repeat: RepeatMode) {
        self.apply(|player| player.set_repeat(repeat));
    }

    /// Toggle shuffle
    pub fn toggle_shuffle(&self) {
        self.apply(Player::toggle_shuffle);
    }

    // ===== Queue Commands =====

    /// Append tracks to the queue
    pub fn add_to_queue(&self, tracks: Vec<Track>) {
        self.apply(|player| player.add_to_queue(tracks));
    }

    /// Remove a track from the queue
    pub fn remove_from_queue(&self, track_id: &TrackId) {
        self.apply(|player| player.remove_from_queue(track_id));
    }

    /// Clear the queue
    pub fn clear_queue(&self) {
        self.apply(Player::clear_queue);
    }

    /// Replace the queue without starting playback
    pub fn replace_queue(&self, tracks: Vec<Track>) {
        self.apply(|player| player.replace_queue(tracks));
    }

    // ===== Reads =====

    /// Read-only snapshot for rendering
    pub fn snapshot(&self) -> PlayerSnapshot {
        self.player.lock().unwrap().snapshot()
    }

    /// Subscribe to player events
    ///
    /// Both UI surfaces listen here; neither keeps position state of its own.
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.events.subscribe()
    }

    // ===== Teardown =====

    /// Stop the audio engine
    pub fn shutdown(&self) {
        self.engine.send(EngineCommand::Shutdown);
    }

    // ===== Internal =====

    /// Run a transition under the lock, then route the emitted events
    ///
    /// Transitions are atomic with respect to each other: engine reports and
    /// UI commands both come through here, one at a time.
    fn apply<R>(&self, transition: impl FnOnce(&mut Player) -> R) -> R {
        let (result, events) = {
            let mut player = self.player.lock().unwrap();
            let result = transition(&mut player);
            (result, player.take_events())
        };

        for event in events {
            self.route(event);
        }
        result
    }

    /// Translate a player event into its engine directive and fan it out
    fn route(&self, event: PlayerEvent) {
        match &event {
            PlayerEvent::TrackChanged {
                track: Some(track),
                autoplay,
            } => {
                self.engine.send(EngineCommand::Load {
                    track: track.clone(),
                    autoplay: *autoplay,
                });
            }
            PlayerEvent::TrackChanged { track: None, .. } => {
                self.engine.send(EngineCommand::Unload);
            }
            PlayerEvent::PlaybackChanged { is_playing } => {
                self.engine.send(EngineCommand::SetPlaying(*is_playing));
            }
            PlayerEvent::Seeked { position } => {
                self.engine.send(EngineCommand::Seek(*position));
            }
            PlayerEvent::VolumeChanged { volume } => {
                self.engine.send(EngineCommand::SetVolume(*volume));
            }
            // Display-only events: PositionChanged, DurationChanged,
            // QueueChanged, ModesChanged
            _ => {}
        }

        // No subscribers yet is fine
        let _ = self.events.send(event);
    }

    /// Feed one engine report into the state machine
    fn handle_engine_event(&self, event: EngineEvent) {
        match event {
            EngineEvent::Loaded { track_id, duration } => {
                if let Some(duration) = duration {
                    self.apply(|player| {
                        // A stale report for a track we already left is dropped
                        if player.current_track().map(|t| &t.id) == Some(&track_id) {
                            player.set_duration(duration);
                        }
                    });
                }
            }
            EngineEvent::LoadFailed { track_id, message } => {
                // Policy: log and leave the UI showing the intended track.
                // No auto-skip - a systemic failure would otherwise storm
                // through the whole queue.
                tracing::warn!(track = %track_id, %message, "track failed to load");
            }
            EngineEvent::Position {
                track_id,
                position,
                finished,
            } => {
                self.apply(|player| {
                    if player.current_track().map(|t| &t.id) != Some(&track_id) {
                        return;
                    }
                    // A finished resource may stop just short of the declared
                    // duration; clamp up so the end-of-track transition fires
                    let position = if finished {
                        position.max(player.duration())
                    } else {
                        position
                    };
                    player.update_position(position);
                });
            }
        }
    }
}

/// Pump engine reports into the session until either side goes away
async fn pump_engine_events(
    session: Weak<PlayerSession>,
    mut events: tokio::sync::mpsc::UnboundedReceiver<EngineEvent>,
) {
    while let Some(event) = events.recv().await {
        let Some(session) = session.upgrade() else {
            break;
        };
        session.handle_engine_event(event);
    }
}
