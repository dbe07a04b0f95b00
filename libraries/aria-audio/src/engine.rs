//! Audio engine - single-slot resource orchestration
//!
//! The engine is a task that keeps exactly one sound resource consistent
//! with the player's declared state. It is driven by [`EngineCommand`]s and
//! answers with [`EngineEvent`]s; the session layer translates player events
//! into commands and engine events back into player transitions, so neither
//! side ever calls into the other directly.
//!
//! Loads are fenced with a generation counter: every `Load`/`Unload` bumps
//! the generation, and a completing load whose generation is stale drops its
//! resource without starting it. Play/pause/seek/volume received while a
//! load is in flight update the *latest intent*, applied once the load
//! resolves - never the intent captured at request time.

use crate::sound::{Sound, StreamBackend};
use aria_core::{Track, TrackId};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Commands sent to the engine task
#[derive(Debug, Clone)]
pub enum EngineCommand {
    /// Acquire a resource for `track`, releasing whatever is installed
    Load {
        /// Track whose `audio_url` to open
        track: Track,
        /// Whether playback should start once the resource is ready
        autoplay: bool,
    },

    /// Release the installed resource (and supersede any in-flight load)
    Unload,

    /// Start or pause the installed resource
    SetPlaying(bool),

    /// Move the play cursor
    Seek(Duration),

    /// Set volume in [0.0, 1.0]
    SetVolume(f32),

    /// Stop the engine task
    Shutdown,
}

/// Events emitted by the engine task
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// A load resolved and the resource is installed
    Loaded {
        /// Track the resource belongs to
        track_id: TrackId,
        /// Authoritative duration, when the container declares one
        duration: Option<Duration>,
    },

    /// A load failed; the slot stays empty
    ///
    /// The engine never skips ahead on its own - reacting (or not) is the
    /// caller's policy decision.
    LoadFailed {
        /// Track that failed to load
        track_id: TrackId,
        /// Human-readable failure description
        message: String,
    },

    /// Periodic position report for the installed resource
    Position {
        /// Track the resource belongs to
        track_id: TrackId,
        /// Current play cursor
        position: Duration,
        /// Whether the resource has consumed all decoded audio
        finished: bool,
    },
}

/// Handle for sending commands to a running engine
#[derive(Clone)]
pub struct EngineHandle {
    commands: mpsc::UnboundedSender<EngineCommand>,
}

impl EngineHandle {
    /// Send a command to the engine
    ///
    /// Sending after shutdown is a no-op; the session is tearing down anyway.
    pub fn send(&self, command: EngineCommand) {
        if self.commands.send(command).is_err() {
            tracing::debug!("engine command dropped: task stopped");
        }
    }
}

/// Result of an async load, tagged with its fencing generation
struct LoadOutcome {
    generation: u64,
    track_id: TrackId,
    result: crate::error::Result<Box<dyn Sound>>,
}

/// The engine task state
///
/// Owns the single resource slot. All mutation happens inside the run loop,
/// so slot transitions are serialized by construction.
struct Engine {
    backend: Arc<dyn StreamBackend>,

    // Installed resource, if any
    slot: Option<(TrackId, Box<dyn Sound>)>,

    // Fencing generation; bumped by Load and Unload
    generation: u64,

    // Latest intent, applied to the slot now or at load completion
    desired_playing: bool,
    desired_volume: f32,
    pending_seek: Option<Duration>,

    events: mpsc::UnboundedSender<EngineEvent>,
    load_outcomes: mpsc::UnboundedSender<LoadOutcome>,
}

/// Spawn the engine task
///
/// Returns the command handle and the event stream. `position_interval` is
/// the cadence of `Position` reports while the resource is meant to be
/// playing.
pub fn spawn_engine(
    backend: Arc<dyn StreamBackend>,
    position_interval: Duration,
) -> (EngineHandle, mpsc::UnboundedReceiver<EngineEvent>) {
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();

    let engine = Engine {
        backend,
        slot: None,
        generation: 0,
        desired_playing: false,
        desired_volume: 1.0,
        pending_seek: None,
        events: event_tx,
        load_outcomes: outcome_tx,
    };

    tokio::spawn(engine.run(command_rx, outcome_rx, position_interval));

    (
        EngineHandle {
            commands: command_tx,
        },
        event_rx,
    )
}

impl Engine {
    async fn run(
        mut self,
        mut commands: mpsc::UnboundedReceiver<EngineCommand>,
        mut outcomes: mpsc::UnboundedReceiver<LoadOutcome>,
        position_interval: Duration,
    ) {
        let mut ticker = tokio::time::interval(position_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                command = commands.recv() => {
                    match command {
                        Some(EngineCommand::Shutdown) | None => break,
                        Some(command) => self.handle_command(command),
                    }
                }
                Some(outcome) = outcomes.recv() => {
                    self.handle_load_outcome(outcome);
                }
                _ = ticker.tick() => {
                    self.report_position();
                }
            }
        }

        // Dropping the slot releases the resource on the way out
        self.slot = None;
    }

    fn handle_command(&mut self, command: EngineCommand) {
        match command {
            EngineCommand::Load { track, autoplay } => self.begin_load(track, autoplay),
            EngineCommand::Unload => {
                self.generation += 1;
                self.pending_seek = None;
                if self.slot.take().is_some() {
                    tracing::debug!("slot released");
                }
            }
            EngineCommand::SetPlaying(playing) => {
                self.desired_playing = playing;
                if let Some((_, sound)) = &mut self.slot {
                    if playing {
                        sound.play();
                    } else {
                        sound.pause();
                    }
                }
                // With a load in flight, the new intent is applied on
                // completion instead
            }
            EngineCommand::Seek(position) => {
                if let Some((_, sound)) = &mut self.slot {
                    sound.seek(position);
                } else {
                    self.pending_seek = Some(position);
                }
            }
            EngineCommand::SetVolume(volume) => {
                self.desired_volume = volume;
                if let Some((_, sound)) = &mut self.slot {
                    sound.set_volume(volume);
                }
            }
            EngineCommand::Shutdown => unreachable!("handled in run loop"),
        }
    }

    /// Release the slot and start an async load for `track`
    fn begin_load(&mut self, track: Track, autoplay: bool) {
        // Unload first; dropping the handle is the release
        self.slot = None;
        self.generation += 1;
        self.desired_playing = autoplay;
        self.pending_seek = None;

        let generation = self.generation;
        let track_id = track.id.clone();
        let url = track.audio_url.clone();
        let backend = Arc::clone(&self.backend);
        let outcomes = self.load_outcomes.clone();

        tracing::debug!(track = %track_id, generation, "load started");

        tokio::spawn(async move {
            let result = backend.open(&url).await;
            // The engine may be gone already; nothing to do then
            let _ = outcomes.send(LoadOutcome {
                generation,
                track_id,
                result,
            });
        });
    }

    /// Install or discard a resolved load
    fn handle_load_outcome(&mut self, outcome: LoadOutcome) {
        if outcome.generation != self.generation {
            // Superseded: the resource (if any) is dropped without ever
            // starting, which is the unload side effect the contract asks for
            tracing::debug!(
                track = %outcome.track_id,
                generation = outcome.generation,
                current = self.generation,
                "stale load discarded"
            );
            return;
        }

        match outcome.result {
            Ok(mut sound) => {
                sound.set_volume(self.desired_volume);
                if let Some(position) = self.pending_seek.take() {
                    sound.seek(position);
                }
                if self.desired_playing {
                    sound.play();
                }

                let duration = sound.duration();
                tracing::debug!(track = %outcome.track_id, ?duration, "load complete");

                self.slot = Some((outcome.track_id.clone(), sound));
                self.emit(EngineEvent::Loaded {
                    track_id: outcome.track_id,
                    duration,
                });
            }
            Err(error) => {
                tracing::warn!(track = %outcome.track_id, %error, "load failed");
                self.emit(EngineEvent::LoadFailed {
                    track_id: outcome.track_id,
                    message: error.to_string(),
                });
            }
        }
    }

    /// Emit a position report for the installed resource
    ///
    /// Reports only flow while playback is intended; a paused resource has
    /// nothing new to say.
    fn report_position(&mut self) {
        if !self.desired_playing {
            return;
        }
        if let Some((track_id, sound)) = &self.slot {
            self.events
                .send(EngineEvent::Position {
                    track_id: track_id.clone(),
                    position: sound.position(),
                    finished: sound.is_finished(),
                })
                .ok();
        }
    }

    fn emit(&self, event: EngineEvent) {
        self.events.send(event).ok();
    }
}
