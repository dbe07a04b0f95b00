//! Integration tests for the app-shell session
//!
//! Drive the full loop - UI command, state transition, engine directive,
//! engine report, state transition again - over a scripted backend, and
//! check that both surfaces stay projections of one shared state.

use aria_audio::{AudioError, Sound, StreamBackend};
use aria_core::{ArtistId, Track, TrackId};
use aria_mobile::{FullPlayer, MiniPlayer, PlayerSession};
use aria_playback::{PlayerConfig, RepeatMode};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{oneshot, Notify};

// ===== Test Helpers =====

fn track(id: &str, duration_secs: u64) -> Track {
    Track::new(
        TrackId::new(id),
        format!("Track {id}"),
        ArtistId::new("a-1"),
        "Test Artist",
        format!("https://cdn.example.com/audio/{id}.mp3"),
        Duration::from_secs(duration_secs),
    )
}

#[derive(Default)]
struct FakeSoundProbe {
    playing: AtomicBool,
    position_ms: AtomicU64,
    finished: AtomicBool,
    dropped: AtomicBool,
}

struct FakeSound {
    probe: Arc<FakeSoundProbe>,
    duration: Option<Duration>,
}

impl Sound for FakeSound {
    fn play(&mut self) {
        self.probe.playing.store(true, Ordering::SeqCst);
    }

    fn pause(&mut self) {
        self.probe.playing.store(false, Ordering::SeqCst);
    }

    fn seek(&mut self, position: Duration) {
        self.probe
            .position_ms
            .store(position.as_millis() as u64, Ordering::SeqCst);
        self.probe.finished.store(false, Ordering::SeqCst);
    }

    fn set_volume(&mut self, _volume: f32) {}

    fn position(&self) -> Duration {
        Duration::from_millis(self.probe.position_ms.load(Ordering::SeqCst))
    }

    fn duration(&self) -> Option<Duration> {
        self.duration
    }

    fn is_finished(&self) -> bool {
        self.probe.finished.load(Ordering::SeqCst)
    }
}

impl Drop for FakeSound {
    fn drop(&mut self) {
        self.probe.dropped.store(true, Ordering::SeqCst);
    }
}

type LoadReply = oneshot::Sender<aria_audio::Result<Box<dyn Sound>>>;

#[derive(Default)]
struct FakeBackend {
    pending: Mutex<VecDeque<(String, LoadReply)>>,
    arrived: Notify,
}

#[async_trait]
impl StreamBackend for FakeBackend {
    async fn open(&self, url: &str) -> aria_audio::Result<Box<dyn Sound>> {
        let (tx, rx) = oneshot::channel();
        self.pending
            .lock()
            .unwrap()
            .push_back((url.to_string(), tx));
        self.arrived.notify_waiters();

        rx.await
            .map_err(|_| AudioError::Request("load request dropped".into()))?
    }
}

impl FakeBackend {
    /// Wait for the next load request and return its URL
    async fn next_request_url(&self) -> String {
        loop {
            let waiter = self.arrived.notified();
            if let Some((url, _)) = self.pending.lock().unwrap().front() {
                return url.clone();
            }
            waiter.await;
        }
    }

    fn resolve_next(&self, duration: Option<Duration>) -> Arc<FakeSoundProbe> {
        let (_, reply) = self
            .pending
            .lock()
            .unwrap()
            .pop_front()
            .expect("no pending load to resolve");
        let probe = Arc::new(FakeSoundProbe::default());
        let _ = reply.send(Ok(Box::new(FakeSound {
            probe: Arc::clone(&probe),
            duration,
        })));
        probe
    }

    fn fail_next(&self, message: &str) {
        let (_, reply) = self
            .pending
            .lock()
            .unwrap()
            .pop_front()
            .expect("no pending load to fail");
        let _ = reply.send(Err(AudioError::Request(message.into())));
    }
}

/// Poll until `cond` holds; paused time auto-advances through the sleeps
async fn wait_until(mut cond: impl FnMut() -> bool) {
    for _ in 0..500 {
        if cond() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

fn session_over(backend: Arc<FakeBackend>) -> Arc<PlayerSession> {
    PlayerSession::new(PlayerConfig::default(), backend)
}

// ===== Integration Tests =====

#[tokio::test(start_paused = true)]
async fn play_track_loads_url_and_duration_flows_back() {
    let backend = Arc::new(FakeBackend::default());
    let session = session_over(Arc::clone(&backend));

    let a = track("a", 180);
    session.play_track(a.clone(), Some(vec![a.clone(), track("b", 200)]));

    // The engine asked for exactly the track's opaque URL
    let url = backend.next_request_url().await;
    assert_eq!(url, a.audio_url);

    // Decoded duration overrides the declared one
    backend.resolve_next(Some(Duration::from_secs(174)));
    wait_until(|| session.snapshot().duration == Duration::from_secs(174)).await;

    let snapshot = session.snapshot();
    assert!(snapshot.is_playing);
    assert_eq!(snapshot.current_index, Some(0));
}

#[tokio::test(start_paused = true)]
async fn natural_track_end_loads_the_next_track() {
    let backend = Arc::new(FakeBackend::default());
    let session = session_over(Arc::clone(&backend));

    let queue = vec![track("a", 3), track("b", 200)];
    session.play_track(queue[0].clone(), Some(queue.clone()));

    backend.next_request_url().await;
    let probe = backend.resolve_next(Some(Duration::from_secs(3)));

    // The resource plays to the end
    probe.position_ms.store(3_000, Ordering::SeqCst);
    probe.finished.store(true, Ordering::SeqCst);

    // The position report triggers auto-advance, which must load track b
    let next_url = backend.next_request_url().await;
    assert_eq!(next_url, queue[1].audio_url);

    let old_probe = probe;
    backend.resolve_next(Some(Duration::from_secs(200)));
    wait_until(|| {
        session
            .snapshot()
            .current_track
            .map(|t| t.id == TrackId::new("b"))
            .unwrap_or(false)
    })
    .await;

    let snapshot = session.snapshot();
    assert!(snapshot.is_playing);
    assert_eq!(snapshot.current_index, Some(1));
    assert!(
        old_probe.dropped.load(Ordering::SeqCst),
        "the finished track's resource must be released"
    );
}

#[tokio::test(start_paused = true)]
async fn failed_load_keeps_showing_the_intended_track() {
    let backend = Arc::new(FakeBackend::default());
    let session = session_over(Arc::clone(&backend));

    let a = track("a", 180);
    session.play_track(a.clone(), None);

    backend.next_request_url().await;
    backend.fail_next("404 gone");

    // Give the failure time to propagate; the player must not move
    tokio::time::sleep(Duration::from_secs(2)).await;

    let snapshot = session.snapshot();
    assert_eq!(
        snapshot.current_track.map(|t| t.id),
        Some(TrackId::new("a")),
        "no auto-skip on load failure"
    );
    assert!(snapshot.is_playing, "the declared intent stays visible");
    assert!(backend.pending.lock().unwrap().is_empty(), "no retry storms");
}

#[tokio::test(start_paused = true)]
async fn both_surfaces_project_the_same_position() {
    let backend = Arc::new(FakeBackend::default());
    let session = session_over(Arc::clone(&backend));
    let mini = MiniPlayer::new(Arc::clone(&session));
    let full = FullPlayer::new(Arc::clone(&session));

    let a = track("a", 180);
    session.play_track(a, None);
    backend.next_request_url().await;
    let probe = backend.resolve_next(Some(Duration::from_secs(180)));

    probe.position_ms.store(65_000, Ordering::SeqCst);
    wait_until(|| session.snapshot().position == Duration::from_secs(65)).await;

    let mini_view = mini.view();
    let full_view = full.view();

    assert_eq!(mini_view.elapsed, "1:05");
    assert_eq!(full_view.elapsed, "1:05");
    assert_eq!(mini_view.total, full_view.total);
    assert_eq!(mini_view.progress, full_view.progress);
    assert!(mini_view.visible && full_view.visible);
}

#[tokio::test(start_paused = true)]
async fn scrub_holds_display_and_commits_one_seek_on_release() {
    let backend = Arc::new(FakeBackend::default());
    let session = session_over(Arc::clone(&backend));
    let mut full = FullPlayer::new(Arc::clone(&session));

    let a = track("a", 180);
    session.play_track(a, None);
    backend.next_request_url().await;
    let probe = backend.resolve_next(Some(Duration::from_secs(180)));

    full.begin_scrub();
    full.scrub_to(Duration::from_secs(30));
    full.scrub_to(Duration::from_secs(60));
    full.scrub_to(Duration::from_secs(90));

    // Mid-drag: display follows the finger, shared state does not move
    assert!(full.is_scrubbing());
    assert_eq!(full.view().position, Duration::from_secs(90));
    assert_eq!(session.snapshot().position, Duration::ZERO);
    assert_eq!(probe.position_ms.load(Ordering::SeqCst), 0);

    full.end_scrub();

    // Release: exactly one seek lands in state and resource
    assert!(!full.is_scrubbing());
    wait_until(|| probe.position_ms.load(Ordering::SeqCst) == 90_000).await;
    assert_eq!(session.snapshot().position, Duration::from_secs(90));
}

#[tokio::test(start_paused = true)]
async fn repeat_one_restarts_the_resource_in_place() {
    let backend = Arc::new(FakeBackend::default());
    let session = session_over(Arc::clone(&backend));

    let a = track("a", 3);
    session.play_track(a, None);
    session.set_repeat(RepeatMode::One);

    backend.next_request_url().await;
    let probe = backend.resolve_next(Some(Duration::from_secs(3)));

    probe.position_ms.store(3_000, Ordering::SeqCst);
    probe.finished.store(true, Ordering::SeqCst);

    // The loop-in-place seek rewinds the same resource; no new load happens
    wait_until(|| probe.position_ms.load(Ordering::SeqCst) == 0).await;
    assert!(backend.pending.lock().unwrap().is_empty());
    assert!(session.snapshot().is_playing);
    assert_eq!(
        session.snapshot().current_track.map(|t| t.id),
        Some(TrackId::new("a"))
    );
}
