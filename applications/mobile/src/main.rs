/// Aria Mobile - development shell
///
/// Plays streaming URLs through the full engine stack (session, state
/// machine, audio engine, HTTP backend) and logs what the mini-player
/// surface would render. Useful for exercising playback without a device
/// build.
use anyhow::Result;
use aria_audio::HttpStreamBackend;
use aria_core::{ArtistId, Track, TrackId};
use aria_mobile::{MiniPlayer, PlayerSession};
use aria_playback::{PlayerConfig, PlayerEvent, RepeatMode};
use clap::{Parser, ValueEnum};
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "aria-mobile")]
#[command(about = "Aria Player development shell", long_about = None)]
struct Cli {
    /// Streaming URLs to queue up, in playback order
    #[arg(required = true)]
    urls: Vec<String>,

    /// Initial volume (0.0 - 1.0)
    #[arg(long, default_value_t = 1.0)]
    volume: f32,

    /// Repeat mode
    #[arg(long, value_enum, default_value_t = RepeatArg::Off)]
    repeat: RepeatArg,

    /// Start with shuffle on
    #[arg(long)]
    shuffle: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RepeatArg {
    Off,
    All,
    One,
}

impl From<RepeatArg> for RepeatMode {
    fn from(arg: RepeatArg) -> Self {
        match arg {
            RepeatArg::Off => RepeatMode::Off,
            RepeatArg::All => RepeatMode::All,
            RepeatArg::One => RepeatMode::One,
        }
    }
}

/// Build a dev track for a raw URL; durations come from the decoded stream
fn dev_track(index: usize, url: &str) -> Track {
    let title = url
        .rsplit('/')
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(url)
        .to_string();

    Track::new(
        TrackId::new(format!("dev-{index}")),
        title,
        ArtistId::new("dev"),
        "Dev Shell",
        url,
        Duration::ZERO,
    )
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "aria_mobile=info,aria_audio=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let config = PlayerConfig {
        volume: cli.volume,
        repeat: cli.repeat.into(),
        shuffle: cli.shuffle,
        ..PlayerConfig::default()
    };

    let session = PlayerSession::new(config, Arc::new(HttpStreamBackend::new()));
    let mini = MiniPlayer::new(Arc::clone(&session));
    let mut events = session.subscribe();

    let queue: Vec<Track> = cli
        .urls
        .iter()
        .enumerate()
        .map(|(i, url)| dev_track(i, url))
        .collect();
    let first = queue[0].clone();

    tracing::info!(tracks = queue.len(), "starting playback");
    session.play_track(first, Some(queue));

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted");
                break;
            }
            event = events.recv() => {
                match event {
                    Ok(PlayerEvent::TrackChanged { track: Some(track), .. }) => {
                        tracing::info!(title = %track.title, artist = %track.artist_name, "now playing");
                    }
                    Ok(PlayerEvent::PositionChanged { .. }) => {
                        let view = mini.view();
                        if view.visible {
                            tracing::info!("{} - {} [{} / {}]", view.artist, view.title, view.elapsed, view.total);
                        }
                    }
                    Ok(PlayerEvent::PlaybackChanged { is_playing: false }) => {
                        let snapshot = session.snapshot();
                        let at_end = !snapshot.has_next
                            && snapshot.duration > Duration::ZERO
                            && snapshot.position >= snapshot.duration;
                        if at_end {
                            tracing::info!("queue finished");
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "event stream lagged");
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    session.shutdown();
    Ok(())
}
