//! HTTP streaming backend
//!
//! Opens an opaque streaming URL, decodes it with Symphonia on a background
//! thread while the download progresses, and plays the decoded samples
//! through a CPAL output stream. Decoded audio is kept for the lifetime of
//! the sound so the cursor can seek backward freely; forward seeks clamp to
//! what has been decoded so far (sequential streaming, no range requests).

use crate::error::{AudioError, Result};
use crate::sound::{Sound, StreamBackend};
use async_trait::async_trait;
use bytes::Bytes;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSourceStream, ReadOnlySource};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tokio::sync::{mpsc, oneshot};

/// Download chunks buffered between the fetch task and the decoder thread
const DOWNLOAD_CHANNEL_CAPACITY: usize = 32;

/// Stream properties resolved by the probe
#[derive(Debug, Clone, Copy)]
struct StreamInfo {
    sample_rate: u32,
    channels: usize,
    total_frames: Option<u64>,
}

/// Backend that opens sounds over HTTP
pub struct HttpStreamBackend {
    client: reqwest::Client,
}

impl HttpStreamBackend {
    /// Create a backend with its own HTTP client
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpStreamBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StreamBackend for HttpStreamBackend {
    async fn open(&self, url: &str) -> Result<Box<dyn Sound>> {
        let response = self.client.get(url).send().await?.error_for_status()?;

        // Pump the body into a channel the decoder thread can block on
        let (bytes_tx, bytes_rx) = mpsc::channel::<Bytes>(DOWNLOAD_CHANNEL_CAPACITY);
        tokio::spawn(pump_body(response, bytes_tx));

        let shared = SharedSamples::new();
        let (ready_tx, ready_rx) = oneshot::channel();

        let decode_shared = shared.clone();
        thread::spawn(move || {
            decode_stream(bytes_rx, decode_shared, ready_tx);
        });

        let info = ready_rx
            .await
            .map_err(|_| AudioError::UnsupportedStream("decoder thread died".into()))??;

        let controls = Arc::new(SoundControls::new());
        start_output(&shared, &controls, info)?;

        Ok(Box::new(HttpSound {
            shared,
            controls,
            info,
        }))
    }
}

/// Move the response body into the byte channel until EOF or error
async fn pump_body(mut response: reqwest::Response, tx: mpsc::Sender<Bytes>) {
    loop {
        match response.chunk().await {
            Ok(Some(chunk)) => {
                if tx.send(chunk).await.is_err() {
                    // Decoder is gone; stop downloading
                    break;
                }
            }
            Ok(None) => break,
            Err(error) => {
                tracing::warn!(%error, "stream download interrupted");
                break;
            }
        }
    }
    // Dropping tx signals EOF to the reader
}

/// Blocking reader over the download channel
///
/// Feeds Symphonia's probe/decoder from the live download.
struct ChannelReader {
    rx: mpsc::Receiver<Bytes>,
    current: Bytes,
}

impl io::Read for ChannelReader {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        while self.current.is_empty() {
            match self.rx.blocking_recv() {
                Some(bytes) => self.current = bytes,
                None => return Ok(0),
            }
        }
        let n = out.len().min(self.current.len());
        let tail = self.current.split_off(n);
        out[..n].copy_from_slice(&self.current);
        self.current = tail;
        Ok(n)
    }
}

/// Decoded samples shared between decoder thread and audio callback
#[derive(Clone)]
struct SharedSamples {
    /// Interleaved f32 samples, append-only while decoding
    buffer: Arc<Mutex<Vec<f32>>>,

    /// Set when the decoder thread exits
    decode_done: Arc<AtomicBool>,

    /// Signals the decoder thread that the sound was dropped
    cancel: Arc<AtomicBool>,
}

impl SharedSamples {
    fn new() -> Self {
        Self {
            buffer: Arc::new(Mutex::new(Vec::new())),
            decode_done: Arc::new(AtomicBool::new(false)),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    fn len(&self) -> usize {
        self.buffer.lock().unwrap().len()
    }
}

/// Probe and decode the stream, appending samples to the shared buffer
///
/// The probe outcome goes back over `ready`; afterwards the thread keeps
/// decoding until the stream ends or the sound is dropped (channel closed).
fn decode_stream(
    bytes_rx: mpsc::Receiver<Bytes>,
    shared: SharedSamples,
    ready: oneshot::Sender<Result<StreamInfo>>,
) {
    let reader = ChannelReader {
        rx: bytes_rx,
        current: Bytes::new(),
    };
    let source = ReadOnlySource::new(reader);
    let stream = MediaSourceStream::new(Box::new(source), Default::default());

    let probed = match symphonia::default::get_probe().format(
        &Hint::new(),
        stream,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    ) {
        Ok(probed) => probed,
        Err(error) => {
            let _ = ready.send(Err(error.into()));
            return;
        }
    };

    let mut format = probed.format;
    let Some(track) = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .cloned()
    else {
        let _ = ready.send(Err(AudioError::UnsupportedStream(
            "no decodable track in stream".into(),
        )));
        return;
    };

    let Some(sample_rate) = track.codec_params.sample_rate else {
        let _ = ready.send(Err(AudioError::UnsupportedStream(
            "stream does not declare a sample rate".into(),
        )));
        return;
    };
    let channels = track
        .codec_params
        .channels
        .map(|c| c.count())
        .unwrap_or(2);

    let mut decoder = match symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
    {
        Ok(decoder) => decoder,
        Err(error) => {
            let _ = ready.send(Err(error.into()));
            return;
        }
    };

    let info = StreamInfo {
        sample_rate,
        channels,
        total_frames: track.codec_params.n_frames,
    };
    if ready.send(Ok(info)).is_err() {
        // open() was cancelled; no point decoding
        return;
    }

    let mut sample_buf: Option<SampleBuffer<f32>> = None;

    loop {
        if shared.cancel.load(Ordering::Acquire) {
            break;
        }

        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(ref error))
                if error.kind() == io::ErrorKind::UnexpectedEof =>
            {
                break;
            }
            Err(error) => {
                tracing::warn!(%error, "decode stopped early");
                break;
            }
        };

        if packet.track_id() != track.id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                if sample_buf.is_none() {
                    let spec = *decoded.spec();
                    sample_buf = Some(SampleBuffer::new(decoded.capacity() as u64, spec));
                }
                if let Some(buf) = &mut sample_buf {
                    buf.copy_interleaved_ref(decoded);
                    shared.buffer.lock().unwrap().extend_from_slice(buf.samples());
                }
            }
            // Recoverable per-packet corruption: skip the packet
            Err(SymphoniaError::DecodeError(error)) => {
                tracing::debug!(%error, "skipping corrupt packet");
            }
            Err(error) => {
                tracing::warn!(%error, "decode stopped early");
                break;
            }
        }
    }

    shared.decode_done.store(true, Ordering::Release);
}

/// Control flags shared with the audio callback
struct SoundControls {
    playing: AtomicBool,
    /// Read cursor into the shared buffer, in samples
    cursor: AtomicUsize,
    /// Volume as f32 bits
    volume: AtomicU32,
    /// Tells the output thread to drop the stream
    stop: AtomicBool,
}

impl SoundControls {
    fn new() -> Self {
        Self {
            playing: AtomicBool::new(false),
            cursor: AtomicUsize::new(0),
            volume: AtomicU32::new(1.0f32.to_bits()),
            stop: AtomicBool::new(false),
        }
    }

    fn volume(&self) -> f32 {
        f32::from_bits(self.volume.load(Ordering::Relaxed))
    }
}

/// Spin up the output thread owning the CPAL stream
///
/// The stream lives on its own thread because CPAL stream handles are not
/// `Send`; the `Sound` handle only touches the shared atomics.
fn start_output(
    shared: &SharedSamples,
    controls: &Arc<SoundControls>,
    info: StreamInfo,
) -> Result<()> {
    let (built_tx, built_rx) = std::sync::mpsc::channel::<Result<()>>();

    let callback_buffer = Arc::clone(&shared.buffer);
    let callback_controls = Arc::clone(controls);
    let thread_controls = Arc::clone(controls);

    thread::spawn(move || {
        let build = || -> Result<cpal::Stream> {
            let host = cpal::default_host();
            let device = host
                .default_output_device()
                .ok_or(AudioError::DeviceNotFound)?;

            let config = cpal::StreamConfig {
                channels: info.channels as u16,
                sample_rate: info.sample_rate,
                buffer_size: cpal::BufferSize::Default,
            };

            let stream = device.build_output_stream(
                &config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    fill_output(data, &callback_buffer, &callback_controls);
                },
                |error| tracing::warn!(%error, "audio stream error"),
                None,
            )?;
            stream.play()?;
            Ok(stream)
        };

        match build() {
            Ok(stream) => {
                let _ = built_tx.send(Ok(()));
                // Park until the sound is dropped, then release the stream
                while !thread_controls.stop.load(Ordering::Acquire) {
                    thread::park_timeout(Duration::from_millis(100));
                }
                drop(stream);
            }
            Err(error) => {
                let _ = built_tx.send(Err(error));
            }
        }
    });

    built_rx
        .recv()
        .map_err(|_| AudioError::StreamBuildError("output thread died".into()))?
}

/// Audio callback: copy decoded samples out, honoring pause and volume
fn fill_output(data: &mut [f32], buffer: &Arc<Mutex<Vec<f32>>>, controls: &SoundControls) {
    if !controls.playing.load(Ordering::Relaxed) {
        data.fill(0.0);
        return;
    }

    let volume = controls.volume();
    let samples = buffer.lock().unwrap();
    let cursor = controls.cursor.load(Ordering::Relaxed);
    let available = samples.len().saturating_sub(cursor);
    let to_copy = available.min(data.len());

    for (out, sample) in data[..to_copy].iter_mut().zip(&samples[cursor..cursor + to_copy]) {
        *out = sample * volume;
    }
    // Underrun or end of track: pad with silence
    data[to_copy..].fill(0.0);

    controls.cursor.store(cursor + to_copy, Ordering::Relaxed);
}

/// A sound streaming from an HTTP URL
struct HttpSound {
    shared: SharedSamples,
    controls: Arc<SoundControls>,
    info: StreamInfo,
}

impl HttpSound {
    fn samples_per_second(&self) -> f64 {
        f64::from(self.info.sample_rate) * self.info.channels as f64
    }
}

impl Sound for HttpSound {
    fn play(&mut self) {
        self.controls.playing.store(true, Ordering::Relaxed);
    }

    fn pause(&mut self) {
        self.controls.playing.store(false, Ordering::Relaxed);
    }

    fn seek(&mut self, position: Duration) {
        let mut target = (position.as_secs_f64() * self.samples_per_second()) as usize;
        // Align to a frame boundary so channels stay in phase
        target -= target % self.info.channels;
        let clamped = target.min(self.shared.len());
        self.controls.cursor.store(clamped, Ordering::Relaxed);
    }

    fn set_volume(&mut self, volume: f32) {
        self.controls
            .volume
            .store(volume.clamp(0.0, 1.0).to_bits(), Ordering::Relaxed);
    }

    fn position(&self) -> Duration {
        let cursor = self.controls.cursor.load(Ordering::Relaxed);
        Duration::from_secs_f64(cursor as f64 / self.samples_per_second())
    }

    fn duration(&self) -> Option<Duration> {
        self.info
            .total_frames
            .map(|frames| Duration::from_secs_f64(frames as f64 / f64::from(self.info.sample_rate)))
    }

    fn is_finished(&self) -> bool {
        self.shared.decode_done.load(Ordering::Acquire)
            && self.controls.cursor.load(Ordering::Relaxed) >= self.shared.len()
    }
}

impl Drop for HttpSound {
    fn drop(&mut self) {
        // Stops the callback output immediately, lets the output thread
        // release the CPAL stream, and tells the decoder thread to stop
        // consuming the download
        self.controls.playing.store(false, Ordering::Relaxed);
        self.controls.stop.store(true, Ordering::Release);
        self.shared.cancel.store(true, Ordering::Release);
    }
}
