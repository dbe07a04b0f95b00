/// Audio engine errors
use thiserror::Error;

/// Result type for audio operations
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio errors
///
/// Every variant is non-fatal to the app: a failed load leaves the player
/// showing the intended track with nothing installed in the resource slot.
#[derive(Debug, Error)]
pub enum AudioError {
    /// HTTP request for the stream failed
    #[error("Stream request failed: {0}")]
    Request(String),

    /// The stream could not be probed or decoded
    #[error("Unsupported or corrupt stream: {0}")]
    UnsupportedStream(String),

    /// No audio output device available
    #[error("Audio device not found")]
    DeviceNotFound,

    /// Failed to build output stream
    #[error("Failed to build output stream: {0}")]
    StreamBuildError(String),

    /// Failed to start the output stream
    #[error("Failed to play stream: {0}")]
    PlayError(String),

    /// The engine task is gone and can no longer accept commands
    #[error("Audio engine stopped")]
    EngineStopped,
}

impl From<reqwest::Error> for AudioError {
    fn from(err: reqwest::Error) -> Self {
        AudioError::Request(err.to_string())
    }
}

impl From<symphonia::core::errors::Error> for AudioError {
    fn from(err: symphonia::core::errors::Error) -> Self {
        AudioError::UnsupportedStream(err.to_string())
    }
}

impl From<cpal::BuildStreamError> for AudioError {
    fn from(err: cpal::BuildStreamError) -> Self {
        AudioError::StreamBuildError(err.to_string())
    }
}

impl From<cpal::PlayStreamError> for AudioError {
    fn from(err: cpal::PlayStreamError) -> Self {
        AudioError::PlayError(err.to_string())
    }
}
