/// Audio output errors
use cadence_playback::PlaybackError;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for audio operations
pub type Result<T> = std::result::Result<T, AudioError>;

/// Audio errors
#[derive(Debug, Error)]
pub enum AudioError {
    /// No default output device
    #[error("Audio device not found")]
    DeviceNotFound,

    /// Failed to query the device configuration
    #[error("Device error: {0}")]
    DeviceError(String),

    /// Device offers no sample format the mixer can write
    #[error("Unsupported output sample format: {0}")]
    UnsupportedFormat(String),

    /// Failed to build output stream
    #[error("Failed to build output stream: {0}")]
    StreamBuildError(String),

    /// Failed to play stream
    #[error("Failed to play stream: {0}")]
    PlayError(String),

    /// File could not be opened, probed or decoded
    #[error("Failed to decode {}: {reason}", path.display())]
    Decode {
        /// File being decoded
        path: PathBuf,
        /// Symphonia or IO description
        reason: String,
    },

    /// Sample rate conversion error
    #[error("Sample rate conversion error: {0}")]
    ResampleError(String),
}

impl AudioError {
    pub(crate) fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
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

impl From<cpal::DefaultStreamConfigError> for AudioError {
    fn from(err: cpal::DefaultStreamConfigError) -> Self {
        AudioError::DeviceError(err.to_string())
    }
}

impl From<AudioError> for PlaybackError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::Decode { path, reason } => PlaybackError::Decode { path, reason },
            other => PlaybackError::Device(other.to_string()),
        }
    }
}
