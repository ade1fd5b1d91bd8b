//! Audio device errors

use thiserror::Error;

/// Errors that can occur while creating or driving the output device
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("No audio output device found")]
    NoDevice,
    #[error("Failed to get audio config: {0}")]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),
    #[error("Failed to create audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),
    #[error("Failed to start audio: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),
    #[error("Audio device is closed")]
    Closed,
}

impl AudioError {
    /// Message shown to the user in the status line
    pub fn status_message(&self) -> &'static str {
        match self {
            AudioError::NoDevice => "Error: Audio not supported.",
            _ => "Error: Could not create audio.",
        }
    }
}
