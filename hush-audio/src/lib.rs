//! Audio engine for hush - colored noise synthesis and playback
//!
//! This module provides the audio pipeline:
//! - Noise: per-sample white/pink/brown/purple generator
//! - Gain: smoothed output gain stage
//! - Renderer: the node that runs inside the device callback
//! - Device: output device lifecycle (cpal)
//! - Controller: play/pause state machine driven by user commands

mod color;
mod controller;
mod device;
mod engine;
mod error;
mod gain;
mod noise;
mod renderer;

pub use color::{NoiseColor, ParseColorError};
pub use controller::PlaybackController;
pub use device::{AudioBackend, CpalBackend, CpalDevice, DeviceStatus, OutputDevice};
pub use engine::{AudioCommand, AudioEngine, AudioEvent, SessionSnapshot};
pub use error::AudioError;
pub use gain::GainStage;
pub use noise::{FilterState, NoiseEngine, RandomSource};
pub use renderer::{NoiseRenderer, SharedParams, RENDER_BLOCK};
