//! Audio engine handle - command and event channels between UI and audio thread

use crate::color::NoiseColor;
use crate::device::DeviceStatus;
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Commands sent to the audio thread
#[derive(Debug, Clone, PartialEq)]
pub enum AudioCommand {
    /// Pick a noise color (also counts as a user interaction)
    SelectNoise(NoiseColor),
    TogglePlayback,
    Play,
    Pause,
    SetVolume(f32),
    AdjustVolume(f32),

    // System
    Shutdown,
}

/// Playback state published to the UI
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub color: NoiseColor,
    pub is_playing: bool,
    /// None until the device has been created
    pub device: Option<DeviceStatus>,
    pub volume: f32,
    pub user_has_interacted: bool,
    pub status: String,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self {
            color: NoiseColor::None,
            is_playing: false,
            device: None,
            volume: crate::gain::GainStage::DEFAULT_GAIN,
            user_has_interacted: false,
            status: String::from("Select a noise color"),
        }
    }
}

/// Events sent from the audio thread
#[derive(Debug, Clone)]
pub enum AudioEvent {
    /// State update for UI rendering
    StateUpdate(SessionSnapshot),
    /// Error occurred
    Error(String),
}

/// Handle to communicate with the audio thread
pub struct AudioEngine {
    /// Send commands to audio thread
    pub command_tx: Sender<AudioCommand>,
    /// Receive events from audio thread
    pub event_rx: Receiver<AudioEvent>,
    /// Shutdown flag
    shutdown: Arc<AtomicBool>,
}

impl AudioEngine {
    /// Create channels for engine communication
    /// Buffer size of 1024 provides headroom for command bursts without saturation
    pub fn create_channels() -> (
        Sender<AudioCommand>,
        Receiver<AudioCommand>,
        Sender<AudioEvent>,
        Receiver<AudioEvent>,
    ) {
        let (cmd_tx, cmd_rx) = bounded(1024);
        let (evt_tx, evt_rx) = bounded(1024);
        (cmd_tx, cmd_rx, evt_tx, evt_rx)
    }

    /// Create a new engine handle
    pub fn new(command_tx: Sender<AudioCommand>, event_rx: Receiver<AudioEvent>) -> Self {
        Self {
            command_tx,
            event_rx,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Send a command to the audio thread without blocking
    pub fn send(&self, cmd: AudioCommand) {
        if self.command_tx.try_send(cmd).is_err() {
            tracing::warn!("Audio command queue full or closed");
        }
    }

    /// Check if shutdown was requested
    pub fn is_shutdown(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
        let _ = self.command_tx.try_send(AudioCommand::Shutdown);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_reaches_audio_side() {
        let (cmd_tx, cmd_rx, _evt_tx, evt_rx) = AudioEngine::create_channels();
        let engine = AudioEngine::new(cmd_tx, evt_rx);

        engine.send(AudioCommand::SelectNoise(NoiseColor::Pink));
        engine.send(AudioCommand::TogglePlayback);

        assert_eq!(
            cmd_rx.try_recv().ok(),
            Some(AudioCommand::SelectNoise(NoiseColor::Pink))
        );
        assert_eq!(cmd_rx.try_recv().ok(), Some(AudioCommand::TogglePlayback));
    }

    #[test]
    fn test_shutdown_sets_flag_and_sends() {
        let (cmd_tx, cmd_rx, _evt_tx, evt_rx) = AudioEngine::create_channels();
        let engine = AudioEngine::new(cmd_tx, evt_rx);

        assert!(!engine.is_shutdown());
        engine.shutdown();
        assert!(engine.is_shutdown());
        assert_eq!(cmd_rx.try_recv().ok(), Some(AudioCommand::Shutdown));
    }

    #[test]
    fn test_send_after_receiver_dropped_does_not_panic() {
        let (cmd_tx, cmd_rx, _evt_tx, evt_rx) = AudioEngine::create_channels();
        let engine = AudioEngine::new(cmd_tx, evt_rx);
        drop(cmd_rx);
        engine.send(AudioCommand::Play);
    }
}
