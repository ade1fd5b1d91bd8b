//! Playback controller - device lifecycle and play/pause state machine
//!
//! Runs on the audio control thread. It owns the output device, never the
//! noise engine: color, volume and node connection reach the audio callback
//! through [`SharedParams`] atomics only.

use crate::color::NoiseColor;
use crate::device::{AudioBackend, DeviceStatus, OutputDevice};
use crate::engine::{AudioCommand, AudioEvent, SessionSnapshot};
use crate::error::AudioError;
use crate::gain::GainStage;
use crate::renderer::SharedParams;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// How long the command loop waits before re-checking the shutdown flag
const COMMAND_POLL: Duration = Duration::from_millis(10);

pub struct PlaybackController<B: AudioBackend> {
    backend: B,
    /// Created on the first user interaction
    device: Option<B::Device>,
    shared: Arc<SharedParams>,
    selected: NoiseColor,
    is_playing: bool,
    node_attached: bool,
    /// Set once a suspended device has been resumed by a user interaction
    user_has_interacted: bool,
    volume: f32,
    status: String,
    last_error: Option<String>,
}

impl<B: AudioBackend> PlaybackController<B> {
    pub fn new(backend: B) -> Self {
        Self::with_volume(backend, GainStage::DEFAULT_GAIN)
    }

    pub fn with_volume(backend: B, volume: f32) -> Self {
        let volume = volume.clamp(0.0, 1.0);
        Self {
            backend,
            device: None,
            shared: Arc::new(SharedParams::new(NoiseColor::None, volume)),
            selected: NoiseColor::None,
            is_playing: false,
            node_attached: false,
            user_has_interacted: false,
            volume,
            status: SessionSnapshot::default().status,
            last_error: None,
        }
    }

    pub fn shared(&self) -> &Arc<SharedParams> {
        &self.shared
    }

    pub fn selected(&self) -> NoiseColor {
        self.selected
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn device_status(&self) -> Option<DeviceStatus> {
        self.device.as_ref().map(|d| d.status())
    }

    /// Error raised since the last call, if any
    pub fn take_error(&mut self) -> Option<String> {
        self.last_error.take()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            color: self.selected,
            is_playing: self.is_playing,
            device: self.device_status(),
            volume: self.volume,
            user_has_interacted: self.user_has_interacted,
            status: self.status.clone(),
        }
    }

    /// Create the output device if it does not exist yet
    fn initialize(&mut self) -> Result<(), AudioError> {
        if self.device.is_some() {
            return Ok(());
        }

        match self.backend.open(self.shared.clone()) {
            Ok(device) => {
                tracing::info!(status = device.status().label(), "Audio device created");
                self.device = Some(device);
                Ok(())
            }
            Err(e) => {
                tracing::error!("Failed to initialize audio: {}", e);
                self.status = e.status_message().to_string();
                self.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Resume a suspended device. Retried on every interaction until it works.
    fn unlock(&mut self) {
        if self.user_has_interacted {
            return;
        }
        let Some(device) = self.device.as_mut() else {
            return;
        };

        match device.status() {
            DeviceStatus::Suspended => match device.resume() {
                Ok(()) => {
                    tracing::info!("Audio device resumed");
                    self.user_has_interacted = true;
                }
                Err(e) => tracing::error!("Audio device resume failed: {}", e),
            },
            DeviceStatus::Running => self.user_has_interacted = true,
            DeviceStatus::Closed => {}
        }
    }

    /// Every user-facing command creates and unlocks the device first
    fn interact(&mut self) {
        if self.device.is_none() && self.initialize().is_err() {
            return;
        }
        self.unlock();
    }

    fn selected_message(&self) -> String {
        format!("{} Noise selected", self.selected.label())
    }

    /// Select a noise color. Switching while playing re-attaches the node.
    pub fn select_noise(&mut self, color: NoiseColor) {
        self.interact();

        if color == self.selected {
            return;
        }

        self.selected = color;
        self.shared.set_color(color);
        tracing::debug!(color = color.key(), "Noise selected");

        if color.is_none() {
            self.stop();
            self.status = SessionSnapshot::default().status;
        } else if self.is_playing {
            self.play();
        } else if self.device.is_some() {
            self.status = self.selected_message();
        }
    }

    /// Play/pause. Does nothing until a color is selected.
    pub fn toggle(&mut self) {
        if self.selected.is_none() {
            return;
        }
        self.interact();

        if self.is_playing {
            self.stop();
        } else {
            self.play();
        }
    }

    /// Attach a fresh node to the output
    pub fn play(&mut self) {
        if self.selected.is_none() {
            return;
        }
        let Some(device) = self.device.as_mut() else {
            return;
        };

        // Only one node at a time: detach the old one first
        if self.node_attached {
            device.disconnect_node();
        }
        device.connect_node();
        self.node_attached = true;

        self.is_playing = true;
        self.status = format!("Playing {} Noise", self.selected.label());
        tracing::info!(color = self.selected.key(), "Audio started");
    }

    /// Detach the node. The device stays open.
    pub fn stop(&mut self) {
        if self.node_attached {
            if let Some(device) = self.device.as_mut() {
                device.disconnect_node();
            }
            self.node_attached = false;
        }

        if self.is_playing {
            tracing::info!("Audio stopped");
        }
        self.is_playing = false;
        if !self.selected.is_none() {
            self.status = self.selected_message();
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        self.volume = volume.clamp(0.0, 1.0);
        self.shared.set_volume(self.volume);
    }

    pub fn adjust_volume(&mut self, delta: f32) {
        self.set_volume(self.volume + delta);
    }

    /// Detach and close the device
    pub fn shutdown(&mut self) {
        self.stop();
        if let Some(device) = self.device.as_mut() {
            device.close();
            tracing::info!("Audio device closed");
        }
    }

    /// Process a command. Returns false once shutdown was requested.
    pub fn handle_command(&mut self, cmd: AudioCommand) -> bool {
        tracing::debug!(?cmd, "Audio command");
        match cmd {
            AudioCommand::SelectNoise(color) => self.select_noise(color),
            AudioCommand::TogglePlayback => self.toggle(),
            AudioCommand::Play => {
                if !self.is_playing && !self.selected.is_none() {
                    self.interact();
                    self.play();
                }
            }
            AudioCommand::Pause => {
                if self.is_playing {
                    self.stop();
                }
            }
            AudioCommand::SetVolume(volume) => self.set_volume(volume),
            AudioCommand::AdjustVolume(delta) => self.adjust_volume(delta),
            AudioCommand::Shutdown => {
                self.shutdown();
                return false;
            }
        }
        true
    }

    /// Command loop for the audio control thread
    ///
    /// Publishes a snapshot after every command and forwards device errors.
    pub fn run(
        mut self,
        cmd_rx: Receiver<AudioCommand>,
        evt_tx: Sender<AudioEvent>,
        shutdown: Arc<AtomicBool>,
    ) {
        let _ = evt_tx.try_send(AudioEvent::StateUpdate(self.snapshot()));

        while !shutdown.load(Ordering::Relaxed) {
            let running = match cmd_rx.recv_timeout(COMMAND_POLL) {
                Ok(cmd) => self.handle_command(cmd),
                Err(RecvTimeoutError::Timeout) => continue,
                Err(RecvTimeoutError::Disconnected) => false,
            };

            if let Some(err) = self.take_error() {
                let _ = evt_tx.try_send(AudioEvent::Error(err));
            }
            let _ = evt_tx.try_send(AudioEvent::StateUpdate(self.snapshot()));

            if !running {
                break;
            }
        }

        if self.device_status().is_some_and(|s| s != DeviceStatus::Closed) {
            self.shutdown();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::AudioEngine;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<&'static str>>>;

    #[derive(Clone, Copy)]
    enum Failure {
        NoDevice,
        Build,
    }

    struct MockBackend {
        log: Log,
        open_failure: Option<Failure>,
        /// Number of resume attempts that fail before one succeeds
        resume_failures: usize,
    }

    impl MockBackend {
        fn new(log: &Log) -> Self {
            Self {
                log: log.clone(),
                open_failure: None,
                resume_failures: 0,
            }
        }
    }

    struct MockDevice {
        log: Log,
        shared: Arc<SharedParams>,
        status: DeviceStatus,
        resume_failures: usize,
    }

    impl AudioBackend for MockBackend {
        type Device = MockDevice;

        fn open(&mut self, shared: Arc<SharedParams>) -> Result<MockDevice, AudioError> {
            self.log.borrow_mut().push("open");
            match self.open_failure {
                Some(Failure::NoDevice) => Err(AudioError::NoDevice),
                Some(Failure::Build) => Err(AudioError::UnsupportedFormat("I16".into())),
                None => Ok(MockDevice {
                    log: self.log.clone(),
                    shared,
                    status: DeviceStatus::Suspended,
                    resume_failures: self.resume_failures,
                }),
            }
        }
    }

    impl OutputDevice for MockDevice {
        fn status(&self) -> DeviceStatus {
            self.status
        }

        fn resume(&mut self) -> Result<(), AudioError> {
            self.log.borrow_mut().push("resume");
            if self.resume_failures > 0 {
                self.resume_failures -= 1;
                return Err(AudioError::Closed);
            }
            self.status = DeviceStatus::Running;
            Ok(())
        }

        fn connect_node(&mut self) {
            self.log.borrow_mut().push("connect");
            self.shared.set_connected(true);
        }

        fn disconnect_node(&mut self) {
            self.log.borrow_mut().push("disconnect");
            self.shared.set_connected(false);
        }

        fn close(&mut self) {
            self.log.borrow_mut().push("close");
            self.status = DeviceStatus::Closed;
        }
    }

    fn controller() -> (PlaybackController<MockBackend>, Log) {
        let log = Log::default();
        (PlaybackController::new(MockBackend::new(&log)), log)
    }

    #[test]
    fn test_initial_state() {
        let (ctl, log) = controller();
        assert_eq!(ctl.selected(), NoiseColor::None);
        assert!(!ctl.is_playing());
        assert_eq!(ctl.device_status(), None);
        assert_eq!(ctl.snapshot().volume, 0.5);
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_select_creates_and_unlocks_device() {
        let (mut ctl, log) = controller();
        ctl.select_noise(NoiseColor::Pink);

        assert_eq!(*log.borrow(), vec!["open", "resume"]);
        assert_eq!(ctl.status(), "Pink Noise selected");
        assert_eq!(ctl.device_status(), Some(DeviceStatus::Running));
        assert_eq!(ctl.shared().color(), NoiseColor::Pink);
        assert!(ctl.snapshot().user_has_interacted);
        assert!(!ctl.is_playing());
    }

    #[test]
    fn test_toggle_without_selection_does_nothing() {
        let (mut ctl, log) = controller();
        ctl.toggle();

        assert!(log.borrow().is_empty());
        assert!(!ctl.is_playing());
    }

    #[test]
    fn test_toggle_plays_and_pauses() {
        let (mut ctl, _log) = controller();
        ctl.select_noise(NoiseColor::Pink);

        ctl.toggle();
        assert!(ctl.is_playing());
        assert!(ctl.shared().is_connected());
        assert_eq!(ctl.status(), "Playing Pink Noise");

        ctl.toggle();
        assert!(!ctl.is_playing());
        assert!(!ctl.shared().is_connected());
        assert_eq!(ctl.status(), "Pink Noise selected");
        // Pausing leaves the device open
        assert_eq!(ctl.device_status(), Some(DeviceStatus::Running));
    }

    #[test]
    fn test_switch_while_playing_reattaches_node() {
        let (mut ctl, log) = controller();
        ctl.select_noise(NoiseColor::Pink);
        ctl.toggle();
        log.borrow_mut().clear();

        ctl.select_noise(NoiseColor::Brown);

        assert_eq!(*log.borrow(), vec!["disconnect", "connect"]);
        assert!(ctl.is_playing());
        assert_eq!(ctl.shared().color(), NoiseColor::Brown);
        assert_eq!(ctl.status(), "Playing Brown Noise");
    }

    #[test]
    fn test_reselecting_same_color_is_noop() {
        let (mut ctl, log) = controller();
        ctl.select_noise(NoiseColor::Purple);
        ctl.toggle();
        log.borrow_mut().clear();

        ctl.select_noise(NoiseColor::Purple);
        assert!(log.borrow().is_empty());
        assert!(ctl.is_playing());
    }

    #[test]
    fn test_missing_device_reports_and_stays_stopped() {
        let log = Log::default();
        let mut backend = MockBackend::new(&log);
        backend.open_failure = Some(Failure::NoDevice);
        let mut ctl = PlaybackController::new(backend);

        ctl.select_noise(NoiseColor::White);
        assert_eq!(ctl.status(), "Error: Audio not supported.");
        assert_eq!(ctl.take_error().as_deref(), Some("No audio output device found"));

        ctl.toggle();
        assert!(!ctl.is_playing());
        assert!(!ctl.shared().is_connected());
        assert_eq!(ctl.device_status(), None);
        // Creation is retried on each interaction
        assert_eq!(*log.borrow(), vec!["open", "open"]);
    }

    #[test]
    fn test_build_failure_message() {
        let log = Log::default();
        let mut backend = MockBackend::new(&log);
        backend.open_failure = Some(Failure::Build);
        let mut ctl = PlaybackController::new(backend);

        ctl.select_noise(NoiseColor::Brown);
        ctl.toggle();

        assert_eq!(ctl.status(), "Error: Could not create audio.");
        assert!(!ctl.is_playing());
    }

    #[test]
    fn test_resume_retried_until_it_succeeds() {
        let log = Log::default();
        let mut backend = MockBackend::new(&log);
        backend.resume_failures = 1;
        let mut ctl = PlaybackController::new(backend);

        ctl.select_noise(NoiseColor::Pink);
        assert!(!ctl.snapshot().user_has_interacted);
        assert_eq!(ctl.device_status(), Some(DeviceStatus::Suspended));

        ctl.select_noise(NoiseColor::Brown);
        assert!(ctl.snapshot().user_has_interacted);

        // Unlocked: no more resume attempts
        ctl.toggle();
        ctl.toggle();
        let resumes = log.borrow().iter().filter(|&&e| e == "resume").count();
        assert_eq!(resumes, 2);
    }

    #[test]
    fn test_selecting_none_stops() {
        let (mut ctl, _log) = controller();
        ctl.select_noise(NoiseColor::White);
        ctl.toggle();

        ctl.select_noise(NoiseColor::None);
        assert!(!ctl.is_playing());
        assert!(!ctl.shared().is_connected());
        assert_eq!(ctl.shared().color(), NoiseColor::None);
    }

    #[test]
    fn test_volume_clamped_and_shared() {
        let (mut ctl, _log) = controller();
        ctl.set_volume(0.8);
        assert_eq!(ctl.shared().volume(), 0.8);

        ctl.adjust_volume(0.5);
        assert_eq!(ctl.snapshot().volume, 1.0);
        assert_eq!(ctl.shared().volume(), 1.0);

        ctl.adjust_volume(-2.0);
        assert_eq!(ctl.snapshot().volume, 0.0);
    }

    #[test]
    fn test_play_and_pause_commands() {
        let (mut ctl, log) = controller();

        // Play without a selection is ignored
        assert!(ctl.handle_command(AudioCommand::Play));
        assert!(log.borrow().is_empty());

        ctl.handle_command(AudioCommand::SelectNoise(NoiseColor::Purple));
        ctl.handle_command(AudioCommand::Play);
        ctl.handle_command(AudioCommand::Play);
        assert!(ctl.is_playing());
        assert_eq!(log.borrow().iter().filter(|&&e| e == "connect").count(), 1);

        ctl.handle_command(AudioCommand::Pause);
        assert!(!ctl.is_playing());
    }

    #[test]
    fn test_shutdown_closes_device() {
        let (mut ctl, log) = controller();
        ctl.select_noise(NoiseColor::Pink);
        ctl.toggle();

        assert!(!ctl.handle_command(AudioCommand::Shutdown));
        assert_eq!(ctl.device_status(), Some(DeviceStatus::Closed));
        assert_eq!(log.borrow().last(), Some(&"close"));
        assert!(!ctl.shared().is_connected());
    }

    #[test]
    fn test_run_processes_commands_and_publishes() {
        let (ctl, _log) = controller();
        let (cmd_tx, cmd_rx, evt_tx, evt_rx) = AudioEngine::create_channels();

        cmd_tx.send(AudioCommand::SelectNoise(NoiseColor::Brown)).unwrap();
        cmd_tx.send(AudioCommand::TogglePlayback).unwrap();
        cmd_tx.send(AudioCommand::Shutdown).unwrap();

        ctl.run(cmd_rx, evt_tx, Arc::new(AtomicBool::new(false)));

        let snapshots: Vec<SessionSnapshot> = evt_rx
            .try_iter()
            .filter_map(|e| match e {
                AudioEvent::StateUpdate(s) => Some(s),
                AudioEvent::Error(_) => None,
            })
            .collect();

        // Initial + one per command
        assert_eq!(snapshots.len(), 4);
        assert_eq!(snapshots[2].status, "Playing Brown Noise");
        assert!(snapshots[2].is_playing);
        assert_eq!(snapshots[3].device, Some(DeviceStatus::Closed));
    }

    #[test]
    fn test_run_forwards_errors() {
        let log = Log::default();
        let mut backend = MockBackend::new(&log);
        backend.open_failure = Some(Failure::NoDevice);
        let ctl = PlaybackController::new(backend);
        let (cmd_tx, cmd_rx, evt_tx, evt_rx) = AudioEngine::create_channels();

        cmd_tx.send(AudioCommand::SelectNoise(NoiseColor::Pink)).unwrap();
        drop(cmd_tx);

        ctl.run(cmd_rx, evt_tx, Arc::new(AtomicBool::new(false)));

        assert!(evt_rx
            .try_iter()
            .any(|e| matches!(e, AudioEvent::Error(msg) if msg == "No audio output device found")));
    }
}
