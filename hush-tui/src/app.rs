//! Application state management (Elm architecture)

use crate::theme::Theme;
use hush_audio::{AudioEvent, SessionSnapshot};
use hush_input::Mode;

/// Help text used until the asset cache provides one
pub const DEFAULT_HELP: &str = "\
NOISE
  w / 1        White noise
  p / 2        Pink noise
  b / 3        Brown noise
  u / 4        Purple noise

TRANSPORT
  Space/Enter  Play / pause
  - / =        Volume down / up

COMMANDS (:)
  :noise <color>    white / pink / brown / purple
  :volume <0-1>     Set volume
  :play  :pause  :toggle
  :q                Quit

  ?  Esc           Close help
  q  Ctrl-q        Quit hush";

/// Banner used until the asset cache provides one
pub const DEFAULT_BANNER: &str = "hush - colored noise for relaxation and focus";

/// Message type for colored status messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageType {
    #[default]
    Info,
    Success,
    Warning,
    Error,
}

/// Output level with analog-style peak hold, fed from the meter tap
#[derive(Debug, Clone, Default)]
pub struct LevelMeter {
    /// Peak of the most recent batch of samples
    pub level: f32,
    pub peak_hold: f32,
    hold_frames: u16,
}

impl LevelMeter {
    /// ~667ms at 30fps
    const HOLD_FRAMES: u16 = 20;
    const DECAY_RATE: f32 = 0.92;

    /// Update from the samples drained this frame (call once per frame)
    pub fn update(&mut self, samples: impl IntoIterator<Item = f32>) {
        let peak = samples
            .into_iter()
            .fold(0.0f32, |acc, s| acc.max(s.abs()));

        // Fall back gently when the tap is idle
        self.level = if peak > 0.0 { peak } else { self.level * Self::DECAY_RATE };
        if self.level < 0.001 {
            self.level = 0.0;
        }

        if self.level > self.peak_hold {
            self.peak_hold = self.level;
            self.hold_frames = Self::HOLD_FRAMES;
        } else if self.hold_frames > 0 {
            self.hold_frames -= 1;
        } else {
            self.peak_hold *= Self::DECAY_RATE;
            if self.peak_hold < 0.001 {
                self.peak_hold = 0.0;
            }
        }
    }
}

/// Application state
pub struct AppState {
    /// Latest state published by the audio thread
    pub session: SessionSnapshot,

    // UI state
    pub mode: Mode,
    pub command_buffer: String,
    pub message: Option<String>,
    pub message_type: MessageType,
    pub show_help: bool,
    pub help_scroll: u16,

    // Static assets
    pub help_text: String,
    pub banner_text: String,

    pub meter: LevelMeter,
    pub theme: Theme,
    pub frame_count: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            session: SessionSnapshot::default(),
            mode: Mode::Normal,
            command_buffer: String::new(),
            message: None,
            message_type: MessageType::Info,
            show_help: false,
            help_scroll: 0,
            help_text: DEFAULT_HELP.to_string(),
            banner_text: DEFAULT_BANNER.to_string(),
            meter: LevelMeter::default(),
            theme: Theme::default(),
            frame_count: 0,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Update state from audio engine event
    pub fn handle_audio_event(&mut self, event: AudioEvent) {
        match event {
            AudioEvent::StateUpdate(session) => {
                self.session = session;
            }
            AudioEvent::Error(msg) => {
                self.set_error(format!("Error: {}", msg));
            }
        }
    }

    /// Play/pause is only offered once a color is picked
    pub fn transport_enabled(&self) -> bool {
        !self.session.color.is_none()
    }

    /// Set current mode
    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
        if mode != Mode::Command {
            self.command_buffer.clear();
        }
    }

    /// Toggle help display
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
        if self.show_help {
            self.help_scroll = 0;
        }
    }

    pub fn help_scroll_up(&mut self) {
        self.help_scroll = self.help_scroll.saturating_sub(3);
    }

    pub fn help_scroll_down(&mut self) {
        self.help_scroll = self.help_scroll.saturating_add(3);
    }

    /// Replace the help and banner text with cached assets
    pub fn set_assets(&mut self, help: Option<String>, banner: Option<String>) {
        if let Some(help) = help {
            self.help_text = help;
        }
        if let Some(banner) = banner {
            self.banner_text = banner.trim_end().to_string();
        }
    }

    /// Clear any displayed message
    pub fn clear_message(&mut self) {
        self.message = None;
        self.message_type = MessageType::Info;
    }

    /// Set a message to display (info level)
    pub fn set_message(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Info;
    }

    /// Set a success message (green)
    pub fn set_success(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Success;
    }

    /// Set a warning message (yellow)
    pub fn set_warning(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Warning;
    }

    /// Set an error message (red)
    pub fn set_error(&mut self, msg: impl Into<String>) {
        self.message = Some(msg.into());
        self.message_type = MessageType::Error;
    }
}

/// Main application wrapper
pub struct App {
    pub state: AppState,
    pub should_quit: bool,
}

impl App {
    pub fn new() -> Self {
        Self {
            state: AppState::new(),
            should_quit: false,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hush_audio::{DeviceStatus, NoiseColor};

    #[test]
    fn test_state_update_replaces_session() {
        let mut state = AppState::new();
        assert!(!state.transport_enabled());

        state.handle_audio_event(AudioEvent::StateUpdate(SessionSnapshot {
            color: NoiseColor::Brown,
            is_playing: true,
            device: Some(DeviceStatus::Running),
            volume: 0.3,
            user_has_interacted: true,
            status: "Playing Brown Noise".to_string(),
        }));

        assert_eq!(state.session.color, NoiseColor::Brown);
        assert!(state.session.is_playing);
        assert!(state.transport_enabled());
        assert_eq!(state.session.status, "Playing Brown Noise");
    }

    #[test]
    fn test_error_event_sets_error_message() {
        let mut state = AppState::new();
        state.handle_audio_event(AudioEvent::Error("no output device".to_string()));

        assert_eq!(state.message.as_deref(), Some("Error: no output device"));
        assert_eq!(state.message_type, MessageType::Error);

        state.clear_message();
        assert!(state.message.is_none());
        assert_eq!(state.message_type, MessageType::Info);
    }

    #[test]
    fn test_set_mode_clears_command_buffer() {
        let mut state = AppState::new();
        state.set_mode(Mode::Command);
        state.command_buffer.push_str("vol 0.2");
        state.set_mode(Mode::Command);
        assert_eq!(state.command_buffer, "vol 0.2");

        state.set_mode(Mode::Normal);
        assert!(state.command_buffer.is_empty());
    }

    #[test]
    fn test_help_toggle_resets_scroll() {
        let mut state = AppState::new();
        state.toggle_help();
        state.help_scroll_down();
        state.help_scroll_down();
        assert_eq!(state.help_scroll, 6);

        state.toggle_help();
        state.toggle_help();
        assert!(state.show_help);
        assert_eq!(state.help_scroll, 0);

        state.help_scroll_up();
        assert_eq!(state.help_scroll, 0);
    }

    #[test]
    fn test_set_assets_keeps_defaults_when_missing() {
        let mut state = AppState::new();
        state.set_assets(None, Some("hush v1\n".to_string()));

        assert_eq!(state.help_text, DEFAULT_HELP);
        assert_eq!(state.banner_text, "hush v1");
    }

    #[test]
    fn test_level_meter_peak_hold() {
        let mut meter = LevelMeter::default();
        meter.update([0.1, -0.6, 0.3]);
        assert_eq!(meter.level, 0.6);
        assert_eq!(meter.peak_hold, 0.6);

        // Quieter input: level follows, peak holds
        meter.update([0.2]);
        assert_eq!(meter.level, 0.2);
        assert_eq!(meter.peak_hold, 0.6);

        // After the hold time the peak decays
        for _ in 0..LevelMeter::HOLD_FRAMES + 1 {
            meter.update([0.2]);
        }
        assert!(meter.peak_hold < 0.6);
    }

    #[test]
    fn test_level_meter_decays_when_idle() {
        let mut meter = LevelMeter::default();
        meter.update([0.5]);
        for _ in 0..200 {
            meter.update(std::iter::empty());
        }
        assert_eq!(meter.level, 0.0);
        assert_eq!(meter.peak_hold, 0.0);
    }
}
