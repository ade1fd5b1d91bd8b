//! Command definitions for hush

// Re-export for use in commands
pub use hush_audio::NoiseColor;

/// Input modes (vim-style)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    Command,
    Help,
}

impl Mode {
    pub fn display_name(&self) -> &'static str {
        match self {
            Mode::Normal => "NORMAL",
            Mode::Command => "COMMAND",
            Mode::Help => "HELP",
        }
    }
}

/// Commands that can be dispatched from input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    // Noise selection
    SelectNoise(NoiseColor),

    // Transport
    TogglePlayback,
    Play,
    Pause,

    // Volume
    SetVolume(f32),
    AdjustVolume(f32),

    // UI
    ToggleHelp,
    HelpScrollUp,
    HelpScrollDown,

    // Mode changes
    EnterCommandMode,
    EnterNormalMode,

    // Application
    Quit,
    Cancel,

    // Command mode input that did not parse
    ExecuteCommand(String),
}
