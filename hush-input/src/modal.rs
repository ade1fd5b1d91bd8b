//! Modal state machine for vim-style input handling

use crate::commands::{Command, Mode, NoiseColor};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Volume change per key press
const VOLUME_STEP: f32 = 0.05;

/// Handles keyboard input and converts to commands
pub struct InputHandler {
    mode: Mode,
    command_buffer: String,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            mode: Mode::Normal,
            command_buffer: String::new(),
        }
    }

    /// Get current mode
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Get current command buffer (for display)
    pub fn command_buffer(&self) -> &str {
        &self.command_buffer
    }

    /// Handle a key event and return a command if applicable
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Command> {
        match self.mode {
            Mode::Normal => self.handle_normal_mode(key),
            Mode::Command => self.handle_command_mode(key),
            Mode::Help => self.handle_help_mode(key),
        }
    }

    fn handle_normal_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            // Quit (checked before plain 'q')
            KeyCode::Char('q') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Command::Quit)
            }
            KeyCode::Char('q') => Some(Command::Quit),

            // Mode switching
            KeyCode::Char(':') => {
                self.mode = Mode::Command;
                self.command_buffer.clear();
                Some(Command::EnterCommandMode)
            }
            KeyCode::Char('?') => {
                self.mode = Mode::Help;
                Some(Command::ToggleHelp)
            }

            // Noise selection (letters and button order)
            KeyCode::Char('w') | KeyCode::Char('1') => Some(Command::SelectNoise(NoiseColor::White)),
            KeyCode::Char('p') | KeyCode::Char('2') => Some(Command::SelectNoise(NoiseColor::Pink)),
            KeyCode::Char('b') | KeyCode::Char('3') => Some(Command::SelectNoise(NoiseColor::Brown)),
            KeyCode::Char('u') | KeyCode::Char('4') => Some(Command::SelectNoise(NoiseColor::Purple)),

            // Transport
            KeyCode::Char(' ') | KeyCode::Enter => Some(Command::TogglePlayback),

            // Volume
            KeyCode::Char('-') | KeyCode::Down => Some(Command::AdjustVolume(-VOLUME_STEP)),
            KeyCode::Char('=') | KeyCode::Char('+') | KeyCode::Up => {
                Some(Command::AdjustVolume(VOLUME_STEP))
            }

            KeyCode::Esc => Some(Command::Cancel),

            _ => None,
        }
    }

    fn handle_command_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Enter => {
                let cmd = self.parse_command();
                self.mode = if cmd == Some(Command::ToggleHelp) {
                    Mode::Help
                } else {
                    Mode::Normal
                };
                let buffer = std::mem::take(&mut self.command_buffer);
                cmd.or(Some(Command::ExecuteCommand(buffer)))
            }
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.command_buffer.clear();
                Some(Command::EnterNormalMode)
            }
            KeyCode::Backspace => {
                self.command_buffer.pop();
                if self.command_buffer.is_empty() {
                    self.mode = Mode::Normal;
                    Some(Command::EnterNormalMode)
                } else {
                    None
                }
            }
            KeyCode::Char(c) => {
                self.command_buffer.push(c);
                None
            }
            _ => None,
        }
    }

    fn parse_command(&self) -> Option<Command> {
        let input = self.command_buffer.trim();

        // Handle simple commands first
        match input {
            "q" | "quit" => return Some(Command::Quit),
            "play" => return Some(Command::Play),
            "pause" | "stop" => return Some(Command::Pause),
            "toggle" => return Some(Command::TogglePlayback),
            "help" => return Some(Command::ToggleHelp),
            _ => {}
        }

        // noise <color> / color <color>
        let color_arg = input
            .strip_prefix("noise ")
            .or_else(|| input.strip_prefix("color "));
        if let Some(name) = color_arg {
            return name
                .trim()
                .parse::<NoiseColor>()
                .ok()
                .filter(|c| !c.is_none())
                .map(Command::SelectNoise);
        }

        // volume <0.0-1.0> / vol <0.0-1.0>
        let volume_arg = input
            .strip_prefix("volume ")
            .or_else(|| input.strip_prefix("vol "));
        if let Some(value) = volume_arg {
            return value
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|v| v.is_finite())
                .map(|v| Command::SetVolume(v.clamp(0.0, 1.0)));
        }

        None
    }

    fn handle_help_mode(&mut self, key: KeyEvent) -> Option<Command> {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') | KeyCode::Char('?') => {
                self.mode = Mode::Normal;
                Some(Command::ToggleHelp)
            }
            KeyCode::Char('k') | KeyCode::Up => Some(Command::HelpScrollUp),
            KeyCode::Char('j') | KeyCode::Down => Some(Command::HelpScrollDown),
            _ => None,
        }
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_command(handler: &mut InputHandler, text: &str) -> Option<Command> {
        assert_eq!(handler.handle_key(key(KeyCode::Char(':'))), Some(Command::EnterCommandMode));
        for c in text.chars() {
            assert_eq!(handler.handle_key(key(KeyCode::Char(c))), None);
        }
        handler.handle_key(key(KeyCode::Enter))
    }

    #[test]
    fn test_noise_keys() {
        let mut handler = InputHandler::new();
        assert_eq!(
            handler.handle_key(key(KeyCode::Char('p'))),
            Some(Command::SelectNoise(NoiseColor::Pink))
        );
        assert_eq!(
            handler.handle_key(key(KeyCode::Char('4'))),
            Some(Command::SelectNoise(NoiseColor::Purple))
        );
        assert_eq!(
            handler.handle_key(key(KeyCode::Char('b'))),
            Some(Command::SelectNoise(NoiseColor::Brown))
        );
    }

    #[test]
    fn test_transport_and_volume_keys() {
        let mut handler = InputHandler::new();
        assert_eq!(handler.handle_key(key(KeyCode::Char(' '))), Some(Command::TogglePlayback));
        assert_eq!(
            handler.handle_key(key(KeyCode::Char('-'))),
            Some(Command::AdjustVolume(-0.05))
        );
        assert_eq!(handler.handle_key(key(KeyCode::Up)), Some(Command::AdjustVolume(0.05)));
    }

    #[test]
    fn test_quit_keys() {
        let mut handler = InputHandler::new();
        assert_eq!(handler.handle_key(key(KeyCode::Char('q'))), Some(Command::Quit));
        assert_eq!(
            handler.handle_key(KeyEvent::new(KeyCode::Char('q'), KeyModifiers::CONTROL)),
            Some(Command::Quit)
        );
    }

    #[test]
    fn test_command_mode_noise() {
        let mut handler = InputHandler::new();
        assert_eq!(
            type_command(&mut handler, "noise brown"),
            Some(Command::SelectNoise(NoiseColor::Brown))
        );
        assert_eq!(handler.mode(), Mode::Normal);
        assert_eq!(
            type_command(&mut handler, "color White"),
            Some(Command::SelectNoise(NoiseColor::White))
        );
    }

    #[test]
    fn test_command_mode_volume() {
        let mut handler = InputHandler::new();
        assert_eq!(type_command(&mut handler, "volume 0.3"), Some(Command::SetVolume(0.3)));
        assert_eq!(type_command(&mut handler, "vol 7"), Some(Command::SetVolume(1.0)));
    }

    #[test]
    fn test_command_mode_simple() {
        let mut handler = InputHandler::new();
        assert_eq!(type_command(&mut handler, "play"), Some(Command::Play));
        assert_eq!(type_command(&mut handler, "pause"), Some(Command::Pause));
        assert_eq!(type_command(&mut handler, "quit"), Some(Command::Quit));
    }

    #[test]
    fn test_help_command_opens_help_mode() {
        let mut handler = InputHandler::new();
        assert_eq!(type_command(&mut handler, "help"), Some(Command::ToggleHelp));
        assert_eq!(handler.mode(), Mode::Help);
        assert_eq!(handler.handle_key(key(KeyCode::Char('?'))), Some(Command::ToggleHelp));
        assert_eq!(handler.mode(), Mode::Normal);
    }

    #[test]
    fn test_unknown_command_passes_through() {
        let mut handler = InputHandler::new();
        assert_eq!(
            type_command(&mut handler, "noise green"),
            Some(Command::ExecuteCommand("noise green".to_string()))
        );
        assert_eq!(
            type_command(&mut handler, "noise none"),
            Some(Command::ExecuteCommand("noise none".to_string()))
        );
        assert_eq!(
            type_command(&mut handler, "volume loud"),
            Some(Command::ExecuteCommand("volume loud".to_string()))
        );
    }

    #[test]
    fn test_command_mode_escape_and_backspace() {
        let mut handler = InputHandler::new();
        handler.handle_key(key(KeyCode::Char(':')));
        handler.handle_key(key(KeyCode::Char('p')));
        assert_eq!(handler.command_buffer(), "p");

        assert_eq!(handler.handle_key(key(KeyCode::Backspace)), Some(Command::EnterNormalMode));
        assert_eq!(handler.mode(), Mode::Normal);

        handler.handle_key(key(KeyCode::Char(':')));
        handler.handle_key(key(KeyCode::Char('x')));
        assert_eq!(handler.handle_key(key(KeyCode::Esc)), Some(Command::EnterNormalMode));
        assert_eq!(handler.command_buffer(), "");
    }

    #[test]
    fn test_help_mode() {
        let mut handler = InputHandler::new();
        assert_eq!(handler.handle_key(key(KeyCode::Char('?'))), Some(Command::ToggleHelp));
        assert_eq!(handler.mode(), Mode::Help);

        // Noise keys are swallowed while help is open
        assert_eq!(handler.handle_key(key(KeyCode::Char('p'))), None);
        assert_eq!(handler.handle_key(key(KeyCode::Char('j'))), Some(Command::HelpScrollDown));
        assert_eq!(handler.handle_key(key(KeyCode::Up)), Some(Command::HelpScrollUp));

        assert_eq!(handler.handle_key(key(KeyCode::Esc)), Some(Command::ToggleHelp));
        assert_eq!(handler.mode(), Mode::Normal);
    }
}
