//! Status bar widget - mode indicator and command line

use crate::app::MessageType;
use crate::theme::Theme;
use hush_input::Mode;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Widget for displaying the status bar with mode and command input
pub struct StatusBarWidget<'a> {
    mode: Mode,
    command_buffer: &'a str,
    message: Option<&'a str>,
    message_type: MessageType,
    theme: &'a Theme,
}

impl<'a> StatusBarWidget<'a> {
    pub fn new(mode: Mode, command_buffer: &'a str, theme: &'a Theme) -> Self {
        Self {
            mode,
            command_buffer,
            message: None,
            message_type: MessageType::Info,
            theme,
        }
    }

    pub fn message(mut self, msg: Option<&'a str>, msg_type: MessageType) -> Self {
        self.message = msg;
        self.message_type = msg_type;
        self
    }

    fn mode_style(&self) -> Style {
        match self.mode {
            Mode::Normal | Mode::Help => self.theme.highlight(),
            Mode::Command => Style::from(self.theme.accent),
        }
    }
}

impl Widget for StatusBarWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 {
            return;
        }

        let chunks = Layout::horizontal([
            Constraint::Length(10), // Mode indicator
            Constraint::Min(20),    // Command/message area
            Constraint::Length(22), // Help hint
        ])
        .split(area);

        let mode_line = Line::from(vec![
            Span::raw("["),
            Span::styled(self.mode.display_name(), self.mode_style()),
            Span::raw("]"),
        ]);
        Paragraph::new(mode_line).render(chunks[0], buf);

        let content = if self.mode == Mode::Command {
            Line::from(vec![
                Span::styled(":", Style::from(self.theme.accent)),
                Span::styled(self.command_buffer, self.theme.normal()),
                Span::styled("█", self.theme.highlight()), // Cursor
            ])
        } else if let Some(msg) = self.message {
            let msg_style = match self.message_type {
                MessageType::Info => self.theme.dim(),
                MessageType::Success => Style::from(self.theme.accent),
                MessageType::Warning => Style::default().fg(self.theme.warning),
                MessageType::Error => Style::default().fg(self.theme.danger),
            };
            Line::from(Span::styled(msg, msg_style))
        } else {
            Line::from(Span::styled(
                "Ready. Press ? for help, : for commands",
                self.theme.dim(),
            ))
        };
        Paragraph::new(content).render(chunks[1], buf);

        let help = match self.mode {
            Mode::Normal => "1-4:noise  spc:play",
            Mode::Command => "Enter:run  Esc:cancel",
            Mode::Help => "Esc:close help",
        };
        let help_line = Line::from(Span::styled(help, self.theme.dim()));
        Paragraph::new(help_line).render(chunks[2], buf);
    }
}

/// Help overlay with scrolling, showing the help asset text
pub struct HelpWidget<'a> {
    theme: &'a Theme,
    text: &'a str,
    scroll: u16,
}

impl<'a> HelpWidget<'a> {
    pub fn new(text: &'a str, theme: &'a Theme) -> Self {
        Self {
            theme,
            text,
            scroll: 0,
        }
    }

    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }
}

impl Widget for HelpWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Clear background
        for y in area.y..area.y + area.height {
            for x in area.x..area.x + area.width {
                buf[(x, y)].set_char(' ').set_style(self.theme.normal());
            }
        }
        if area.height == 0 {
            return;
        }

        let lines: Vec<&str> = self.text.lines().collect();
        let total_lines = lines.len() as u16;
        let visible_lines = area.height.min(total_lines);

        // Clamp scroll to valid range
        let max_scroll = total_lines.saturating_sub(visible_lines);
        let scroll = self.scroll.min(max_scroll);

        let text_width = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16;
        let start_x = area.x + area.width.saturating_sub(text_width) / 2;
        let right = area.x + area.width;

        for (i, line) in lines
            .iter()
            .skip(scroll as usize)
            .take(visible_lines as usize)
            .enumerate()
        {
            let y = area.y + i as u16;
            // Section headings are flush left and upper case
            let style = if !line.starts_with(' ') && !line.is_empty() {
                self.theme.title()
            } else {
                self.theme.normal()
            };
            for (j, ch) in line.chars().enumerate() {
                let x = start_x + j as u16;
                if x >= right {
                    break;
                }
                buf[(x, y)].set_char(ch).set_style(style);
            }
        }

        // Show scroll indicator if content is scrollable
        if total_lines > visible_lines {
            let indicator = format!(" [{}/{}] ", scroll + 1, max_scroll + 1);
            let indicator_x = right.saturating_sub(indicator.len() as u16 + 2).max(area.x);
            let indicator_y = area.y + area.height - 1;

            for (i, ch) in indicator.chars().enumerate() {
                let x = indicator_x + i as u16;
                if x < right {
                    buf[(x, indicator_y)]
                        .set_char(ch)
                        .set_style(self.theme.dim());
                }
            }
        }
    }
}
