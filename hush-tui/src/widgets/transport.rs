//! Transport widget - play/pause button and session status

use crate::theme::Theme;
use hush_audio::SessionSnapshot;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Play/pause button, status line and device state
pub struct TransportWidget<'a> {
    session: &'a SessionSnapshot,
    theme: &'a Theme,
}

impl<'a> TransportWidget<'a> {
    pub fn new(session: &'a SessionSnapshot, theme: &'a Theme) -> Self {
        Self { session, theme }
    }

    /// Button label: offers the action that pressing it would take
    pub fn button_label(session: &SessionSnapshot) -> &'static str {
        if session.is_playing {
            "|| PAUSE"
        } else {
            "> PLAY"
        }
    }
}

impl Widget for TransportWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border = if self.session.is_playing {
            self.theme.border_active()
        } else {
            self.theme.border()
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title(Span::styled(" TRANSPORT ", self.theme.title()));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < 10 || inner.height < 1 {
            return;
        }

        // Disabled until a color is picked
        let enabled = !self.session.color.is_none();
        let button_style = if !enabled {
            self.theme.dim().add_modifier(Modifier::CROSSED_OUT)
        } else if self.session.is_playing {
            self.theme.highlight()
        } else {
            self.theme.normal().add_modifier(Modifier::BOLD)
        };

        let device = self
            .session
            .device
            .map(|s| s.label())
            .unwrap_or("no device");

        let mut lines = vec![Line::from(vec![
            Span::styled(format!(" {} ", Self::button_label(self.session)), button_style),
            Span::styled("  space", self.theme.dim()),
        ])];
        if inner.height >= 2 {
            lines.push(Line::from(Span::styled(
                self.session.status.as_str(),
                self.theme.normal(),
            )));
        }
        if inner.height >= 3 {
            lines.push(Line::from(vec![
                Span::styled("device: ", self.theme.dim()),
                Span::styled(device, self.theme.dim()),
            ]));
        }

        Paragraph::new(lines).render(inner, buf);
    }
}
