//! Noise selector widget - one button per color

use crate::theme::Theme;
use hush_audio::NoiseColor;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Row of noise color buttons with the active one highlighted
pub struct NoiseSelectorWidget<'a> {
    selected: NoiseColor,
    theme: &'a Theme,
}

impl<'a> NoiseSelectorWidget<'a> {
    pub fn new(selected: NoiseColor, theme: &'a Theme) -> Self {
        Self { selected, theme }
    }

    /// Key shown next to each button (matches normal-mode bindings)
    fn hotkey(color: NoiseColor) -> char {
        match color {
            NoiseColor::White => '1',
            NoiseColor::Pink => '2',
            NoiseColor::Brown => '3',
            NoiseColor::Purple => '4',
            NoiseColor::None => ' ',
        }
    }
}

impl Widget for NoiseSelectorWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .title(Span::styled(" NOISE ", self.theme.title()));

        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < 8 || inner.height < 1 {
            return;
        }

        let cells = Layout::horizontal([Constraint::Ratio(1, 4); 4]).split(inner);

        for (color, cell) in NoiseColor::ALL.iter().zip(cells.iter()) {
            let active = *color == self.selected;
            let label = format!("{} {}", Self::hotkey(*color), color.label());

            let style = if active {
                self.theme.highlight()
            } else {
                Style::default()
                    .fg(self.theme.noise_color(*color))
                    .add_modifier(Modifier::DIM)
            };

            let line = if active {
                Line::from(vec![
                    Span::styled("[", self.theme.border_active()),
                    Span::styled(label, style),
                    Span::styled("]", self.theme.border_active()),
                ])
            } else {
                Line::from(vec![Span::raw(" "), Span::styled(label, style), Span::raw(" ")])
            };

            Paragraph::new(line).centered().render(*cell, buf);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_renders_all_colors() {
        let area = Rect::new(0, 0, 60, 3);
        let mut buf = Buffer::empty(area);
        NoiseSelectorWidget::new(NoiseColor::None, &Theme::default()).render(area, &mut buf);

        let row = row_text(&buf, 1);
        for color in NoiseColor::ALL {
            assert!(row.contains(color.label()), "missing {} in {:?}", color, row);
        }
        assert!(!row.contains('['));
    }

    #[test]
    fn test_marks_selected_color() {
        let area = Rect::new(0, 0, 60, 3);
        let mut buf = Buffer::empty(area);
        NoiseSelectorWidget::new(NoiseColor::Brown, &Theme::default()).render(area, &mut buf);

        let row = row_text(&buf, 1);
        assert!(row.contains("[3 Brown]"));
        assert_eq!(row.matches('[').count(), 1);
    }

    #[test]
    fn test_tiny_area_does_not_panic() {
        let area = Rect::new(0, 0, 4, 2);
        let mut buf = Buffer::empty(area);
        NoiseSelectorWidget::new(NoiseColor::Pink, &Theme::default()).render(area, &mut buf);
    }
}
