//! Volume and output level meters

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::Span,
    widgets::{Block, Borders, Widget},
};

/// Horizontal bars for the volume setting and the measured output level
pub struct VolumeMeterWidget<'a> {
    theme: &'a Theme,
    volume: f32,
    level: f32,
    peak_hold: f32,
}

impl<'a> VolumeMeterWidget<'a> {
    pub fn new(volume: f32, theme: &'a Theme) -> Self {
        Self {
            theme,
            volume,
            level: 0.0,
            peak_hold: 0.0,
        }
    }

    pub fn level(mut self, level: f32, peak_hold: f32) -> Self {
        self.level = level;
        self.peak_hold = peak_hold;
        self
    }

    /// Number of filled cells for a 0.0-1.0 value
    fn filled(value: f32, width: usize) -> usize {
        ((value.clamp(0.0, 1.0) * width as f32).round() as usize).min(width)
    }

    fn draw_bar(&self, buf: &mut Buffer, x: u16, y: u16, width: usize, value: f32, peak: Option<f32>) {
        let fill = Self::filled(value, width);
        let peak_cell = peak
            .filter(|p| *p > 0.0)
            .map(|p| Self::filled(p, width).saturating_sub(1));

        for i in 0..width {
            let pos = i as f32 / width as f32;
            let cell = &mut buf[(x + i as u16, y)];
            if i < fill {
                cell.set_char('█').set_style(self.theme.meter_style(pos));
            } else if peak_cell == Some(i) {
                cell.set_char('|').set_style(self.theme.meter_style(pos));
            } else {
                cell.set_char('·').set_style(self.theme.dim());
            }
        }
    }
}

impl Widget for VolumeMeterWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border())
            .title(Span::styled(" LEVEL ", self.theme.title()));

        let inner = block.inner(area);
        block.render(area, buf);

        // "VOL " label + bar + " 100%"
        const LABEL: u16 = 4;
        const READOUT: u16 = 5;
        if inner.width < LABEL + READOUT + 4 || inner.height < 1 {
            return;
        }
        let bar_width = (inner.width - LABEL - READOUT) as usize;
        let bar_x = inner.x + LABEL;

        // Row 0: volume setting
        buf.set_string(inner.x, inner.y, "VOL ", self.theme.dim());
        self.draw_bar(buf, bar_x, inner.y, bar_width, self.volume, None);
        buf.set_string(
            bar_x + bar_width as u16,
            inner.y,
            format!("{:>4}%", (self.volume.clamp(0.0, 1.0) * 100.0).round() as u32),
            self.theme.normal(),
        );

        // Row 1: measured output
        if inner.height >= 2 {
            let y = inner.y + 1;
            buf.set_string(inner.x, y, "OUT ", self.theme.dim());
            self.draw_bar(buf, bar_x, y, bar_width, self.level, Some(self.peak_hold));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_filled_cells() {
        assert_eq!(VolumeMeterWidget::filled(0.0, 20), 0);
        assert_eq!(VolumeMeterWidget::filled(0.5, 20), 10);
        assert_eq!(VolumeMeterWidget::filled(1.0, 20), 20);
        assert_eq!(VolumeMeterWidget::filled(3.0, 20), 20);
        assert_eq!(VolumeMeterWidget::filled(-1.0, 20), 0);
    }

    #[test]
    fn test_volume_row() {
        // inner width 29 -> bar width 20
        let area = Rect::new(0, 0, 31, 4);
        let mut buf = Buffer::empty(area);
        VolumeMeterWidget::new(0.25, &Theme::default())
            .level(0.5, 0.75)
            .render(area, &mut buf);

        let vol = row(&buf, 1);
        assert!(vol.contains("VOL"));
        assert!(vol.contains(" 25%"));
        assert_eq!(vol.matches('█').count(), 5);

        let out = row(&buf, 2);
        assert_eq!(out.matches('█').count(), 10);
        assert_eq!(out.matches('|').count(), 1);
    }
}
