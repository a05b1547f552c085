// src/ui/widgets/flat.rs
//! Flat 2D waterfall: one terminal row per history row, newest on top.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    widgets::{Block, Borders, Widget},
    Frame,
};

use super::relief::to_color;
use crate::render::{ColorHeightMapper, Resampler};

/// History rows, newest first, shaded with `mapper`.
pub struct FlatWaterfall<'a> {
    rows: &'a [Vec<f32>],
    mapper: ColorHeightMapper,
    title: &'a str,
}

impl<'a> FlatWaterfall<'a> {
    pub fn new(rows: &'a [Vec<f32>], mapper: ColorHeightMapper, title: &'a str) -> Self {
        Self {
            rows,
            mapper,
            title,
        }
    }
}

impl Widget for FlatWaterfall<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title(self.title);
        let inner = block.inner(area);
        block.render(area, buf);

        let width = usize::from(inner.width);
        let mut resampler = Resampler::new();
        let mut line = Vec::with_capacity(width);

        for (dy, row) in self.rows.iter().take(usize::from(inner.height)).enumerate() {
            if row.len() < 2 || width < 2 {
                continue;
            }
            resampler.prepare(width, row.len());
            resampler.resample_into(row, &mut line);
            let y = inner.y + dy as u16;
            for (dx, &db) in line.iter().enumerate() {
                let color = to_color(self.mapper.map(db, 0.0).color);
                if let Some(cell) = buf.cell_mut((inner.x + dx as u16, y)) {
                    cell.set_char(' ').set_bg(color);
                }
            }
        }
    }
}

/// Render the flat waterfall into `area`.
pub fn render_flat(
    f: &mut Frame<'_>,
    area: Rect,
    rows: &[Vec<f32>],
    mapper: ColorHeightMapper,
    title: &str,
) {
    f.render_widget(FlatWaterfall::new(rows, mapper, title), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::history::FLOOR_DB;
    use crate::render::{Levels, Palette};
    use ratatui::style::Color;

    #[test]
    fn newest_row_is_drawn_first() {
        let rows = vec![vec![0.0; 8], vec![FLOOR_DB; 8]];
        let mapper = ColorHeightMapper::new(Palette::Gray, Levels::new(-100.0, 0.0));
        let area = Rect::new(0, 0, 6, 5);
        let mut buf = Buffer::empty(area);
        FlatWaterfall::new(&rows, mapper, "flat").render(area, &mut buf);

        assert_eq!(buf[(1, 1)].bg, Color::Rgb(255, 255, 255));
        assert_eq!(buf[(1, 2)].bg, Color::Rgb(0, 0, 0));
        // Rows past the history stay untouched.
        assert_eq!(buf[(1, 3)].bg, Color::Reset);
    }
}
